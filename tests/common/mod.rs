//! Shared fixtures for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex, Once};

use carik_runtime::application::errors::CommandError;
use carik_runtime::application::ContainerBuilder;
use carik_runtime::domain::entities::{
    ArgumentValue, AutocompleteHandler, Channel, ChatInputHandler, ContextMenuHandler, EventHandler, EventInvocation,
    Guild, InteractionInvocation, Member, Message, MessageHandler, MessageInvocation, TaskHandler, User,
};
use carik_runtime::infrastructure::adapters::ConsoleAdapter;
use carik_runtime::{Config, Container, Runtime};

pub const GUILD: &str = "500";
pub const CHANNEL: &str = "600";
pub const AUTHOR: &str = "7";
pub const TARGET: &str = "42";

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Log of handler invocations shared between a test and its handlers
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

/// Handler that records every invocation as `label:args`
pub struct Record {
    label: String,
    calls: Calls,
}

impl Record {
    pub fn new(label: &str, calls: &Calls) -> Self {
        Self {
            label: label.to_string(),
            calls: calls.clone(),
        }
    }
}

pub fn render(value: &ArgumentValue) -> String {
    match value {
        ArgumentValue::String(s) => s.clone(),
        ArgumentValue::Number(n) => n.to_string(),
        ArgumentValue::Boolean(b) => b.to_string(),
        ArgumentValue::User(u) => format!("user:{}", u.id),
        ArgumentValue::Member(m) => format!("member:{}", m.id()),
        ArgumentValue::Channel(c) => format!("channel:{}", c.id),
        ArgumentValue::Role(r) => format!("role:{}", r.id),
        ArgumentValue::Date(d) => d.to_rfc3339(),
        ArgumentValue::None => "none".to_string(),
    }
}

#[async_trait]
impl MessageHandler for Record {
    async fn on_message(&self, invocation: MessageInvocation<'_>) -> Result<(), CommandError> {
        let args: Vec<String> = invocation.args.iter().map(render).collect();
        self.calls.push(format!("{}:{}", self.label, args.join("|")));
        Ok(())
    }
}

#[async_trait]
impl ChatInputHandler for Record {
    async fn on_chat_input(&self, _invocation: InteractionInvocation<'_>) -> Result<(), CommandError> {
        self.calls.push(format!("{}:chat", self.label));
        Ok(())
    }
}

#[async_trait]
impl ContextMenuHandler for Record {
    async fn on_context_menu(&self, invocation: InteractionInvocation<'_>) -> Result<(), CommandError> {
        let target = invocation.interaction.target_id.clone().unwrap_or_default();
        self.calls.push(format!("{}:menu:{}", self.label, target));
        Ok(())
    }
}

#[async_trait]
impl AutocompleteHandler for Record {
    async fn on_autocomplete(&self, _invocation: InteractionInvocation<'_>) -> Result<(), CommandError> {
        self.calls.push(format!("{}:autocomplete", self.label));
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Record {
    async fn run(&self, invocation: EventInvocation<'_>) -> Result<(), CommandError> {
        let guild = invocation.payload.guild_id.clone().unwrap_or_else(|| "-".to_string());
        self.calls.push(format!("{}:{}:{}", self.label, invocation.extension, guild));
        Ok(())
    }
}

#[async_trait]
impl TaskHandler for Record {
    async fn run(&self) -> Result<(), CommandError> {
        self.calls.push(format!("{}:task", self.label));
        Ok(())
    }
}

/// Event handler that always fails
pub struct Failing;

#[async_trait]
impl EventHandler for Failing {
    async fn run(&self, _invocation: EventInvocation<'_>) -> Result<(), CommandError> {
        Err(CommandError::ExecutionFailed("boom".to_string()))
    }
}

/// Console adapter seeded with a guild, an author and a target member
pub fn adapter() -> Arc<ConsoleAdapter> {
    let adapter = Arc::new(ConsoleAdapter::new());
    adapter.add_member(Member::new(GUILD, User::new(AUTHOR).with_username("author")));
    adapter.add_member(Member::new(GUILD, User::new(TARGET).with_username("target")));
    adapter.add_channel(Channel::text(CHANNEL, GUILD).with_name("general"));
    adapter
}

pub fn runtime(config: Config) -> (Arc<ConsoleAdapter>, Runtime) {
    runtime_with(config, |builder| builder)
}

pub fn runtime_with<F>(config: Config, customize: F) -> (Arc<ConsoleAdapter>, Runtime)
where
    F: FnOnce(ContainerBuilder) -> ContainerBuilder,
{
    ensure_init();
    let adapter = adapter();
    let builder = Container::builder(adapter.clone(), adapter.clone(), adapter.clone()).config(config);
    let container = customize(builder).build();
    (adapter, Runtime::new(container))
}

pub fn guild() -> Guild {
    Guild::new(GUILD, "Test Guild")
}

pub fn guild_message(content: &str) -> Message {
    Message::new(Channel::text(CHANNEL, GUILD), User::new(AUTHOR), content)
        .with_guild(guild())
        .with_member(Member::new(GUILD, User::new(AUTHOR)))
}

pub fn direct_message(content: &str) -> Message {
    Message::new(Channel::direct("900"), User::new(AUTHOR), content)
}
