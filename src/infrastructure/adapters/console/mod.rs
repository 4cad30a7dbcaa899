//! Console adapter for development/testing
//!
//! Keeps every entity and every application command in memory. Replies are
//! printed when echo is on and always recorded so tests can inspect them.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::application::errors::GatewayError;
use crate::domain::entities::{
    ApplicationCommandDescriptor, Channel, Interaction, LiveCommand, Member, Message, Role, Scope, User,
};
use crate::domain::traits::{ApplicationCommandClient, Bot, BotInfo, EntityLookup};

#[derive(Default)]
struct ConsoleState {
    users: HashMap<String, User>,
    members: HashMap<(String, String), Member>,
    channels: HashMap<String, Channel>,
    roles: HashMap<(String, String), Role>,
    messages: HashMap<(String, String), Message>,
    replies: Vec<String>,
    live: HashMap<Scope, Vec<LiveCommand>>,
    pushed: Vec<(Scope, Vec<String>)>,
    deleted: Vec<(Scope, String)>,
    failing_deletes: HashSet<String>,
}

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    echo: bool,
    state: RwLock<ConsoleState>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: "0".to_string(),
                name: "carik-runtime".to_string(),
                username: "console".to_string(),
            },
            echo: false,
            state: RwLock::new(ConsoleState::default()),
        }
    }

    /// Print replies to stdout
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn with_info(mut self, info: BotInfo) -> Self {
        self.info = info;
        self
    }

    pub fn add_user(&self, user: User) {
        self.write(|s| {
            s.users.insert(user.id.clone(), user);
        });
    }

    pub fn add_member(&self, member: Member) {
        self.write(|s| {
            s.users.insert(member.user.id.clone(), member.user.clone());
            s.members.insert((member.guild_id.clone(), member.user.id.clone()), member);
        });
    }

    pub fn add_channel(&self, channel: Channel) {
        self.write(|s| {
            s.channels.insert(channel.id.clone(), channel);
        });
    }

    pub fn add_role(&self, role: Role) {
        self.write(|s| {
            s.roles.insert((role.guild_id.clone(), role.id.clone()), role);
        });
    }

    pub fn add_message(&self, message: Message) {
        self.write(|s| {
            s.messages.insert((message.channel.id.clone(), message.id.clone()), message);
        });
    }

    /// Seed the live command list of a scope
    pub fn set_live<I, S>(&self, scope: Scope, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let commands = names
            .into_iter()
            .map(|name| LiveCommand {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.into(),
            })
            .collect();
        self.write(|s| {
            s.live.insert(scope, commands);
        });
    }

    /// Make deletions of the named live command fail
    pub fn fail_delete(&self, name: impl Into<String>) {
        let name = name.into();
        self.write(|s| {
            s.failing_deletes.insert(name);
        });
    }

    pub fn replies(&self) -> Vec<String> {
        self.read(|s| s.replies.clone())
    }

    pub fn live_names(&self, scope: &Scope) -> Vec<String> {
        self.read(|s| {
            s.live
                .get(scope)
                .map(|cmds| cmds.iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default()
        })
    }

    /// Names sent by each `set_commands` call, in call order
    pub fn pushed(&self) -> Vec<(Scope, Vec<String>)> {
        self.read(|s| s.pushed.clone())
    }

    /// Names removed through `delete_command`, in call order
    pub fn deleted(&self) -> Vec<(Scope, String)> {
        self.read(|s| s.deleted.clone())
    }

    fn read<R>(&self, f: impl FnOnce(&ConsoleState) -> R) -> R {
        match self.state.read() {
            Ok(state) => f(&state),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<R>(&self, f: impl FnOnce(&mut ConsoleState) -> R) -> R {
        match self.state.write() {
            Ok(mut state) => f(&mut state),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn record_reply(&self, text: &str) {
        if self.echo {
            println!("[BOT] {}", text);
        }
        self.write(|s| s.replies.push(text.to_string()));
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn reply(&self, _message: &Message, text: &str) -> Result<(), GatewayError> {
        self.record_reply(text);
        Ok(())
    }

    async fn respond(&self, _interaction: &Interaction, text: &str) -> Result<(), GatewayError> {
        self.record_reply(text);
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[async_trait]
impl EntityLookup for ConsoleAdapter {
    async fn user(&self, id: &str) -> Option<User> {
        self.read(|s| s.users.get(id).cloned())
    }

    async fn member(&self, guild_id: &str, user_id: &str) -> Option<Member> {
        self.read(|s| s.members.get(&(guild_id.to_string(), user_id.to_string())).cloned())
    }

    async fn channel(&self, id: &str) -> Option<Channel> {
        self.read(|s| s.channels.get(id).cloned())
    }

    async fn role(&self, guild_id: &str, id: &str) -> Option<Role> {
        self.read(|s| s.roles.get(&(guild_id.to_string(), id.to_string())).cloned())
    }

    async fn message(&self, channel_id: &str, id: &str) -> Option<Message> {
        self.read(|s| s.messages.get(&(channel_id.to_string(), id.to_string())).cloned())
    }
}

#[async_trait]
impl ApplicationCommandClient for ConsoleAdapter {
    async fn fetch_commands(&self, scope: &Scope) -> Result<Vec<LiveCommand>, GatewayError> {
        Ok(self.read(|s| s.live.get(scope).cloned().unwrap_or_default()))
    }

    async fn set_commands(&self, scope: &Scope, commands: &[ApplicationCommandDescriptor]) -> Result<(), GatewayError> {
        self.write(|s| {
            let previous = s.live.remove(scope).unwrap_or_default();
            let live = commands
                .iter()
                .map(|descriptor| LiveCommand {
                    id: previous
                        .iter()
                        .find(|c| c.name == descriptor.name)
                        .map(|c| c.id.clone())
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                    name: descriptor.name.clone(),
                })
                .collect();
            s.live.insert(scope.clone(), live);
            s.pushed
                .push((scope.clone(), commands.iter().map(|d| d.name.clone()).collect()));
        });
        Ok(())
    }

    async fn delete_command(&self, scope: &Scope, id: &str) -> Result<(), GatewayError> {
        self.write(|s| {
            let live = s.live.get_mut(scope).ok_or_else(|| GatewayError::NotFound(scope.to_string()))?;
            let index = live
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
            if s.failing_deletes.contains(&live[index].name) {
                return Err(GatewayError::Request(format!("cannot delete {}", live[index].name)));
            }
            let removed = live.remove(index);
            s.deleted.push((scope.clone(), removed.name));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_returns_none_when_missing() {
        let adapter = ConsoleAdapter::new();
        adapter.add_member(Member::new("g1", User::new("42")));

        assert!(adapter.user("42").await.is_some());
        assert!(adapter.member("g1", "42").await.is_some());
        assert!(adapter.member("g2", "42").await.is_none());
        assert!(adapter.channel("1").await.is_none());
    }

    #[tokio::test]
    async fn test_set_commands_keeps_ids_of_existing_names() {
        let adapter = ConsoleAdapter::new();
        adapter.set_live(Scope::Global, ["a"]);
        let before = adapter.fetch_commands(&Scope::Global).await.unwrap();

        adapter
            .set_commands(
                &Scope::Global,
                &[
                    ApplicationCommandDescriptor::slash("a", "A"),
                    ApplicationCommandDescriptor::slash("b", "B"),
                ],
            )
            .await
            .unwrap();

        let after = adapter.fetch_commands(&Scope::Global).await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id, before[0].id);
        assert_eq!(adapter.pushed().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_delete() {
        let adapter = ConsoleAdapter::new();
        adapter.set_live(Scope::guild("1"), ["x"]);
        adapter.fail_delete("x");

        let live = adapter.fetch_commands(&Scope::guild("1")).await.unwrap();
        assert!(adapter.delete_command(&Scope::guild("1"), &live[0].id).await.is_err());
        assert_eq!(adapter.live_names(&Scope::guild("1")), vec!["x"]);
    }
}
