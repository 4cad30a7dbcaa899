//! Domain entities - Core business objects

pub mod application_command;
pub mod argument;
pub mod command;
pub mod event;
pub mod extension;
pub mod guild;
pub mod interaction;
pub mod message;
pub mod scope;
pub mod task;
pub mod user;

pub use application_command::{
    ApplicationCommandDescriptor, ApplicationCommandKind, CommandOption, IntegrationType,
    InteractionContext, LiveCommand, OptionChoice, OptionKind,
};
pub use argument::{ArgumentDefault, ArgumentType, ArgumentValue, CommandArgument};
pub use command::{
    ApplicationCommandEntry, AutocompleteHandler, ChatInputHandler, Command, CommandId,
    ContextMenuHandler, InteractionInvocation, MessageHandler, MessageInvocation, RegisteredCommand,
};
pub use event::{Event, EventHandler, EventId, EventInvocation, EventPayload, RegisteredEvent};
pub use extension::{Extension, ExtensionRecord, ExtensionScope};
pub use guild::{Channel, ChannelKind, Guild, Role};
pub use interaction::{Interaction, InteractionKind};
pub use message::Message;
pub use scope::{Scope, ScopeState};
pub use task::{RegisteredTask, Task, TaskHandler};
pub use user::{Member, User};
