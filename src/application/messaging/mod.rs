//! Message handling - Routing inbound events to extension handlers

pub mod arguments;
pub mod dates;
pub mod dispatcher;
pub mod events;
pub mod middleware;
pub mod parser;

pub use arguments::ArgumentResolver;
pub use dispatcher::{DispatchOutcome, IgnoreReason, MessageDispatcher};
pub use events::{EmitReport, EventDispatcher};
pub use middleware::{BeforeCommandRun, CommandContext, HookChain, OwnerOnly, RequiredPermissions};
pub use parser::{MessageParser, ParsedCommand};
