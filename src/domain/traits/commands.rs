use async_trait::async_trait;
use crate::application::errors::GatewayError;
use crate::domain::entities::{ApplicationCommandDescriptor, LiveCommand, Scope};

/// The platform's registry of application commands
#[async_trait]
pub trait ApplicationCommandClient: Send + Sync {
    async fn fetch_commands(&self, scope: &Scope) -> Result<Vec<LiveCommand>, GatewayError>;

    /// Replaces the whole command list of `scope`
    async fn set_commands(&self, scope: &Scope, commands: &[ApplicationCommandDescriptor]) -> Result<(), GatewayError>;

    async fn delete_command(&self, scope: &Scope, id: &str) -> Result<(), GatewayError>;
}
