use async_trait::async_trait;
use crate::domain::entities::{Interaction, Message};
use crate::application::errors::GatewayError;

/// Bot trait - abstraction over the platform connection used to answer users
#[async_trait]
pub trait Bot: Send + Sync {
    /// Reply to a text message in its channel
    async fn reply(&self, message: &Message, text: &str) -> Result<(), GatewayError>;

    /// Answer an interaction
    async fn respond(&self, interaction: &Interaction, text: &str) -> Result<(), GatewayError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
