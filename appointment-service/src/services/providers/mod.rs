pub mod mock;
pub mod twilio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mock::MockMessagingProvider;
pub use twilio::TwilioProvider;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication error: {0}")]
    Authentication(String),
}

impl ProviderError {
    /// The provider's own error text, without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            ProviderError::Configuration(msg)
            | ProviderError::Connection(msg)
            | ProviderError::SendFailed(msg)
            | ProviderError::InvalidRecipient(msg)
            | ProviderError::RateLimited(msg)
            | ProviderError::Authentication(msg) => msg,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub provider_id: Option<String>,
    pub status: Option<String>,
}

impl ProviderResponse {
    pub fn accepted(provider_id: Option<String>, status: Option<String>) -> Self {
        Self {
            provider_id,
            status,
        }
    }
}

/// One text message to one channel-prefixed destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub body: String,
}

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, ProviderError>;
    async fn health_check(&self) -> Result<(), ProviderError>;
}
