use super::{MessagingProvider, OutboundMessage, ProviderError, ProviderResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Mock messaging provider for local runs and tests.
///
/// Records every attempted message in order and can be told to fail one
/// specific attempt.
pub struct MockMessagingProvider {
    send_count: AtomicU64,
    attempts: Mutex<Vec<OutboundMessage>>,
    failure: Option<(u64, ProviderError)>,
}

impl MockMessagingProvider {
    pub fn new() -> Self {
        Self {
            send_count: AtomicU64::new(0),
            attempts: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Fail the `attempt`-th send (1-based) with `error`; every other send succeeds.
    pub fn failing_on(attempt: u64, error: ProviderError) -> Self {
        Self {
            failure: Some((attempt, error)),
            ..Self::new()
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Every message passed to `send`, including failed attempts.
    pub fn attempts(&self) -> Vec<OutboundMessage> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockMessagingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingProvider for MockMessagingProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, ProviderError> {
        let attempt = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());

        if let Some((failing_attempt, error)) = &self.failure {
            if *failing_attempt == attempt {
                return Err(error.clone());
            }
        }

        tracing::info!(
            to = %message.to,
            body_length = %message.body.len(),
            "[MOCK] Message would be sent"
        );

        Ok(ProviderResponse::accepted(
            Some(format!("mock-message-{}", attempt)),
            Some("queued".to_string()),
        ))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
