//! Push-dispatch capability consumed by reminder runs.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::summary::PushMessage;

/// Errors reported by a push provider for a whole request.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The provider could not be reached or the request failed in transit
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider rejected the request as a whole
    #[error("Provider rejected request with status {status}: {message}")]
    Provider { status: u16, message: String },
}

/// A notification fanned out to several device tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub title: String,
    pub body: String,
}

impl MulticastMessage {
    pub fn new(tokens: &[String], message: &PushMessage) -> Self {
        Self {
            tokens: tokens.to_vec(),
            title: message.title.clone(),
            body: message.body.clone(),
        }
    }
}

/// Delivery result for a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOutcome {
    pub token: String,
    /// `None` when the provider accepted the message.
    pub error: Option<String>,
}

impl TokenOutcome {
    pub fn delivered(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            error: None,
        }
    }

    pub fn failed(token: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-token outcomes of one multicast, in token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MulticastReport {
    pub responses: Vec<TokenOutcome>,
}

impl MulticastReport {
    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.success_count()
    }

    pub fn failed_tokens(&self) -> Vec<&str> {
        self.responses
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.token.as_str())
            .collect()
    }
}

/// Delivers a notification to a set of devices.
#[async_trait]
pub trait PushDispatcher: Send + Sync + std::fmt::Debug {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<MulticastReport, DispatchError>;
}

/// Sends `message` to every token, logging per-token failures.
///
/// Returns `Ok(None)` without contacting the provider when there are no tokens.
pub async fn send_to_devices(
    dispatcher: &dyn PushDispatcher,
    tokens: &[String],
    message: &PushMessage,
) -> Result<Option<MulticastReport>, DispatchError> {
    if tokens.is_empty() {
        debug!("No device tokens, skipping '{}'", message.title);
        return Ok(None);
    }

    let report = dispatcher
        .send_multicast(&MulticastMessage::new(tokens, message))
        .await?;

    info!("Successfully sent {} messages", report.success_count());
    if report.failure_count() > 0 {
        warn!("List of tokens that caused failures: {:?}", report.failed_tokens());
    }

    Ok(Some(report))
}
