//! Push providers behind [`PushDispatcher`].

use std::time::Duration;

use async_trait::async_trait;
use compute::{DispatchError, MulticastMessage, MulticastReport, PushDispatcher, TokenOutcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Sends through the FCM HTTP v1 API, one `messages:send` request per token.
#[derive(Debug, Clone)]
pub struct FcmDispatcher {
    client: reqwest::Client,
    send_url: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: String,
}

impl FcmDispatcher {
    pub fn new(
        endpoint: &str,
        project_id: &str,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            send_url: format!(
                "{}/v1/projects/{}/messages:send",
                endpoint.trim_end_matches('/'),
                project_id
            ),
            access_token: access_token.into(),
        })
    }

    async fn send_one(&self, token: &str, message: &MulticastMessage) -> Result<TokenOutcome, DispatchError> {
        let request = SendRequest {
            message: FcmMessage {
                token,
                notification: FcmNotification {
                    title: &message.title,
                    body: &message.body,
                },
            },
        };

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(TokenOutcome::delivered(token));
        }

        let text = response.text().await.unwrap_or_default();
        let reason = match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => envelope.error.status.unwrap_or(envelope.error.message),
            Err(_) => text,
        };

        // Credential problems reject every token alike.
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DispatchError::Provider {
                status: status.as_u16(),
                message: reason,
            });
        }

        debug!("Token rejected with status {}: {}", status, reason);
        Ok(TokenOutcome::failed(token, reason))
    }
}

#[async_trait]
impl PushDispatcher for FcmDispatcher {
    #[instrument(skip_all, fields(tokens = message.tokens.len()))]
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<MulticastReport, DispatchError> {
        let mut responses = Vec::with_capacity(message.tokens.len());
        let mut transport_failures = 0;
        let mut last_transport_error = None;
        for token in &message.tokens {
            match self.send_one(token, message).await {
                Ok(outcome) => responses.push(outcome),
                Err(DispatchError::Transport(reason)) => {
                    warn!("Request for token {} failed: {}", token, reason);
                    responses.push(TokenOutcome::failed(token, reason.clone()));
                    transport_failures += 1;
                    last_transport_error = Some(reason);
                }
                Err(e) => return Err(e),
            }
        }

        // Nothing reached the provider at all.
        if transport_failures == responses.len() {
            if let Some(reason) = last_transport_error {
                return Err(DispatchError::Transport(reason));
            }
        }
        Ok(MulticastReport { responses })
    }
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

#[async_trait]
impl PushDispatcher for LogDispatcher {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<MulticastReport, DispatchError> {
        info!(
            "Push to {} device(s): {} - {}",
            message.tokens.len(),
            message.title,
            message.body
        );
        if message.tokens.is_empty() {
            warn!("Multicast without tokens");
        }
        Ok(MulticastReport {
            responses: message.tokens.iter().map(TokenOutcome::delivered).collect(),
        })
    }
}
