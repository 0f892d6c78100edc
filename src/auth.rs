//! Bearer-token authentication.
//!
//! Two credentials exist: the scheduler's shared secret, accepted only on the
//! dispatch trigger, and per-user identity tokens issued from the CLI. Identity
//! tokens are stored as SHA-256 digests in `access_tokens`.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use model::entities::access_token;
use moka::future::Cache;
use rand::RngCore;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, instrument, trace, warn};

use crate::schemas::{ApiError, AppState, api_error};

/// Header that marks a dispatch request as a user-initiated run.
pub const TRIGGER_TYPE_HEADER: &str = "x-trigger-type";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer credentials")]
    MissingCredentials,

    #[error("Invalid identity token")]
    InvalidToken,

    #[error("Unauthorized trigger")]
    UnauthorizedTrigger,

    #[error("Identity backend error: {0}")]
    Backend(#[from] DbErr),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                api_error(StatusCode::UNAUTHORIZED, "MISSING_CREDENTIALS", err.to_string())
            }
            AuthError::InvalidToken => {
                api_error(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", err.to_string())
            }
            AuthError::UnauthorizedTrigger => {
                api_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
            }
            AuthError::Backend(_) => api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_BACKEND_ERROR",
                "Failed to verify credentials",
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Resolves an identity token to the user it was issued for.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + Debug {
    async fn verify(&self, token: &str) -> Result<i32, AuthError>;
}

/// [`IdentityVerifier`] backed by the `access_tokens` table with a TTL cache
/// of digest to user id.
#[derive(Debug, Clone)]
pub struct TokenTableVerifier {
    db: DatabaseConnection,
    cache: Cache<String, i32>,
}

impl TokenTableVerifier {
    pub fn new(db: DatabaseConnection, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1000).time_to_live(ttl).build();
        Self { db, cache }
    }
}

#[async_trait]
impl IdentityVerifier for TokenTableVerifier {
    #[instrument(skip_all)]
    async fn verify(&self, token: &str) -> Result<i32, AuthError> {
        let digest = hash_token(token);
        if let Some(user_id) = self.cache.get(&digest).await {
            trace!("Identity cache hit for user {}", user_id);
            return Ok(user_id);
        }

        let row = access_token::Entity::find()
            .filter(access_token::Column::TokenHash.eq(digest.clone()))
            .one(&self.db)
            .await?;

        match row {
            Some(row) => {
                debug!("Verified identity token for user {}", row.user_id);
                self.cache.insert(digest, row.user_id).await;
                Ok(row.user_id)
            }
            None => {
                warn!("Rejected unknown identity token");
                Err(AuthError::InvalidToken)
            }
        }
    }
}

/// Hex-encoded SHA-256 of a raw token.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// 32 random bytes, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Creates a new identity token for `user_id` and returns it in plain text.
///
/// Only the digest is persisted; the returned value cannot be recovered later.
pub async fn issue_token(db: &DatabaseConnection, user_id: i32) -> Result<String, DbErr> {
    let token = generate_token();
    access_token::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(hash_token(&token)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Issued access token for user {}", user_id);
    Ok(token)
}

/// Value of an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Who a dispatch trigger runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerScope {
    Scheduled,
    Manual { user_id: i32 },
}

/// Decides whether a dispatch request may run and for whom.
///
/// A request carrying `X-Trigger-Type: manual` must present an identity
/// token. Anything else must present the configured cron secret; with no
/// secret configured every scheduled trigger is refused.
pub async fn authorize_trigger(
    headers: &HeaderMap,
    cron_secret: Option<&str>,
    verifier: &dyn IdentityVerifier,
) -> Result<TriggerScope, AuthError> {
    let manual = headers
        .get(TRIGGER_TYPE_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("manual"));
    let bearer = bearer_token(headers);

    if manual {
        let token = bearer.ok_or(AuthError::MissingCredentials)?;
        let user_id = verifier.verify(token).await?;
        info!("Manual trigger for user: {}", user_id);
        return Ok(TriggerScope::Manual { user_id });
    }

    let expected = cron_secret.filter(|secret| !secret.is_empty());
    match (expected, bearer) {
        (Some(expected), Some(presented)) if expected == presented => {
            info!("Scheduled trigger accepted");
            Ok(TriggerScope::Scheduled)
        }
        (_, None) => {
            warn!("Unauthorized cron job attempt without credentials");
            Err(AuthError::MissingCredentials)
        }
        _ => {
            warn!("Unauthorized cron job attempt");
            Err(AuthError::UnauthorizedTrigger)
        }
    }
}

/// The user behind the request's identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i32);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingCredentials)?;
        let user_id = state.verifier.verify(token).await?;
        Ok(AuthUser(user_id))
    }
}
