use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use compute::{PushDispatcher, SeaOrmSource};
use sea_orm::Database;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::TokenTableVerifier;
use crate::push::{FcmDispatcher, LogDispatcher};
use crate::schemas::{AppState, Clock};

/// File looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "homekeep.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("push.provider = \"fcm\" requires push.{0}")]
    MissingFcmSetting(&'static str),

    #[error("Failed to build push client: {0}")]
    PushClient(#[from] compute::DispatchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushProvider {
    Log,
    Fcm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    pub provider: PushProvider,
    pub fcm_endpoint: String,
    #[serde(default)]
    pub fcm_project_id: Option<String>,
    #[serde(default)]
    pub fcm_access_token: Option<String>,
    pub request_timeout_secs: u64,
}

/// Runtime configuration: built-in defaults, then the TOML file, then
/// `HOMEKEEP_*` environment variables, then command-line flags.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    #[serde(default)]
    pub cron_secret: Option<String>,
    pub token_cache_ttl_secs: u64,
    pub push: PushConfig,
}

/// Values given on the command line, highest precedence.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub bind_address: Option<String>,
}

impl AppConfig {
    pub fn load(file: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: AppConfig = config::Config::builder()
            .set_default("database_url", "sqlite://homekeep.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("token_cache_ttl_secs", 300)?
            .set_default("push.provider", "log")?
            .set_default("push.fcm_endpoint", "https://fcm.googleapis.com")?
            .set_default("push.request_timeout_secs", 10)?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("HOMEKEEP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("database_url", overrides.database_url)?
            .set_override_option("bind_address", overrides.bind_address)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!("Configuration loaded: bind {}, push {:?}", config.bind_address, config.push.provider);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.push.provider == PushProvider::Fcm {
            if self.push.fcm_project_id.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingFcmSetting("fcm_project_id"));
            }
            if self.push.fcm_access_token.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingFcmSetting("fcm_access_token"));
            }
        }
        Ok(())
    }

    pub fn dispatcher(&self) -> Result<Arc<dyn PushDispatcher>, ConfigError> {
        match self.push.provider {
            PushProvider::Log => {
                warn!("No push provider configured, notifications will only be logged");
                Ok(Arc::new(LogDispatcher))
            }
            PushProvider::Fcm => {
                let project_id = self
                    .push
                    .fcm_project_id
                    .as_deref()
                    .ok_or(ConfigError::MissingFcmSetting("fcm_project_id"))?;
                let access_token = self
                    .push
                    .fcm_access_token
                    .clone()
                    .ok_or(ConfigError::MissingFcmSetting("fcm_access_token"))?;
                Ok(Arc::new(FcmDispatcher::new(
                    &self.push.fcm_endpoint,
                    project_id,
                    access_token,
                    Duration::from_secs(self.push.request_timeout_secs),
                )?))
            }
        }
    }
}

/// Initialize application state from configuration
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    if config.cron_secret.as_deref().is_none_or(str::is_empty) {
        warn!("cron_secret is not set; scheduled triggers will be refused");
    }

    Ok(AppState {
        source: Arc::new(SeaOrmSource::new(db.clone())),
        verifier: Arc::new(TokenTableVerifier::new(
            db.clone(),
            Duration::from_secs(config.token_cache_ttl_secs),
        )),
        dispatcher: config.dispatcher()?,
        cron_secret: config.cron_secret.clone(),
        clock: Clock::System,
        db,
    })
}
