use std::sync::Arc;

use axum::{http::StatusCode, response::Json};
use chrono::{Local, NaiveDateTime};
use common::{
    DispatchSummary, EventKindDto, EventReminderSettings, LowStockDto, LowStockReminderSettings,
    NotificationFeedItem, NotificationSettingsDto, TransactionKindDto,
    TransactionReminderSettings, UpcomingEventDto, UpcomingTransactionDto,
};
use compute::{PushDispatcher, ReminderSource};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::auth::IdentityVerifier;
use crate::handlers::{
    device_tokens, family_members, health, notification_settings, products, reminders,
    transactions,
};

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Shared secret expected from the scheduler; scheduled triggers are
    /// refused while unset
    pub cron_secret: Option<String>,
    /// Reads the household data a reminder run evaluates
    pub source: Arc<dyn ReminderSource>,
    /// Maps identity tokens to users
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Delivers push notifications
    pub dispatcher: Arc<dyn PushDispatcher>,
    /// Source of "now" for time-of-day gates and feed dates
    pub clock: Clock,
}

/// Wall clock used by the reminder endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub enum Clock {
    /// Server local time
    #[default]
    System,
    /// A frozen instant
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Shorthand for the 500 a failed store call turns into.
pub fn database_error(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", message)
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        reminders::dispatch_reminders,
        reminders::get_notifications,
        notification_settings::get_notification_settings,
        notification_settings::update_notification_settings,
        device_tokens::register_device_token,
        device_tokens::unregister_device_token,
        transactions::create_transaction,
        transactions::get_transactions,
        transactions::update_transaction_status,
        transactions::delete_transaction,
        products::create_product,
        products::get_products,
        products::update_product_stock,
        products::delete_product,
        family_members::create_family_member,
        family_members::get_family_members,
        family_members::delete_family_member,
    ),
    components(
        schemas(
            ApiResponse<DispatchSummary>,
            ApiResponse<Vec<NotificationFeedItem>>,
            ApiResponse<NotificationSettingsDto>,
            ErrorResponse,
            HealthResponse,
            DispatchSummary,
            NotificationFeedItem,
            UpcomingTransactionDto,
            LowStockDto,
            UpcomingEventDto,
            TransactionKindDto,
            EventKindDto,
            NotificationSettingsDto,
            TransactionReminderSettings,
            LowStockReminderSettings,
            EventReminderSettings,
            notification_settings::UpdateNotificationSettingsRequest,
            notification_settings::TransactionReminderRequest,
            notification_settings::LowStockReminderRequest,
            notification_settings::EventReminderRequest,
            device_tokens::DeviceTokenRequest,
            device_tokens::DeviceTokenResponse,
            transactions::CreateTransactionRequest,
            transactions::UpdateTransactionStatusRequest,
            transactions::TransactionResponse,
            transactions::TransactionStatusDto,
            products::CreateProductRequest,
            products::UpdateStockRequest,
            products::ProductResponse,
            family_members::CreateFamilyMemberRequest,
            family_members::FamilyMemberResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "reminders", description = "Reminder dispatch and notification feed"),
        (name = "settings", description = "Notification preferences and devices"),
        (name = "household", description = "Transactions, pantry and family calendar"),
    ),
    info(
        title = "Homekeep API",
        description = "Household reminders for planned transactions, pantry stock and family events",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
