use crate::auth::AuthUser;
use crate::schemas::{ApiError, ApiResponse, AppState, api_error, database_error};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use common::NotificationSettingsDto;
use compute::ReminderSettings;
use compute::settings::parse_time_of_day;
use model::entities::{device_token, notification_settings};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TryIntoModel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct TransactionReminderRequest {
    pub enabled: bool,
    /// Time of day, `HH:mm`
    pub time: Option<String>,
    /// Lookahead in days (defaults to 3)
    #[validate(range(min = 0, max = 365))]
    pub reminder_days: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct LowStockReminderRequest {
    pub enabled: bool,
    /// Time of day, `HH:mm`
    pub time: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct EventReminderRequest {
    pub enabled: bool,
    /// Time of day, `HH:mm`
    pub time: Option<String>,
    /// Lookahead in days (defaults to 7)
    #[validate(range(min = 0, max = 365))]
    pub days_before: Option<i32>,
}

/// Request body for replacing the notification preferences
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateNotificationSettingsRequest {
    #[validate(nested)]
    pub transactions: TransactionReminderRequest,
    #[validate(nested)]
    pub low_stock: LowStockReminderRequest,
    #[validate(nested)]
    pub events: EventReminderRequest,
}

/// Rewrites a submitted time as `HH:mm`, rejecting anything unparseable.
fn normalize_time(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => match parse_time_of_day(raw) {
            Some(time) => Ok(Some(time.format("%H:%M").to_string())),
            None => {
                warn!("Rejected {} time {:?}", field, raw);
                Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "INVALID_TIME",
                    format!("{} time must be HH:mm, got '{}'", field, raw),
                ))
            }
        },
    }
}

async fn device_count(db: &DatabaseConnection, user_id: i32) -> Result<u32, DbErr> {
    let count = device_token::Entity::find()
        .filter(device_token::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    Ok(count as u32)
}

async fn find_settings(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<notification_settings::Model>, DbErr> {
    notification_settings::Entity::find()
        .filter(notification_settings::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Get the current user's notification preferences
///
/// Users without stored preferences get the defaults: every category disabled,
/// a 3 day transaction window and a 7 day event window.
#[utoipa::path(
    get,
    path = "/api/v1/notification-settings",
    tag = "settings",
    responses(
        (status = 200, description = "Settings retrieved successfully", body = ApiResponse<NotificationSettingsDto>),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_notification_settings(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<NotificationSettingsDto>>, ApiError> {
    trace!("Entering get_notification_settings for user {}", user_id);

    let stored = find_settings(&state.db, user_id).await.map_err(|e| {
        error!("Failed to load settings for user {}: {}", user_id, e);
        database_error("Failed to load notification settings")
    })?;
    let devices = device_count(&state.db, user_id).await.map_err(|e| {
        error!("Failed to count devices for user {}: {}", user_id, e);
        database_error("Failed to load notification settings")
    })?;

    let settings = stored
        .as_ref()
        .map(ReminderSettings::from)
        .unwrap_or_default();
    debug!("User {} has stored settings: {}", user_id, stored.is_some());

    Ok(Json(ApiResponse::ok(
        settings.to_dto(devices),
        "Notification settings retrieved successfully",
    )))
}

/// Replace the current user's notification preferences
#[utoipa::path(
    put,
    path = "/api/v1/notification-settings",
    tag = "settings",
    request_body = UpdateNotificationSettingsRequest,
    responses(
        (status = 200, description = "Settings saved", body = ApiResponse<NotificationSettingsDto>),
        (status = 400, description = "Invalid time or window", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_notification_settings(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateNotificationSettingsRequest>>,
) -> Result<Json<ApiResponse<NotificationSettingsDto>>, ApiError> {
    trace!("Entering update_notification_settings for user {}", user_id);

    let transactions_time = normalize_time("transactions", request.transactions.time)?;
    let low_stock_time = normalize_time("low_stock", request.low_stock.time)?;
    let events_time = normalize_time("events", request.events.time)?;

    let existing = find_settings(&state.db, user_id)
        .await
        .map_err(|e| {
            error!("Failed to load settings for user {}: {}", user_id, e);
            database_error("Failed to save notification settings")
        })?;

    let mut active: notification_settings::ActiveModel = match existing {
        Some(model) => model.into(),
        None => notification_settings::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        },
    };
    active.transactions_enabled = Set(request.transactions.enabled);
    active.transactions_time = Set(transactions_time);
    active.transactions_reminder_days = Set(request.transactions.reminder_days);
    active.low_stock_enabled = Set(request.low_stock.enabled);
    active.low_stock_time = Set(low_stock_time);
    active.events_enabled = Set(request.events.enabled);
    active.events_time = Set(events_time);
    active.events_days_before = Set(request.events.days_before);

    let saved = active.save(&state.db).await.map_err(|e| {
        error!("Failed to save settings for user {}: {}", user_id, e);
        database_error("Failed to save notification settings")
    })?;
    let saved: notification_settings::Model = saved.try_into_model().map_err(|e| {
        error!("Saved settings for user {} are incomplete: {}", user_id, e);
        database_error("Failed to save notification settings")
    })?;

    let devices = device_count(&state.db, user_id).await.map_err(|e| {
        error!("Failed to count devices for user {}: {}", user_id, e);
        database_error("Failed to save notification settings")
    })?;

    info!("Saved notification settings for user {}", user_id);
    Ok(Json(ApiResponse::ok(
        ReminderSettings::from(&saved).to_dto(devices),
        "Notification settings saved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("t", Some("8:05".to_string())).unwrap().as_deref(), Some("08:05"));
        assert_eq!(normalize_time("t", Some("  ".to_string())).unwrap(), None);
        assert_eq!(normalize_time("t", None).unwrap(), None);

        let (status, body) = normalize_time("events", Some("25:00".to_string())).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_TIME");
    }

    #[test]
    fn test_window_range_validation() {
        let mut request = UpdateNotificationSettingsRequest {
            transactions: TransactionReminderRequest {
                enabled: true,
                time: Some("08:00".to_string()),
                reminder_days: Some(0),
            },
            low_stock: LowStockReminderRequest {
                enabled: false,
                time: None,
            },
            events: EventReminderRequest {
                enabled: true,
                time: None,
                days_before: Some(365),
            },
        };
        assert!(request.validate().is_ok());

        request.transactions.reminder_days = Some(-1);
        assert!(request.validate().is_err());

        request.transactions.reminder_days = None;
        request.events.days_before = Some(366);
        assert!(request.validate().is_err());
    }
}
