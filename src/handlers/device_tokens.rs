use crate::auth::AuthUser;
use crate::schemas::{ApiError, ApiResponse, AppState, api_error, database_error};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use model::entities::device_token;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// A push registration token as issued to the device by the provider
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct DeviceTokenRequest {
    #[validate(length(min = 1, max = 4096))]
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeviceTokenResponse {
    pub id: i32,
    pub token: String,
}

impl From<device_token::Model> for DeviceTokenResponse {
    fn from(model: device_token::Model) -> Self {
        Self {
            id: model.id,
            token: model.token,
        }
    }
}

/// Register a device for push notifications
///
/// Registering a token that is already known for this user is a no-op.
#[utoipa::path(
    post,
    path = "/api/v1/device-tokens",
    tag = "settings",
    request_body = DeviceTokenRequest,
    responses(
        (status = 201, description = "Device registered", body = ApiResponse<DeviceTokenResponse>),
        (status = 200, description = "Device was already registered", body = ApiResponse<DeviceTokenResponse>),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn register_device_token(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<DeviceTokenRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<DeviceTokenResponse>>), ApiError> {
    let existing = device_token::Entity::find()
        .filter(device_token::Column::UserId.eq(user_id))
        .filter(device_token::Column::Token.eq(request.token.clone()))
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to look up device token for user {}: {}", user_id, e);
            database_error("Failed to register device")
        })?;

    if let Some(model) = existing {
        debug!("Device token already registered for user {}", user_id);
        return Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(model.into(), "Device already registered")),
        ));
    }

    let model = device_token::ActiveModel {
        user_id: Set(user_id),
        token: Set(request.token),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to register device for user {}: {}", user_id, e);
        database_error("Failed to register device")
    })?;

    info!("Registered device {} for user {}", model.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(model.into(), "Device registered successfully")),
    ))
}

/// Stop sending push notifications to a device
#[utoipa::path(
    delete,
    path = "/api/v1/device-tokens",
    tag = "settings",
    request_body = DeviceTokenRequest,
    responses(
        (status = 200, description = "Device unregistered", body = ApiResponse<String>),
        (status = 404, description = "Token not registered for this user", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unregister_device_token(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<DeviceTokenRequest>>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = device_token::Entity::delete_many()
        .filter(device_token::Column::UserId.eq(user_id))
        .filter(device_token::Column::Token.eq(request.token))
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to unregister device for user {}: {}", user_id, e);
            database_error("Failed to unregister device")
        })?;

    if result.rows_affected == 0 {
        warn!("No matching device token for user {}", user_id);
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "DEVICE_NOT_FOUND",
            "Device token is not registered",
        ));
    }

    info!("Unregistered device for user {}", user_id);
    Ok(Json(ApiResponse::ok(
        "Device unregistered".to_string(),
        "Device unregistered successfully",
    )))
}
