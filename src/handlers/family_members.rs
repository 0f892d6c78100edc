use crate::auth::AuthUser;
use crate::schemas::{ApiError, ApiResponse, AppState, api_error, database_error};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use model::entities::family_member;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for adding someone to the family calendar
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateFamilyMemberRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub avatar_url: Option<String>,
    pub birthday: Option<NaiveDate>,
    /// Anniversary or other yearly date
    pub special_event_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 255))]
    pub special_event_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FamilyMemberResponse {
    pub id: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub birthday: Option<String>,
    pub special_event_date: Option<String>,
    pub special_event_name: Option<String>,
}

impl From<family_member::Model> for FamilyMemberResponse {
    fn from(model: family_member::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            avatar_url: model.avatar_url,
            birthday: model.birthday,
            special_event_date: model.special_event_date,
            special_event_name: model.special_event_name,
        }
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Add a family member
#[utoipa::path(
    post,
    path = "/api/v1/family-members",
    tag = "household",
    request_body = CreateFamilyMemberRequest,
    responses(
        (status = 201, description = "Family member created", body = ApiResponse<FamilyMemberResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_family_member(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateFamilyMemberRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<FamilyMemberResponse>>), ApiError> {
    let model = family_member::ActiveModel {
        user_id: Set(user_id),
        name: Set(request.name),
        avatar_url: Set(request.avatar_url),
        birthday: Set(request.birthday.map(iso)),
        special_event_date: Set(request.special_event_date.map(iso)),
        special_event_name: Set(request.special_event_name),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to create family member for user {}: {}", user_id, e);
        database_error("Failed to create family member")
    })?;

    info!("Created family member {} for user {}", model.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(model.into(), "Family member created successfully")),
    ))
}

/// List the current user's family members
#[utoipa::path(
    get,
    path = "/api/v1/family-members",
    tag = "household",
    responses(
        (status = 200, description = "Family members retrieved", body = ApiResponse<Vec<FamilyMemberResponse>>),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_family_members(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FamilyMemberResponse>>>, ApiError> {
    let members = family_member::Entity::find()
        .filter(family_member::Column::UserId.eq(user_id))
        .order_by_asc(family_member::Column::Name)
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to list family members for user {}: {}", user_id, e);
            database_error("Failed to retrieve family members")
        })?;

    debug!("Retrieved {} family members for user {}", members.len(), user_id);
    Ok(Json(ApiResponse::ok(
        members.into_iter().map(FamilyMemberResponse::from).collect(),
        "Family members retrieved successfully",
    )))
}

/// Remove a family member
#[utoipa::path(
    delete,
    path = "/api/v1/family-members/{member_id}",
    tag = "household",
    params(
        ("member_id" = i32, Path, description = "Family member ID"),
    ),
    responses(
        (status = 200, description = "Family member deleted", body = ApiResponse<String>),
        (status = 404, description = "Family member not found", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_family_member(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = family_member::Entity::delete_many()
        .filter(family_member::Column::Id.eq(member_id))
        .filter(family_member::Column::UserId.eq(user_id))
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete family member {}: {}", member_id, e);
            database_error("Failed to delete family member")
        })?;

    if result.rows_affected == 0 {
        warn!("Family member {} not found for user {}", member_id, user_id);
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "FAMILY_MEMBER_NOT_FOUND",
            format!("Family member {} not found", member_id),
        ));
    }

    info!("Deleted family member {} for user {}", member_id, user_id);
    Ok(Json(ApiResponse::ok(
        format!("Family member {} deleted", member_id),
        "Family member deleted successfully",
    )))
}
