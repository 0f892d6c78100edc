use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::NaiveDate;
use common::{DispatchSummary, NotificationFeedItem};
use compute::{ComputeError, ReminderRun, ReminderSettings, RunScope, build_feed};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use utoipa::IntoParams;

use crate::auth::{AuthUser, TriggerScope, authorize_trigger};
use crate::schemas::{ApiError, ApiResponse, AppState, api_error, database_error};

/// Run reminder evaluation and push summaries
///
/// Scheduled callers send `Authorization: Bearer <cron secret>` and cover every
/// user whose configured time matches the current server minute. Manual callers
/// add `X-Trigger-Type: manual` with their own identity token and cover only
/// themselves, regardless of the configured times.
#[utoipa::path(
    post,
    path = "/api/v1/reminders/dispatch",
    tag = "reminders",
    params(
        ("X-Trigger-Type" = Option<String>, Header, description = "`manual` for a user-initiated run"),
    ),
    responses(
        (status = 200, description = "Run completed", body = ApiResponse<DispatchSummary>),
        (status = 401, description = "Missing or rejected credentials", body = ErrorResponse),
        (status = 500, description = "Users could not be listed", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn dispatch_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<DispatchSummary>>, ApiError> {
    let scope = match authorize_trigger(&headers, state.cron_secret.as_deref(), state.verifier.as_ref())
        .await?
    {
        TriggerScope::Scheduled => RunScope::AllUsers,
        TriggerScope::Manual { user_id } => RunScope::SingleUser(user_id),
    };

    let summary = ReminderRun::new(state.source.as_ref(), state.dispatcher.as_ref())
        .execute(scope, state.clock.now())
        .await
        .map_err(|e| {
            error!("Reminder run failed: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DISPATCH_FAILED",
                format!("Reminder run failed: {}", e),
            )
        })?;

    let message = if summary.manual {
        format!(
            "Manual check complete. Found and sent {} notifications for you.",
            summary.notifications_sent
        )
    } else {
        "Scheduled reminder run executed successfully.".to_string()
    };
    info!("{}", message);

    Ok(Json(ApiResponse::ok(summary, message)))
}

#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct FeedQuery {
    /// Day to evaluate against (defaults to the server's today)
    pub as_of: Option<NaiveDate>,
}

/// Merged notification feed for the current user
///
/// Lists every upcoming transaction, low-stock product and family event,
/// ignoring the per-category enabled flags and times of day.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "reminders",
    params(FeedQuery),
    responses(
        (status = 200, description = "Feed ordered by date", body = ApiResponse<Vec<NotificationFeedItem>>),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_notifications(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationFeedItem>>>, ApiError> {
    let today = query.as_of.unwrap_or_else(|| state.clock.now().date());
    debug!("Building notification feed for user {} as of {}", user_id, today);

    let feed = load_feed(&state, user_id, today).await.map_err(|e| {
        error!("Failed to load feed for user {}: {}", user_id, e);
        database_error("Failed to load notifications")
    })?;

    info!("Feed for user {} has {} items", user_id, feed.len());
    Ok(Json(ApiResponse::ok(feed, "Notifications retrieved successfully")))
}

async fn load_feed(
    state: &AppState,
    user_id: i32,
    today: NaiveDate,
) -> Result<Vec<NotificationFeedItem>, ComputeError> {
    let settings = state
        .source
        .settings(user_id)
        .await?
        .map(|model| ReminderSettings::from(&model))
        .unwrap_or_default();
    let transactions = state.source.planned_transactions(user_id).await?;
    let products = state.source.products(user_id).await?;
    let members = state.source.family_members(user_id).await?;

    Ok(build_feed(&transactions, &products, &members, &settings, today)
        .into_iter()
        .map(NotificationFeedItem::from)
        .collect())
}
