use crate::auth::AuthUser;
use crate::schemas::{ApiError, ApiResponse, AppState, api_error, database_error};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use common::TransactionKindDto;
use model::entities::{expense, income, transaction_status::TransactionStatus};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Lifecycle state of a planned income or expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatusDto {
    Planned,
    Completed,
    Cancelled,
}

impl From<TransactionStatus> for TransactionStatusDto {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Planned => Self::Planned,
            TransactionStatus::Completed => Self::Completed,
            TransactionStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<TransactionStatusDto> for TransactionStatus {
    fn from(status: TransactionStatusDto) -> Self {
        match status {
            TransactionStatusDto::Planned => Self::Planned,
            TransactionStatusDto::Completed => Self::Completed,
            TransactionStatusDto::Cancelled => Self::Cancelled,
        }
    }
}

/// Request body for recording an income or expense
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    pub kind: TransactionKindDto,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    /// Defaults to `planned`
    pub status: Option<TransactionStatusDto>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateTransactionStatusRequest {
    pub status: TransactionStatusDto,
}

#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct TransactionListQuery {
    /// Only list transactions in this state
    pub status: Option<TransactionStatusDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub kind: TransactionKindDto,
    pub description: String,
    pub amount: Decimal,
    pub date: String,
    pub status: TransactionStatusDto,
}

impl From<income::Model> for TransactionResponse {
    fn from(model: income::Model) -> Self {
        Self {
            id: model.id,
            kind: TransactionKindDto::Income,
            description: model.description,
            amount: model.amount,
            date: model.date,
            status: model.status.into(),
        }
    }
}

impl From<expense::Model> for TransactionResponse {
    fn from(model: expense::Model) -> Self {
        Self {
            id: model.id,
            kind: TransactionKindDto::Expense,
            description: model.description,
            amount: model.amount,
            date: model.date,
            status: model.status.into(),
        }
    }
}

fn not_found(kind: TransactionKindDto, id: i32) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "TRANSACTION_NOT_FOUND",
        format!("{:?} {} not found", kind, id),
    )
}

/// Record a new income or expense
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    tag = "household",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_transaction(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateTransactionRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), ApiError> {
    trace!("Entering create_transaction for user {}", user_id);
    let status: TransactionStatus = request
        .status
        .unwrap_or(TransactionStatusDto::Planned)
        .into();
    let date = request.date.format("%Y-%m-%d").to_string();

    let created: Result<TransactionResponse, DbErr> = match request.kind {
        TransactionKindDto::Income => income::ActiveModel {
            user_id: Set(user_id),
            description: Set(request.description),
            amount: Set(request.amount),
            date: Set(date),
            status: Set(status),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .map(TransactionResponse::from),
        TransactionKindDto::Expense => expense::ActiveModel {
            user_id: Set(user_id),
            description: Set(request.description),
            amount: Set(request.amount),
            date: Set(date),
            status: Set(status),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .map(TransactionResponse::from),
    };

    let created = created.map_err(|e| {
        error!("Failed to create transaction for user {}: {}", user_id, e);
        database_error("Failed to create transaction")
    })?;

    info!("Created {:?} {} for user {}", created.kind, created.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(created, "Transaction created successfully")),
    ))
}

async fn list_transactions(
    db: &DatabaseConnection,
    user_id: i32,
    status: Option<TransactionStatus>,
) -> Result<Vec<TransactionResponse>, DbErr> {
    let mut incomes = income::Entity::find()
        .filter(income::Column::UserId.eq(user_id))
        .order_by_asc(income::Column::Date);
    let mut expenses = expense::Entity::find()
        .filter(expense::Column::UserId.eq(user_id))
        .order_by_asc(expense::Column::Date);
    if let Some(status) = status {
        incomes = incomes.filter(income::Column::Status.eq(status));
        expenses = expenses.filter(expense::Column::Status.eq(status));
    }

    let mut items: Vec<TransactionResponse> = incomes
        .all(db)
        .await?
        .into_iter()
        .map(TransactionResponse::from)
        .collect();
    items.extend(expenses.all(db).await?.into_iter().map(TransactionResponse::from));
    Ok(items)
}

/// List the current user's incomes followed by their expenses
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    tag = "household",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "Transactions retrieved", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transactions(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, ApiError> {
    let items = list_transactions(&state.db, user_id, query.status.map(Into::into))
        .await
        .map_err(|e| {
            error!("Failed to list transactions for user {}: {}", user_id, e);
            database_error("Failed to retrieve transactions")
        })?;

    debug!("Retrieved {} transactions for user {}", items.len(), user_id);
    Ok(Json(ApiResponse::ok(items, "Transactions retrieved successfully")))
}

/// Mark a transaction as planned, completed or cancelled
#[utoipa::path(
    put,
    path = "/api/v1/transactions/{kind}/{id}/status",
    tag = "household",
    params(
        ("kind" = TransactionKindDto, Path, description = "`income` or `expense`"),
        ("id" = i32, Path, description = "Transaction ID"),
    ),
    request_body = UpdateTransactionStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<TransactionResponse>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_transaction_status(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(TransactionKindDto, i32)>,
    Json(request): Json<UpdateTransactionStatusRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    let status: TransactionStatus = request.status.into();

    let updated: Result<Option<TransactionResponse>, DbErr> = match kind {
        TransactionKindDto::Income => {
            match income::Entity::find_by_id(id)
                .filter(income::Column::UserId.eq(user_id))
                .one(&state.db)
                .await
            {
                Ok(Some(model)) => {
                    let mut active = model.into_active_model();
                    active.status = Set(status);
                    active.update(&state.db).await.map(|m| Some(m.into()))
                }
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            }
        }
        TransactionKindDto::Expense => {
            match expense::Entity::find_by_id(id)
                .filter(expense::Column::UserId.eq(user_id))
                .one(&state.db)
                .await
            {
                Ok(Some(model)) => {
                    let mut active = model.into_active_model();
                    active.status = Set(status);
                    active.update(&state.db).await.map(|m| Some(m.into()))
                }
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            }
        }
    };

    match updated {
        Ok(Some(response)) => {
            info!("{:?} {} is now {:?}", kind, id, response.status);
            Ok(Json(ApiResponse::ok(response, "Transaction status updated successfully")))
        }
        Ok(None) => {
            warn!("{:?} {} not found for user {}", kind, id, user_id);
            Err(not_found(kind, id))
        }
        Err(e) => {
            error!("Failed to update {:?} {}: {}", kind, id, e);
            Err(database_error("Failed to update transaction"))
        }
    }
}

/// Delete an income or expense
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{kind}/{id}",
    tag = "household",
    params(
        ("kind" = TransactionKindDto, Path, description = "`income` or `expense`"),
        ("id" = i32, Path, description = "Transaction ID"),
    ),
    responses(
        (status = 200, description = "Transaction deleted", body = ApiResponse<String>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_transaction(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(TransactionKindDto, i32)>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = match kind {
        TransactionKindDto::Income => {
            income::Entity::delete_many()
                .filter(income::Column::Id.eq(id))
                .filter(income::Column::UserId.eq(user_id))
                .exec(&state.db)
                .await
        }
        TransactionKindDto::Expense => {
            expense::Entity::delete_many()
                .filter(expense::Column::Id.eq(id))
                .filter(expense::Column::UserId.eq(user_id))
                .exec(&state.db)
                .await
        }
    }
    .map_err(|e| {
        error!("Failed to delete {:?} {}: {}", kind, id, e);
        database_error("Failed to delete transaction")
    })?;

    if result.rows_affected == 0 {
        warn!("{:?} {} not found for user {}", kind, id, user_id);
        return Err(not_found(kind, id));
    }

    info!("Deleted {:?} {} for user {}", kind, id, user_id);
    Ok(Json(ApiResponse::ok(
        format!("Transaction {} deleted", id),
        "Transaction deleted successfully",
    )))
}
