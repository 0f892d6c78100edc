use crate::auth::AuthUser;
use crate::schemas::{ApiError, ApiResponse, AppState, api_error, database_error};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use compute::products::is_low_stock;
use model::entities::product;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for adding a pantry product
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub current_stock: Decimal,
    #[validate(length(min = 1, max = 32))]
    pub unit: String,
    /// Stock level at or below which the product counts as low
    pub low_stock_threshold: Option<Decimal>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStockRequest {
    pub current_stock: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub current_stock: Decimal,
    pub unit: String,
    pub low_stock_threshold: Option<Decimal>,
    pub is_low_stock: bool,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        let low = is_low_stock(&model);
        Self {
            id: model.id,
            name: model.name,
            current_stock: model.current_stock,
            unit: model.unit,
            low_stock_threshold: model.low_stock_threshold,
            is_low_stock: low,
        }
    }
}

fn negative_stock() -> ApiError {
    api_error(
        StatusCode::BAD_REQUEST,
        "INVALID_STOCK",
        "Stock levels cannot be negative",
    )
}

/// Add a product to the pantry
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "household",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_product(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateProductRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), ApiError> {
    if request.current_stock.is_sign_negative()
        || request.low_stock_threshold.is_some_and(|t| t.is_sign_negative())
    {
        return Err(negative_stock());
    }

    let model = product::ActiveModel {
        user_id: Set(user_id),
        name: Set(request.name),
        current_stock: Set(request.current_stock),
        unit: Set(request.unit),
        low_stock_threshold: Set(request.low_stock_threshold),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to create product for user {}: {}", user_id, e);
        database_error("Failed to create product")
    })?;

    info!("Created product {} for user {}", model.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(model.into(), "Product created successfully")),
    ))
}

/// List the current user's products by name
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "household",
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<Vec<ProductResponse>>),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_products(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ApiError> {
    let products = product::Entity::find()
        .filter(product::Column::UserId.eq(user_id))
        .order_by_asc(product::Column::Name)
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to list products for user {}: {}", user_id, e);
            database_error("Failed to retrieve products")
        })?;

    debug!("Retrieved {} products for user {}", products.len(), user_id);
    Ok(Json(ApiResponse::ok(
        products.into_iter().map(ProductResponse::from).collect(),
        "Products retrieved successfully",
    )))
}

/// Set the current stock of a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{product_id}/stock",
    tag = "household",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock updated", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Negative stock", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_product_stock(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    Json(request): Json<UpdateStockRequest>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    if request.current_stock.is_sign_negative() {
        return Err(negative_stock());
    }

    let existing = product::Entity::find_by_id(product_id)
        .filter(product::Column::UserId.eq(user_id))
        .one(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to load product {}: {}", product_id, e);
            database_error("Failed to update product")
        })?;

    let Some(model) = existing else {
        warn!("Product {} not found for user {}", product_id, user_id);
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "PRODUCT_NOT_FOUND",
            format!("Product {} not found", product_id),
        ));
    };

    let mut active = model.into_active_model();
    active.current_stock = Set(request.current_stock);
    let updated = active.update(&state.db).await.map_err(|e| {
        error!("Failed to update product {}: {}", product_id, e);
        database_error("Failed to update product")
    })?;

    info!("Product {} stock set to {} {}", updated.id, updated.current_stock, updated.unit);
    Ok(Json(ApiResponse::ok(updated.into(), "Stock updated successfully")))
}

/// Remove a product from the pantry
#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}",
    tag = "household",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<String>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_product(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = product::Entity::delete_many()
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::UserId.eq(user_id))
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to delete product {}: {}", product_id, e);
            database_error("Failed to delete product")
        })?;

    if result.rows_affected == 0 {
        warn!("Product {} not found for user {}", product_id, user_id);
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "PRODUCT_NOT_FOUND",
            format!("Product {} not found", product_id),
        ));
    }

    info!("Deleted product {} for user {}", product_id, user_id);
    Ok(Json(ApiResponse::ok(
        format!("Product {} deleted", product_id),
        "Product deleted successfully",
    )))
}
