use crate::handlers::{
    device_tokens::{register_device_token, unregister_device_token},
    family_members::{create_family_member, delete_family_member, get_family_members},
    health::health_check,
    notification_settings::{get_notification_settings, update_notification_settings},
    products::{create_product, delete_product, get_products, update_product_stock},
    reminders::{dispatch_reminders, get_notifications},
    transactions::{
        create_transaction, delete_transaction, get_transactions, update_transaction_status,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Reminder trigger, callable by schedulers (GET) and clients (POST)
        .route(
            "/api/v1/reminders/dispatch",
            get(dispatch_reminders).post(dispatch_reminders),
        )
        .route("/api/v1/notifications", get(get_notifications))
        // Preferences and devices
        .route(
            "/api/v1/notification-settings",
            get(get_notification_settings).put(update_notification_settings),
        )
        .route(
            "/api/v1/device-tokens",
            post(register_device_token).delete(unregister_device_token),
        )
        // Household data
        .route("/api/v1/transactions", post(create_transaction))
        .route("/api/v1/transactions", get(get_transactions))
        .route(
            "/api/v1/transactions/:kind/:id/status",
            put(update_transaction_status),
        )
        .route("/api/v1/transactions/:kind/:id", delete(delete_transaction))
        .route("/api/v1/products", post(create_product))
        .route("/api/v1/products", get(get_products))
        .route("/api/v1/products/:product_id/stock", put(update_product_stock))
        .route("/api/v1/products/:product_id", delete(delete_product))
        .route("/api/v1/family-members", post(create_family_member))
        .route("/api/v1/family-members", get(get_family_members))
        .route("/api/v1/family-members/:member_id", delete(delete_family_member))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
