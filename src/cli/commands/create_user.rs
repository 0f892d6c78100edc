use anyhow::Result;
use model::entities::{notification_settings, user};
use sea_orm::{ActiveModelTrait, Database, Set, TransactionTrait};
use tracing::info;

use crate::auth;

/// Creates a user with every reminder category disabled and prints their
/// first access token.
pub async fn create_user(database_url: &str, username: &str) -> Result<()> {
    let db = Database::connect(database_url).await?;
    let txn = db.begin().await?;

    let created = user::ActiveModel {
        username: Set(username.to_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    notification_settings::ActiveModel {
        user_id: Set(created.id),
        transactions_enabled: Set(false),
        transactions_time: Set(None),
        transactions_reminder_days: Set(None),
        low_stock_enabled: Set(false),
        low_stock_time: Set(None),
        events_enabled: Set(false),
        events_time: Set(None),
        events_days_before: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    let token = auth::issue_token(&db, created.id).await?;
    info!("Created user {} ({})", created.id, created.username);

    println!("user_id: {}", created.id);
    println!("token:   {}", token);
    Ok(())
}
