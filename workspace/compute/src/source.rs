//! Read access to the per-user data a reminder run needs.

use async_trait::async_trait;
use model::entities::{
    device_token, expense, family_member, income, notification_settings, product,
    transaction_status::TransactionStatus, user,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::transactions::Transaction;

/// Which users a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunScope {
    /// Scheduled run over every user, gated by each category's time of day.
    AllUsers,
    /// Manual run for one user; time-of-day gates are bypassed.
    SingleUser(i32),
}

impl RunScope {
    pub fn is_manual(&self) -> bool {
        matches!(self, RunScope::SingleUser(_))
    }
}

/// Snapshot reads of the household store.
#[async_trait]
pub trait ReminderSource: Send + Sync + std::fmt::Debug {
    /// Ids of the users covered by `scope`, in ascending order.
    async fn user_ids(&self, scope: RunScope) -> Result<Vec<i32>>;

    async fn settings(&self, user_id: i32) -> Result<Option<notification_settings::Model>>;

    async fn device_tokens(&self, user_id: i32) -> Result<Vec<String>>;

    /// Planned incomes followed by planned expenses.
    async fn planned_transactions(&self, user_id: i32) -> Result<Vec<Transaction>>;

    async fn products(&self, user_id: i32) -> Result<Vec<product::Model>>;

    async fn family_members(&self, user_id: i32) -> Result<Vec<family_member::Model>>;
}

/// [`ReminderSource`] backed by the SeaORM entities.
#[derive(Debug, Clone)]
pub struct SeaOrmSource {
    db: DatabaseConnection,
}

impl SeaOrmSource {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReminderSource for SeaOrmSource {
    #[instrument(skip(self))]
    async fn user_ids(&self, scope: RunScope) -> Result<Vec<i32>> {
        let ids = match scope {
            RunScope::AllUsers => user::Entity::find()
                .order_by_asc(user::Column::Id)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|u| u.id)
                .collect(),
            RunScope::SingleUser(user_id) => user::Entity::find_by_id(user_id)
                .one(&self.db)
                .await?
                .map(|u| vec![u.id])
                .unwrap_or_default(),
        };
        debug!("Run scope {:?} covers {} users", scope, ids.len());
        Ok(ids)
    }

    async fn settings(&self, user_id: i32) -> Result<Option<notification_settings::Model>> {
        Ok(notification_settings::Entity::find()
            .filter(notification_settings::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?)
    }

    async fn device_tokens(&self, user_id: i32) -> Result<Vec<String>> {
        Ok(device_token::Entity::find()
            .filter(device_token::Column::UserId.eq(user_id))
            .order_by_asc(device_token::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| t.token)
            .collect())
    }

    async fn planned_transactions(&self, user_id: i32) -> Result<Vec<Transaction>> {
        let incomes = income::Entity::find()
            .filter(income::Column::UserId.eq(user_id))
            .filter(income::Column::Status.eq(TransactionStatus::Planned))
            .order_by_asc(income::Column::Id)
            .all(&self.db)
            .await?;
        let expenses = expense::Entity::find()
            .filter(expense::Column::UserId.eq(user_id))
            .filter(expense::Column::Status.eq(TransactionStatus::Planned))
            .order_by_asc(expense::Column::Id)
            .all(&self.db)
            .await?;

        Ok(incomes
            .into_iter()
            .map(Transaction::from)
            .chain(expenses.into_iter().map(Transaction::from))
            .collect())
    }

    async fn products(&self, user_id: i32) -> Result<Vec<product::Model>> {
        Ok(product::Entity::find()
            .filter(product::Column::UserId.eq(user_id))
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn family_members(&self, user_id: i32) -> Result<Vec<family_member::Model>> {
        Ok(family_member::Entity::find()
            .filter(family_member::Column::UserId.eq(user_id))
            .order_by_asc(family_member::Column::Id)
            .all(&self.db)
            .await?)
    }
}
