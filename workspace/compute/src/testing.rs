//! Fakes and fixtures shared by the compute tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use model::entities::{
    family_member, notification_settings, product, transaction_status::TransactionStatus,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};

use crate::dispatch::{DispatchError, MulticastMessage, MulticastReport, PushDispatcher, TokenOutcome};
use crate::error::{ComputeError, Result};
use crate::source::{ReminderSource, RunScope};
use crate::transactions::{Transaction, TransactionKind};

pub async fn setup_db() -> std::result::Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// Everything the source holds for one user.
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub id: i32,
    pub settings: Option<notification_settings::Model>,
    pub tokens: Vec<String>,
    pub transactions: Vec<Transaction>,
    pub products: Vec<product::Model>,
    pub members: Vec<family_member::Model>,
}

impl UserFixture {
    /// A user with every category enabled at `time` and one eligible item per
    /// category when evaluated on 2024-03-10.
    pub fn reminder_ready(id: i32, time: &str) -> Self {
        Self {
            id,
            settings: Some(notification_settings::Model {
                id,
                user_id: id,
                transactions_enabled: true,
                transactions_time: Some(time.to_string()),
                transactions_reminder_days: None,
                low_stock_enabled: true,
                low_stock_time: Some(time.to_string()),
                events_enabled: true,
                events_time: Some(time.to_string()),
                events_days_before: None,
            }),
            tokens: vec![format!("device-{}", id)],
            transactions: vec![
                Transaction {
                    id: id * 10,
                    kind: TransactionKind::Expense,
                    description: "Internet bill".to_string(),
                    amount: Decimal::new(3999, 2),
                    date: "2024-03-12".to_string(),
                    status: TransactionStatus::Planned,
                },
                Transaction {
                    id: id * 10 + 1,
                    kind: TransactionKind::Income,
                    description: "Bonus".to_string(),
                    amount: Decimal::new(50000, 2),
                    date: "2024-04-30".to_string(),
                    status: TransactionStatus::Planned,
                },
            ],
            products: vec![
                product::Model {
                    id: id * 10,
                    user_id: id,
                    name: "Coffee".to_string(),
                    current_stock: Decimal::ONE,
                    unit: "bag".to_string(),
                    low_stock_threshold: Some(Decimal::ONE),
                },
                product::Model {
                    id: id * 10 + 1,
                    user_id: id,
                    name: "Flour".to_string(),
                    current_stock: Decimal::from(5),
                    unit: "kg".to_string(),
                    low_stock_threshold: Some(Decimal::ONE),
                },
            ],
            members: vec![family_member::Model {
                id: id * 10,
                user_id: id,
                name: "Grandpa".to_string(),
                avatar_url: None,
                birthday: Some("1948-03-14".to_string()),
                special_event_date: None,
                special_event_name: None,
            }],
        }
    }
}

/// In-memory [`ReminderSource`] that records which users had data loaded.
#[derive(Debug, Default)]
pub struct InMemorySource {
    users: BTreeMap<i32, UserFixture>,
    failing: Vec<i32>,
    loaded: Mutex<Vec<i32>>,
}

impl InMemorySource {
    pub fn with_user(mut self, fixture: UserFixture) -> Self {
        self.users.insert(fixture.id, fixture);
        self
    }

    /// Makes every read for `user_id` fail.
    pub fn failing_for(mut self, user_id: i32) -> Self {
        self.failing.push(user_id);
        self
    }

    /// Users whose collections were read, in read order.
    pub fn loaded_users(&self) -> Vec<i32> {
        self.loaded.lock().unwrap().clone()
    }

    fn user(&self, user_id: i32) -> Result<Option<&UserFixture>> {
        if self.failing.contains(&user_id) {
            return Err(ComputeError::Database(DbErr::Custom(format!(
                "store unavailable for user {}",
                user_id
            ))));
        }
        Ok(self.users.get(&user_id))
    }

    fn collection<T: Clone>(&self, user_id: i32, pick: impl Fn(&UserFixture) -> &Vec<T>) -> Result<Vec<T>> {
        self.loaded.lock().unwrap().push(user_id);
        Ok(self.user(user_id)?.map(|u| pick(u).clone()).unwrap_or_default())
    }
}

#[async_trait]
impl ReminderSource for InMemorySource {
    async fn user_ids(&self, scope: RunScope) -> Result<Vec<i32>> {
        Ok(match scope {
            RunScope::AllUsers => self.users.keys().copied().collect(),
            RunScope::SingleUser(id) => self.users.contains_key(&id).then_some(id).into_iter().collect(),
        })
    }

    async fn settings(&self, user_id: i32) -> Result<Option<notification_settings::Model>> {
        Ok(self.user(user_id)?.and_then(|u| u.settings.clone()))
    }

    async fn device_tokens(&self, user_id: i32) -> Result<Vec<String>> {
        Ok(self.user(user_id)?.map(|u| u.tokens.clone()).unwrap_or_default())
    }

    async fn planned_transactions(&self, user_id: i32) -> Result<Vec<Transaction>> {
        self.collection(user_id, |u| &u.transactions)
    }

    async fn products(&self, user_id: i32) -> Result<Vec<product::Model>> {
        self.collection(user_id, |u| &u.products)
    }

    async fn family_members(&self, user_id: i32) -> Result<Vec<family_member::Model>> {
        self.collection(user_id, |u| &u.members)
    }
}

/// [`PushDispatcher`] that keeps every accepted message.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<MulticastMessage>>,
    failing_tokens: Vec<String>,
    unavailable: bool,
    attempts: AtomicUsize,
}

impl RecordingDispatcher {
    /// Reports the given tokens as rejected.
    pub fn failing_tokens(tokens: &[&str]) -> Self {
        Self {
            failing_tokens: tokens.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Fails every request as if the provider were unreachable.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<MulticastMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushDispatcher for RecordingDispatcher {
    async fn send_multicast(&self, message: &MulticastMessage) -> std::result::Result<MulticastReport, DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(DispatchError::Transport("connection refused".to_string()));
        }

        self.sent.lock().unwrap().push(message.clone());
        Ok(MulticastReport {
            responses: message
                .tokens
                .iter()
                .map(|token| {
                    if self.failing_tokens.contains(token) {
                        TokenOutcome::failed(token.clone(), "registration-token-not-registered")
                    } else {
                        TokenOutcome::delivered(token.clone())
                    }
                })
                .collect(),
        })
    }
}
