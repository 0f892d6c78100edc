use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which table a transaction came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKindDto {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKindDto {
    Birthday,
    Special,
}

/// A planned income or expense due within the lookahead window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UpcomingTransactionDto {
    pub id: i32,
    pub kind: TransactionKindDto,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub days_left: i64,
    pub title: String,
    pub detail: String,
}

/// A product at or below its low-stock threshold.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LowStockDto {
    pub id: i32,
    pub name: String,
    pub current_stock: Decimal,
    pub unit: String,
    pub low_stock_threshold: Decimal,
    pub title: String,
    pub detail: String,
}

/// The next occurrence of a family member's birthday or special date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UpcomingEventDto {
    pub member_id: i32,
    pub member_name: String,
    pub avatar_url: Option<String>,
    pub event_name: String,
    pub event_kind: EventKindDto,
    pub event_date: NaiveDate,
    pub days_left: i64,
    pub title: String,
    pub detail: String,
}

/// One entry of the merged notification feed, tagged by category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(tag = "notification_type", rename_all = "snake_case")]
pub enum NotificationFeedItem {
    Transaction(UpcomingTransactionDto),
    LowStock(LowStockDto),
    Event(UpcomingEventDto),
}

/// Outcome of one reminder dispatch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Number of category notifications handed to the push provider.
    pub notifications_sent: u32,
    /// Users whose data was evaluated.
    pub users_processed: u32,
    /// Users skipped for missing settings, missing tokens or load failures.
    pub users_skipped: u32,
    /// Whether the run was a user-initiated manual check.
    pub manual: bool,
}
