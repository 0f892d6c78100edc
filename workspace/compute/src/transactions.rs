use chrono::NaiveDate;
use model::entities::{expense, income, transaction_status::TransactionStatus};
use rust_decimal::Decimal;
use tracing::warn;

use crate::dates::{days_until, parse_iso_date};

/// Which table a transaction was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

/// An income or expense as seen by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i32,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
    /// Raw ISO date as stored.
    pub date: String,
    pub status: TransactionStatus,
}

impl From<income::Model> for Transaction {
    fn from(model: income::Model) -> Self {
        Self {
            id: model.id,
            kind: TransactionKind::Income,
            description: model.description,
            amount: model.amount,
            date: model.date,
            status: model.status,
        }
    }
}

impl From<expense::Model> for Transaction {
    fn from(model: expense::Model) -> Self {
        Self {
            id: model.id,
            kind: TransactionKind::Expense,
            description: model.description,
            amount: model.amount,
            date: model.date,
            status: model.status,
        }
    }
}

/// A planned transaction that falls inside the lookahead window.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingTransaction {
    pub transaction: Transaction,
    pub due: NaiveDate,
    pub days_left: i64,
}

/// Selects planned transactions due after `today` and at most `reminder_days` ahead.
///
/// A transaction due today is not upcoming. Records whose date cannot be
/// parsed are logged and left out. The result is ordered by due date; ties
/// keep their input order.
pub fn evaluate_transactions(
    transactions: &[Transaction],
    today: NaiveDate,
    reminder_days: i64,
) -> Vec<UpcomingTransaction> {
    let mut upcoming: Vec<UpcomingTransaction> = transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Planned)
        .filter_map(|t| {
            let due = match parse_iso_date(&t.date) {
                Ok(due) => due,
                Err(e) => {
                    warn!(transaction_id = t.id, date = %t.date, "Invalid date format for transaction: {}", e);
                    return None;
                }
            };
            let days_left = days_until(today, due);
            (days_left > 0 && days_left <= reminder_days).then(|| UpcomingTransaction {
                transaction: t.clone(),
                due,
                days_left,
            })
        })
        .collect();

    upcoming.sort_by_key(|u| u.due);
    upcoming
}
