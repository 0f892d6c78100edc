//! The merged, display-oriented notification list.
//!
//! Unlike dispatch runs, the feed ignores `enabled` flags and times of day and
//! shows everything currently reminder-worthy across all three categories.

use chrono::NaiveDate;
use common::{
    EventKindDto, LowStockDto, NotificationFeedItem, TransactionKindDto, UpcomingEventDto,
    UpcomingTransactionDto,
};
use model::entities::{family_member, product};

use crate::dates::format_month_day;
use crate::events::{CalendarEvent, EventKind, evaluate_events};
use crate::products::evaluate_low_stock;
use crate::settings::ReminderSettings;
use crate::transactions::{Transaction, TransactionKind, UpcomingTransaction, evaluate_transactions};

/// One reminder, tagged by category.
#[derive(Debug, Clone, PartialEq)]
pub enum Reminder {
    Transaction(UpcomingTransaction),
    LowStock(product::Model),
    Event(CalendarEvent),
}

impl Reminder {
    /// Date the feed is ordered by. Low stock is a condition of today.
    pub fn sort_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Reminder::Transaction(upcoming) => upcoming.due,
            Reminder::LowStock(_) => today,
            Reminder::Event(event) => event.event_date,
        }
    }
}

/// Builds the merged feed ordered by date.
///
/// Items sharing a date stay in category order: transactions, low stock, events.
pub fn build_feed(
    transactions: &[Transaction],
    products: &[product::Model],
    members: &[family_member::Model],
    settings: &ReminderSettings,
    today: NaiveDate,
) -> Vec<Reminder> {
    let mut feed: Vec<Reminder> =
        evaluate_transactions(transactions, today, settings.transaction_reminder_days)
            .into_iter()
            .map(Reminder::Transaction)
            .chain(evaluate_low_stock(products).into_iter().map(Reminder::LowStock))
            .chain(
                evaluate_events(members, today, settings.event_days_before)
                    .into_iter()
                    .map(Reminder::Event),
            )
            .collect();

    feed.sort_by_key(|item| item.sort_date(today));
    feed
}

impl From<Reminder> for NotificationFeedItem {
    fn from(reminder: Reminder) -> Self {
        match reminder {
            Reminder::Transaction(upcoming) => {
                let detail = format!(
                    "{} is due on {}.",
                    upcoming.transaction.description,
                    format_month_day(upcoming.due)
                );
                NotificationFeedItem::Transaction(UpcomingTransactionDto {
                    id: upcoming.transaction.id,
                    kind: match upcoming.transaction.kind {
                        TransactionKind::Income => TransactionKindDto::Income,
                        TransactionKind::Expense => TransactionKindDto::Expense,
                    },
                    description: upcoming.transaction.description,
                    amount: upcoming.transaction.amount,
                    date: upcoming.due,
                    days_left: upcoming.days_left,
                    title: "Upcoming Transaction".to_string(),
                    detail,
                })
            }
            Reminder::LowStock(product) => NotificationFeedItem::LowStock(LowStockDto {
                detail: format!(
                    "{} is running low. Only {:.1} {} left.",
                    product.name, product.current_stock, product.unit
                ),
                id: product.id,
                name: product.name,
                current_stock: product.current_stock,
                unit: product.unit,
                low_stock_threshold: product.low_stock_threshold.unwrap_or_default(),
                title: "Low Stock Alert".to_string(),
            }),
            Reminder::Event(event) => {
                let on = format_month_day(event.event_date);
                let detail = match event.days_left {
                    0 => format!("Today is the day! It's on {}.", on),
                    1 => format!("It's coming up in 1 day on {}.", on),
                    days => format!("It's coming up in {} days on {}.", days, on),
                };
                NotificationFeedItem::Event(UpcomingEventDto {
                    title: event.title(),
                    member_id: event.member.id,
                    member_name: event.member.name,
                    avatar_url: event.member.avatar_url,
                    event_name: event.event_name,
                    event_kind: match event.kind {
                        EventKind::Birthday => EventKindDto::Birthday,
                        EventKind::Special => EventKindDto::Special,
                    },
                    event_date: event.event_date,
                    days_left: event.days_left,
                    detail,
                })
            }
        }
    }
}
