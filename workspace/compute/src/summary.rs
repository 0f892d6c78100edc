//! One-line push messages summarising a category's reminders.

/// Title and body of a push notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

fn noun(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

pub fn upcoming_transactions_message(count: usize) -> PushMessage {
    PushMessage::new(
        "Upcoming Transactions",
        format!(
            "You have {} upcoming {} due soon.",
            count,
            noun(count, "transaction", "transactions")
        ),
    )
}

pub fn low_stock_message(count: usize) -> PushMessage {
    PushMessage::new(
        "Low Stock Alert",
        format!(
            "You have {} {} running low on stock.",
            count,
            noun(count, "product", "products")
        ),
    )
}

pub fn upcoming_events_message(count: usize, days_before: i64) -> PushMessage {
    let horizon = match days_before {
        0 => "today".to_string(),
        1 => "in the next day".to_string(),
        days => format!("in the next {} days", days),
    };
    PushMessage::new(
        "Upcoming Family Events",
        format!(
            "You have {} upcoming family {} {}.",
            count,
            noun(count, "event", "events"),
            horizon
        ),
    )
}
