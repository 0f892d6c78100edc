use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TransactionReminderSettings {
    pub enabled: bool,
    /// Time of day (`HH:mm`) for scheduled runs.
    pub time: Option<String>,
    /// Days ahead of today that a planned transaction becomes reminder-worthy.
    pub reminder_days: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LowStockReminderSettings {
    pub enabled: bool,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EventReminderSettings {
    pub enabled: bool,
    pub time: Option<String>,
    /// Days ahead of a birthday or special date to start reminding.
    pub days_before: i32,
}

/// Effective reminder configuration of one user, defaults applied.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NotificationSettingsDto {
    pub transactions: TransactionReminderSettings,
    pub low_stock: LowStockReminderSettings,
    pub events: EventReminderSettings,
    /// Number of registered device tokens.
    pub device_count: u32,
}
