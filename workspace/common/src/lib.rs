//! Common transport-layer types shared between the server handlers and the
//! reminder engine. The engine converts its domain results into these shapes
//! so handlers can serialize them without knowing about evaluation internals.

mod notifications;
mod settings;

pub use notifications::{
    DispatchSummary, EventKindDto, LowStockDto, NotificationFeedItem, TransactionKindDto,
    UpcomingEventDto, UpcomingTransactionDto,
};
pub use settings::{
    EventReminderSettings, LowStockReminderSettings, NotificationSettingsDto,
    TransactionReminderSettings,
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}
