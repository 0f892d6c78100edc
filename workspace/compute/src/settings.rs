use chrono::{NaiveTime, Timelike};
use common::{
    EventReminderSettings, LowStockReminderSettings, NotificationSettingsDto,
    TransactionReminderSettings,
};
use model::entities::notification_settings;
use tracing::debug;

/// Lookahead window for planned transactions when the user has not set one.
pub const DEFAULT_TRANSACTION_REMINDER_DAYS: i64 = 3;

/// Lookahead window for birthdays and special dates when the user has not set one.
pub const DEFAULT_EVENT_DAYS_BEFORE: i64 = 7;

/// When a category is allowed to fire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySchedule {
    pub enabled: bool,
    /// Configured wall-clock time, `HH:mm`.
    pub time: Option<String>,
}

impl CategorySchedule {
    pub fn new(enabled: bool, time: Option<String>) -> Self {
        Self { enabled, time }
    }

    /// Whether a run at `now` should evaluate this category.
    ///
    /// Manual runs ignore the configured time but still honour `enabled`.
    /// Scheduled runs fire only in the configured minute.
    pub fn is_due(&self, now: NaiveTime, manual: bool) -> bool {
        if !self.enabled {
            return false;
        }
        if manual {
            return true;
        }
        match self.time.as_deref().map(parse_time_of_day) {
            Some(Some(at)) => at.hour() == now.hour() && at.minute() == now.minute(),
            Some(None) => {
                debug!("Ignoring unparseable reminder time {:?}", self.time);
                false
            }
            None => false,
        }
    }
}

/// Parses an `HH:mm` time of day.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Effective reminder configuration for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSettings {
    pub transactions: CategorySchedule,
    pub transaction_reminder_days: i64,
    pub low_stock: CategorySchedule,
    pub events: CategorySchedule,
    pub event_days_before: i64,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            transactions: CategorySchedule::default(),
            transaction_reminder_days: DEFAULT_TRANSACTION_REMINDER_DAYS,
            low_stock: CategorySchedule::default(),
            events: CategorySchedule::default(),
            event_days_before: DEFAULT_EVENT_DAYS_BEFORE,
        }
    }
}

impl From<&notification_settings::Model> for ReminderSettings {
    fn from(model: &notification_settings::Model) -> Self {
        Self {
            transactions: CategorySchedule::new(
                model.transactions_enabled,
                model.transactions_time.clone(),
            ),
            transaction_reminder_days: window_or_default(
                model.transactions_reminder_days,
                DEFAULT_TRANSACTION_REMINDER_DAYS,
            ),
            low_stock: CategorySchedule::new(model.low_stock_enabled, model.low_stock_time.clone()),
            events: CategorySchedule::new(model.events_enabled, model.events_time.clone()),
            event_days_before: window_or_default(
                model.events_days_before,
                DEFAULT_EVENT_DAYS_BEFORE,
            ),
        }
    }
}

fn window_or_default(days: Option<i32>, default: i64) -> i64 {
    days.map(|d| i64::from(d).max(0)).unwrap_or(default)
}

impl ReminderSettings {
    pub fn to_dto(&self, device_count: u32) -> NotificationSettingsDto {
        NotificationSettingsDto {
            transactions: TransactionReminderSettings {
                enabled: self.transactions.enabled,
                time: self.transactions.time.clone(),
                reminder_days: self.transaction_reminder_days as i32,
            },
            low_stock: LowStockReminderSettings {
                enabled: self.low_stock.enabled,
                time: self.low_stock.time.clone(),
            },
            events: EventReminderSettings {
                enabled: self.events.enabled,
                time: self.events.time.clone(),
                days_before: self.event_days_before as i32,
            },
            device_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_scheduled_run_matches_configured_minute() {
        let schedule = CategorySchedule::new(true, Some("08:30".to_string()));
        assert!(schedule.is_due(at(8, 30), false));
        assert!(schedule.is_due(NaiveTime::from_hms_opt(8, 30, 59).unwrap(), false));
        assert!(!schedule.is_due(at(8, 31), false));
        assert!(!schedule.is_due(at(20, 30), false));
    }

    #[test]
    fn test_manual_run_bypasses_time_but_not_enabled() {
        let enabled = CategorySchedule::new(true, Some("08:30".to_string()));
        assert!(enabled.is_due(at(23, 59), true));

        let disabled = CategorySchedule::new(false, Some("08:30".to_string()));
        assert!(!disabled.is_due(at(8, 30), true));
        assert!(!disabled.is_due(at(8, 30), false));
    }

    #[test]
    fn test_missing_or_bad_time_never_fires_on_schedule() {
        assert!(!CategorySchedule::new(true, None).is_due(at(0, 0), false));
        assert!(!CategorySchedule::new(true, Some("8.30".to_string())).is_due(at(8, 30), false));
        assert!(CategorySchedule::new(true, Some("8:30".to_string())).is_due(at(8, 30), false));
    }

    #[test]
    fn test_windows_fall_back_to_defaults() {
        let model = notification_settings::Model {
            id: 1,
            user_id: 1,
            transactions_enabled: true,
            transactions_time: None,
            transactions_reminder_days: None,
            low_stock_enabled: false,
            low_stock_time: None,
            events_enabled: true,
            events_time: Some("07:00".to_string()),
            events_days_before: Some(-4),
        };

        let settings = ReminderSettings::from(&model);
        assert_eq!(settings.transaction_reminder_days, DEFAULT_TRANSACTION_REMINDER_DAYS);
        assert_eq!(settings.event_days_before, 0);
        assert!(settings.events.enabled);

        let dto = settings.to_dto(2);
        assert_eq!(dto.transactions.reminder_days, 3);
        assert_eq!(dto.events.time.as_deref(), Some("07:00"));
        assert_eq!(dto.device_count, 2);
    }
}
