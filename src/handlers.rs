pub mod device_tokens;
pub mod family_members;
pub mod health;
pub mod notification_settings;
pub mod products;
pub mod reminders;
pub mod transactions;
