//! Root of the SeaORM entity modules for the household data.
//! Each user owns their settings, device tokens, planned money movements,
//! pantry products and family calendar.

pub mod access_token;
pub mod device_token;
pub mod expense;
pub mod family_member;
pub mod income;
pub mod notification_settings;
pub mod product;
pub mod transaction_status;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::access_token::Entity as AccessToken;
    pub use super::device_token::Entity as DeviceToken;
    pub use super::expense::Entity as Expense;
    pub use super::family_member::Entity as FamilyMember;
    pub use super::income::Entity as Income;
    pub use super::notification_settings::Entity as NotificationSettings;
    pub use super::product::Entity as Product;
    pub use super::transaction_status::TransactionStatus;
    pub use super::user::Entity as User;
}
