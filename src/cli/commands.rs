pub mod create_user;
pub mod dispatch;
pub mod initdb;
pub mod issue_token;
pub mod serve;

pub use create_user::create_user;
pub use dispatch::dispatch;
pub use initdb::init_database;
pub use issue_token::issue_token;
pub use serve::serve;
