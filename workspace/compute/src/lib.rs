pub mod dates;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod feed;
pub mod products;
pub mod run;
pub mod settings;
pub mod source;
pub mod summary;
pub mod transactions;

#[cfg(test)]
mod testing;

pub use dispatch::{DispatchError, MulticastMessage, MulticastReport, PushDispatcher, TokenOutcome};
pub use error::{ComputeError, Result};
pub use feed::build_feed;
pub use run::ReminderRun;
pub use settings::ReminderSettings;
pub use source::{ReminderSource, RunScope, SeaOrmSource};
