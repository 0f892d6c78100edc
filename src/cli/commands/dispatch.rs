use anyhow::Result;
use compute::{ReminderRun, RunScope};
use tracing::info;

use crate::config::{AppConfig, initialize_app_state};

/// One reminder run from the command line, for cron setups without HTTP.
pub async fn dispatch(config: &AppConfig, user_id: Option<i32>) -> Result<()> {
    let state = initialize_app_state(config).await?;
    let scope = match user_id {
        Some(user_id) => RunScope::SingleUser(user_id),
        None => RunScope::AllUsers,
    };

    info!("Dispatching reminders for {:?}", scope);
    let summary = ReminderRun::new(state.source.as_ref(), state.dispatcher.as_ref())
        .execute(scope, state.clock.now())
        .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
