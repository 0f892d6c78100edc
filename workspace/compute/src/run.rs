//! A single reminder dispatch run over one or all users.

use chrono::NaiveDateTime;
use common::DispatchSummary;
use tracing::{debug, error, info, instrument, warn};

use crate::dispatch::{PushDispatcher, send_to_devices};
use crate::error::Result;
use crate::events::evaluate_events;
use crate::products::evaluate_low_stock;
use crate::settings::ReminderSettings;
use crate::source::{ReminderSource, RunScope};
use crate::summary::{
    PushMessage, low_stock_message, upcoming_events_message, upcoming_transactions_message,
};
use crate::transactions::evaluate_transactions;

/// Evaluates reminders and hands summaries to the push dispatcher.
///
/// Users are processed one after another. A user whose data cannot be loaded
/// is skipped; notifications already sent for that user stay sent.
pub struct ReminderRun<'a> {
    source: &'a dyn ReminderSource,
    dispatcher: &'a dyn PushDispatcher,
}

impl<'a> ReminderRun<'a> {
    pub fn new(source: &'a dyn ReminderSource, dispatcher: &'a dyn PushDispatcher) -> Self {
        Self { source, dispatcher }
    }

    /// Runs over every user in `scope` as of `now` (server local time).
    ///
    /// Fails only when the users to process cannot be listed.
    #[instrument(skip(self), fields(manual = scope.is_manual()))]
    pub async fn execute(&self, scope: RunScope, now: NaiveDateTime) -> Result<DispatchSummary> {
        info!("Reminder run at server time {}", now.format("%H:%M"));

        let mut summary = DispatchSummary {
            manual: scope.is_manual(),
            ..Default::default()
        };

        for user_id in self.source.user_ids(scope).await? {
            match self.process_user(user_id, scope.is_manual(), now, &mut summary).await {
                Ok(true) => summary.users_processed += 1,
                Ok(false) => summary.users_skipped += 1,
                Err(e) => {
                    error!(user_id, "Skipping user after load failure: {}", e);
                    summary.users_skipped += 1;
                }
            }
        }

        info!(
            "Reminder run finished: {} notifications, {} users processed, {} skipped",
            summary.notifications_sent, summary.users_processed, summary.users_skipped
        );
        Ok(summary)
    }

    /// Returns `Ok(false)` when the user has nothing to evaluate.
    async fn process_user(
        &self,
        user_id: i32,
        manual: bool,
        now: NaiveDateTime,
        summary: &mut DispatchSummary,
    ) -> Result<bool> {
        let Some(model) = self.source.settings(user_id).await? else {
            debug!(user_id, "No notification settings, skipping");
            return Ok(false);
        };

        let tokens = self.source.device_tokens(user_id).await?;
        if tokens.is_empty() {
            debug!(user_id, "No device tokens, skipping");
            return Ok(false);
        }

        let settings = ReminderSettings::from(&model);
        let today = now.date();
        let time = now.time();

        if settings.transactions.is_due(time, manual) {
            let transactions = self.source.planned_transactions(user_id).await?;
            let upcoming =
                evaluate_transactions(&transactions, today, settings.transaction_reminder_days);
            debug!(user_id, "{} upcoming transactions", upcoming.len());
            if !upcoming.is_empty() {
                self.notify(user_id, &tokens, upcoming_transactions_message(upcoming.len()), summary)
                    .await;
            }
        }

        if settings.low_stock.is_due(time, manual) {
            let products = self.source.products(user_id).await?;
            let low = evaluate_low_stock(&products);
            debug!(user_id, "{} products low on stock", low.len());
            if !low.is_empty() {
                self.notify(user_id, &tokens, low_stock_message(low.len()), summary)
                    .await;
            }
        }

        if settings.events.is_due(time, manual) {
            let members = self.source.family_members(user_id).await?;
            let events = evaluate_events(&members, today, settings.event_days_before);
            debug!(user_id, "{} upcoming events", events.len());
            if !events.is_empty() {
                self.notify(
                    user_id,
                    &tokens,
                    upcoming_events_message(events.len(), settings.event_days_before),
                    summary,
                )
                .await;
            }
        }

        Ok(true)
    }

    async fn notify(
        &self,
        user_id: i32,
        tokens: &[String],
        message: PushMessage,
        summary: &mut DispatchSummary,
    ) {
        match send_to_devices(self.dispatcher, tokens, &message).await {
            Ok(Some(_)) => summary.notifications_sent += 1,
            Ok(None) => {}
            Err(e) => warn!(user_id, "Error sending '{}': {}", message.title, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySource, RecordingDispatcher, UserFixture};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn source() -> InMemorySource {
        InMemorySource::default()
            .with_user(UserFixture::reminder_ready(1, "08:00"))
            .with_user(UserFixture::reminder_ready(2, "18:00"))
    }

    #[tokio::test]
    async fn test_scheduled_run_respects_time_of_day() {
        let source = source();
        let dispatcher = RecordingDispatcher::default();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::AllUsers, at(8, 0))
            .await
            .unwrap();

        assert_eq!(summary.notifications_sent, 3);
        assert_eq!(summary.users_processed, 2);
        assert!(!summary.manual);

        let sent = dispatcher.sent();
        assert!(sent.iter().all(|m| m.tokens == vec!["device-1".to_string()]));
        let titles: Vec<&str> = sent.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Upcoming Transactions", "Low Stock Alert", "Upcoming Family Events"]
        );
        assert_eq!(sent[0].body, "You have 1 upcoming transaction due soon.");
        assert_eq!(sent[2].body, "You have 1 upcoming family event in the next 7 days.");
    }

    #[tokio::test]
    async fn test_scheduled_run_outside_configured_minute_sends_nothing() {
        let source = source();
        let dispatcher = RecordingDispatcher::default();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::AllUsers, at(12, 0))
            .await
            .unwrap();

        assert_eq!(summary.notifications_sent, 0);
        assert_eq!(summary.users_processed, 2);
        assert!(dispatcher.sent().is_empty());
        assert!(source.loaded_users().is_empty());
    }

    #[tokio::test]
    async fn test_manual_run_is_scoped_to_one_user() {
        let source = source();
        let dispatcher = RecordingDispatcher::default();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::SingleUser(2), at(3, 17))
            .await
            .unwrap();

        assert!(summary.manual);
        assert_eq!(summary.notifications_sent, 3);
        assert_eq!(summary.users_processed, 1);
        assert!(dispatcher.sent().iter().all(|m| m.tokens == vec!["device-2".to_string()]));
        assert!(source.loaded_users().iter().all(|id| *id == 2));
    }

    #[tokio::test]
    async fn test_manual_run_still_honours_enabled_flag() {
        let mut fixture = UserFixture::reminder_ready(1, "08:00");
        if let Some(settings) = fixture.settings.as_mut() {
            settings.low_stock_enabled = false;
            settings.events_enabled = false;
        }
        let source = InMemorySource::default().with_user(fixture);
        let dispatcher = RecordingDispatcher::default();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::SingleUser(1), at(22, 45))
            .await
            .unwrap();

        assert_eq!(summary.notifications_sent, 1);
        assert_eq!(dispatcher.sent()[0].title, "Upcoming Transactions");
    }

    #[tokio::test]
    async fn test_users_without_settings_or_tokens_are_skipped() {
        let mut no_settings = UserFixture::reminder_ready(1, "08:00");
        no_settings.settings = None;
        let mut no_tokens = UserFixture::reminder_ready(2, "08:00");
        no_tokens.tokens.clear();

        let source = InMemorySource::default()
            .with_user(no_settings)
            .with_user(no_tokens)
            .with_user(UserFixture::reminder_ready(3, "08:00"));
        let dispatcher = RecordingDispatcher::default();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::AllUsers, at(8, 0))
            .await
            .unwrap();

        assert_eq!(summary.users_skipped, 2);
        assert_eq!(summary.users_processed, 1);
        assert_eq!(summary.notifications_sent, 3);
    }

    #[tokio::test]
    async fn test_load_failure_skips_only_that_user() {
        let source = source().failing_for(1);
        let dispatcher = RecordingDispatcher::default();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::AllUsers, at(18, 0))
            .await
            .unwrap();

        assert_eq!(summary.users_skipped, 1);
        assert_eq!(summary.users_processed, 1);
        assert_eq!(summary.notifications_sent, 3);
    }

    #[tokio::test]
    async fn test_provider_failure_does_not_stop_other_categories() {
        let source = source();
        let dispatcher = RecordingDispatcher::unavailable();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::SingleUser(1), at(8, 0))
            .await
            .unwrap();

        assert_eq!(summary.notifications_sent, 0);
        assert_eq!(summary.users_processed, 1);
        assert_eq!(dispatcher.attempts(), 3);
    }

    #[tokio::test]
    async fn test_nothing_eligible_sends_nothing() {
        let mut quiet = UserFixture::reminder_ready(1, "08:00");
        quiet.transactions.clear();
        quiet.products.clear();
        quiet.members.clear();
        let source = InMemorySource::default().with_user(quiet);
        let dispatcher = RecordingDispatcher::default();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::SingleUser(1), at(8, 0))
            .await
            .unwrap();

        assert_eq!(summary.notifications_sent, 0);
        assert!(dispatcher.sent().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_runs_resend() {
        let source = source();
        let dispatcher = RecordingDispatcher::default();
        let run = ReminderRun::new(&source, &dispatcher);

        let first = run.execute(RunScope::SingleUser(1), at(8, 0)).await.unwrap();
        let second = run.execute(RunScope::SingleUser(1), at(8, 0)).await.unwrap();

        assert_eq!(first, second);
        let sent = dispatcher.sent();
        assert_eq!(sent.len(), 6);
        assert_eq!(sent[..3], sent[3..]);
    }

    #[tokio::test]
    async fn test_unknown_manual_user_processes_nobody() {
        let source = source();
        let dispatcher = RecordingDispatcher::default();

        let summary = ReminderRun::new(&source, &dispatcher)
            .execute(RunScope::SingleUser(42), at(8, 0))
            .await
            .unwrap();

        assert_eq!(summary, DispatchSummary { manual: true, ..Default::default() });
    }
}
