use chrono::NaiveDate;
use model::entities::family_member;
use tracing::warn;

use crate::dates::{days_until, next_occurrence, parse_iso_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Birthday,
    Special,
}

/// The next occurrence of a member's yearly date.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub member: family_member::Model,
    pub kind: EventKind,
    /// `Birthday` or the member's special event name.
    pub event_name: String,
    pub event_date: NaiveDate,
    pub days_left: i64,
}

impl CalendarEvent {
    /// Headline such as `Grandma's Birthday`.
    pub fn title(&self) -> String {
        format!("{}'s {}", self.member.name, self.event_name)
    }
}

/// Collects birthdays and special events occurring within `days_before` days of `today`.
///
/// A special event is considered only when both its date and name are set.
/// Unparseable dates are logged and skipped; the rest of the batch is still
/// evaluated. The result is ordered by `days_left`, ties keep member order
/// with the birthday first.
pub fn evaluate_events(
    members: &[family_member::Model],
    today: NaiveDate,
    days_before: i64,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for member in members {
        if let Some(birthday) = member.birthday.as_deref() {
            if let Some(event) =
                upcoming(member, birthday, EventKind::Birthday, "Birthday", today, days_before)
            {
                events.push(event);
            }
        }

        if let (Some(date), Some(name)) = (
            member.special_event_date.as_deref(),
            member.special_event_name.as_deref(),
        ) {
            if let Some(event) = upcoming(member, date, EventKind::Special, name, today, days_before) {
                events.push(event);
            }
        }
    }

    events.sort_by_key(|e| e.days_left);
    events
}

fn upcoming(
    member: &family_member::Model,
    raw_date: &str,
    kind: EventKind,
    event_name: &str,
    today: NaiveDate,
    days_before: i64,
) -> Option<CalendarEvent> {
    let source = match parse_iso_date(raw_date) {
        Ok(date) => date,
        Err(e) => {
            warn!(member_id = member.id, date = raw_date, "Invalid date for {} of {}: {}", event_name, member.name, e);
            return None;
        }
    };

    let Some(event_date) = next_occurrence(source, today) else {
        warn!(member_id = member.id, date = raw_date, "No next occurrence for {} of {}", event_name, member.name);
        return None;
    };

    let days_left = days_until(today, event_date);
    (0..=days_before).contains(&days_left).then(|| CalendarEvent {
        member: member.clone(),
        kind,
        event_name: event_name.to_string(),
        event_date,
        days_left,
    })
}
