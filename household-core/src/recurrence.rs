//! Recurrence expansion for calendar events.
//!
//! Expands one stored event into its concrete occurrences between the event's
//! own start and a fixed horizon (12 months after "now"). Every occurrence
//! keeps the source event's duration.

use chrono::{DateTime, Duration, Months, Utc};

use crate::model::{CalendarEvent, Recurrence};
use crate::time::parse_timestamp;

/// How far ahead recurring events are expanded.
pub const HORIZON_MONTHS: u32 = 12;

/// Upper bound on occurrences emitted for a single event.
const MAX_OCCURRENCES: usize = 5000;

/// One concrete instance of a (possibly recurring) calendar event.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// `<originalEventId>-<index>`
    pub id: String,
    /// Id the event is displayed under (the optimistic id once adopted).
    pub original_event_id: String,
    /// Id to use for server mutations.
    pub real_server_id: String,
    pub index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub event: CalendarEvent,
}

impl Occurrence {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Expands events up to a horizon computed from a fixed "now".
#[derive(Debug, Clone, Copy)]
pub struct Expander {
    horizon: DateTime<Utc>,
}

impl Expander {
    pub fn new(now: DateTime<Utc>) -> Self {
        let horizon = now
            .checked_add_months(Months::new(HORIZON_MONTHS))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Expander { horizon }
    }

    pub fn horizon(&self) -> DateTime<Utc> {
        self.horizon
    }

    /// Expand `event` into occurrences.
    ///
    /// `real_server_id` is the server id of the row when it differs from the
    /// displayed id; otherwise the displayed id is used for mutations.
    /// Events whose start or end does not parse produce no occurrences.
    pub fn expand(&self, event: &CalendarEvent, real_server_id: Option<&str>) -> Vec<Occurrence> {
        let (Some(start), Some(end)) = (
            parse_timestamp(&event.date_time_start),
            parse_timestamp(&event.date_time_end),
        ) else {
            tracing::warn!(
                event_id = %event.id,
                start = %event.date_time_start,
                end = %event.date_time_end,
                "skipping calendar event with unparseable timestamps"
            );
            return Vec::new();
        };

        let duration = end - start;
        let real_server_id = real_server_id.unwrap_or(&event.id);

        let mut occurrences = Vec::new();

        for index in 0..MAX_OCCURRENCES {
            let Some(occ_start) = nth_start(start, event.recurrence, index) else {
                break;
            };

            // The first occurrence is always emitted; repeats stop at the horizon.
            if index > 0 && occ_start > self.horizon {
                break;
            }

            occurrences.push(Occurrence {
                id: format!("{}-{}", event.id, index),
                original_event_id: event.id.clone(),
                real_server_id: real_server_id.to_string(),
                index,
                start: occ_start,
                end: occ_start + duration,
                event: event.clone(),
            });

            if event.recurrence.is_one_time() {
                break;
            }
        }

        if occurrences.len() == MAX_OCCURRENCES {
            tracing::warn!(event_id = %event.id, "recurrence expansion truncated");
        }

        occurrences
    }
}

/// Start of the `n`th occurrence. Month-based rules add whole months to the
/// original start (clamping the day), so a rule starting on the 31st keeps
/// returning to the 31st where the month has one.
fn nth_start(start: DateTime<Utc>, recurrence: Recurrence, n: usize) -> Option<DateTime<Utc>> {
    let n32 = u32::try_from(n).ok()?;
    let n64 = i64::from(n32);

    match recurrence {
        Recurrence::OneTime | Recurrence::Unknown => (n == 0).then_some(start),
        Recurrence::Daily => start.checked_add_signed(Duration::days(n64)),
        Recurrence::Weekly => start.checked_add_signed(Duration::weeks(n64)),
        Recurrence::Monthly => start.checked_add_months(Months::new(n32)),
        Recurrence::Yearly => start.checked_add_months(Months::new(n32.checked_mul(12)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(recurrence: Recurrence, start: &str, end: &str) -> CalendarEvent {
        let mut event = CalendarEvent::new("Dinner", start, end, "fam-1");
        event.id = "evt-1".into();
        event.recurrence = recurrence;
        event
    }

    fn jan_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn one_time_yields_its_own_interval() {
        let expander = Expander::new(jan_first());
        let ev = event(
            Recurrence::OneTime,
            "2024-01-01T18:00:00Z",
            "2024-01-01T19:00:00Z",
        );

        let occurrences = expander.expand(&ev, None);

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].id, "evt-1-0");
        assert_eq!(
            occurrences[0].start,
            Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap()
        );
        assert_eq!(
            occurrences[0].end,
            Utc.with_ymd_and_hms(2024, 1, 1, 19, 0, 0).unwrap()
        );
        assert_eq!(occurrences[0].real_server_id, "evt-1");
    }

    #[test]
    fn one_time_beyond_horizon_is_still_emitted() {
        let expander = Expander::new(jan_first());
        let ev = event(
            Recurrence::OneTime,
            "2030-01-01T18:00:00Z",
            "2030-01-01T19:00:00Z",
        );
        assert_eq!(expander.expand(&ev, None).len(), 1);
    }

    #[test]
    fn unknown_recurrence_behaves_like_one_time() {
        let expander = Expander::new(jan_first());
        let ev = event(
            Recurrence::Unknown,
            "2024-01-01T18:00:00Z",
            "2024-01-01T19:00:00Z",
        );
        assert_eq!(expander.expand(&ev, None).len(), 1);
    }

    #[test]
    fn weekly_steps_seven_days_and_keeps_duration() {
        let expander = Expander::new(jan_first());
        let ev = event(
            Recurrence::Weekly,
            "2024-01-01T18:00:00Z",
            "2024-01-01T19:30:00Z",
        );

        let occurrences = expander.expand(&ev, Some("srv-1"));

        assert_eq!(occurrences.len(), 365 / 7 + 1);
        for pair in occurrences.windows(2) {
            assert_eq!(pair[1].start - pair[0].start, Duration::days(7));
        }
        assert!(
            occurrences
                .iter()
                .all(|o| o.duration() == Duration::minutes(90))
        );
        assert!(occurrences.iter().all(|o| o.real_server_id == "srv-1"));
        assert_eq!(occurrences.last().unwrap().id, "evt-1-52");
    }

    #[test]
    fn daily_covers_the_horizon_inclusively() {
        let expander = Expander::new(jan_first());
        let ev = event(Recurrence::Daily, "2024-01-01", "2024-01-01T01:00");

        let occurrences = expander.expand(&ev, None);

        // 2024 is a leap year: Jan 1 2024 ..= Jan 1 2025.
        assert_eq!(occurrences.len(), 367);
        assert_eq!(occurrences.last().unwrap().start, expander.horizon());
    }

    #[test]
    fn monthly_does_not_drift_after_short_months() {
        let expander = Expander::new(jan_first());
        let ev = event(
            Recurrence::Monthly,
            "2024-01-31T09:00:00Z",
            "2024-01-31T10:00:00Z",
        );

        let starts: Vec<_> = expander
            .expand(&ev, None)
            .iter()
            .map(|o| o.start.date_naive().to_string())
            .collect();

        assert_eq!(starts[0], "2024-01-31");
        assert_eq!(starts[1], "2024-02-29");
        assert_eq!(starts[2], "2024-03-31");
        assert_eq!(starts[11], "2024-12-31");
        assert_eq!(starts.len(), 12);
    }

    #[test]
    fn yearly_within_horizon() {
        let expander = Expander::new(jan_first());
        let ev = event(
            Recurrence::Yearly,
            "2023-06-01T09:00:00Z",
            "2023-06-01T10:00:00Z",
        );
        assert_eq!(expander.expand(&ev, None).len(), 2);
    }

    #[test]
    fn unparseable_timestamps_skip_the_event() {
        let expander = Expander::new(jan_first());
        let ev = event(Recurrence::Weekly, "tomorrow-ish", "2024-01-01T19:00:00Z");
        assert!(expander.expand(&ev, None).is_empty());

        let ev = event(Recurrence::OneTime, "2024-01-01T18:00:00Z", "");
        assert!(expander.expand(&ev, None).is_empty());
    }
}
