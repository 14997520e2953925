//! The calendar as shown: expanded occurrences of the displayed events plus
//! holidays.

use chrono::{DateTime, Utc};

use crate::holidays::Holiday;
use crate::model::{CalendarEvent, Priority, Recurrence};
use crate::reconcile::Displayed;
use crate::recurrence::{Expander, Occurrence};

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarEntry {
    Event(Occurrence),
    /// Read-only; never routed to the mutation paths.
    Holiday(Holiday),
}

impl CalendarEntry {
    pub fn id(&self) -> &str {
        match self {
            CalendarEntry::Event(o) => &o.id,
            CalendarEntry::Holiday(h) => &h.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CalendarEntry::Event(o) => &o.event.name,
            CalendarEntry::Holiday(h) => &h.name,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        match self {
            CalendarEntry::Event(o) => o.start,
            CalendarEntry::Holiday(h) => h.start,
        }
    }

    pub fn end(&self) -> DateTime<Utc> {
        match self {
            CalendarEntry::Event(o) => o.end,
            CalendarEntry::Holiday(h) => h.end,
        }
    }

    pub fn is_holiday(&self) -> bool {
        matches!(self, CalendarEntry::Holiday(_))
    }

    pub fn priority(&self) -> Priority {
        match self {
            CalendarEntry::Event(o) => o.event.priority,
            CalendarEntry::Holiday(_) => Priority::Low,
        }
    }

    pub fn recurrence(&self) -> Recurrence {
        match self {
            CalendarEntry::Event(o) => o.event.recurrence,
            CalendarEntry::Holiday(_) => Recurrence::Yearly,
        }
    }

    pub fn occurrence(&self) -> Option<&Occurrence> {
        match self {
            CalendarEntry::Event(o) => Some(o),
            CalendarEntry::Holiday(_) => None,
        }
    }
}

/// Expand every displayed event and append `holidays`.
///
/// Occurrences of an adopted optimistic row carry the optimistic id as
/// `original_event_id` and the server id as `real_server_id`.
pub fn calendar_entries(
    displayed: &[Displayed<CalendarEvent>],
    expander: &Expander,
    holidays: &[Holiday],
) -> Vec<CalendarEntry> {
    displayed
        .iter()
        .flat_map(|row| expander.expand(&row.record, row.server_id.as_deref()))
        .map(CalendarEntry::Event)
        .chain(holidays.iter().cloned().map(CalendarEntry::Holiday))
        .collect()
}

/// Entries for the upcoming-events list: one-time events that have not
/// ended yet, soonest first. Holidays and recurring events are left out.
pub fn upcoming(entries: &[CalendarEntry], now: DateTime<Utc>) -> Vec<&Occurrence> {
    let mut upcoming: Vec<&Occurrence> = entries
        .iter()
        .filter_map(CalendarEntry::occurrence)
        .filter(|o| o.event.recurrence == Recurrence::OneTime && o.end >= now)
        .collect();
    upcoming.sort_by_key(|o| o.start);
    upcoming
}

/// Entries overlapping `[from, to)`, ordered by start.
pub fn between(
    entries: &[CalendarEntry],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<&CalendarEntry> {
    let mut window: Vec<&CalendarEntry> = entries
        .iter()
        .filter(|e| e.start() < to && e.end() >= from)
        .collect();
    window.sort_by_key(|e| e.start());
    window
}
