//! TUI rendering traits for household types.
//!
//! Extension traits that add colored terminal rendering to household-core
//! types using owo_colors.

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

use household_core::Record;
use household_core::alert::Alert;
use household_core::calendar::CalendarEntry;
use household_core::model::{CalendarEvent, Expense, HomeDuty, Priority, ShopItem};
use household_core::reconcile::Displayed;
use household_core::time::parse_timestamp;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

fn when(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%a %d %b %H:%M").to_string()
}

fn when_str(s: &str) -> String {
    parse_timestamp(s).map_or_else(|| s.to_string(), |dt| when(&dt))
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

impl Render for Priority {
    fn render(&self) -> String {
        match self {
            Priority::High => "!".red().to_string(),
            Priority::Normal => " ".to_string(),
            Priority::Low => "·".dimmed().to_string(),
        }
    }
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        format!(
            "{} {} {} {}",
            self.priority.render(),
            self.name,
            when_str(&self.date_time_start).dimmed(),
            format!("({})", self.recurrence).dimmed()
        )
    }
}

impl Render for ShopItem {
    fn render(&self) -> String {
        format!(
            "{} {} x{} {}",
            self.priority.render(),
            self.name,
            self.quantity,
            format!("{:?}", self.category).to_lowercase().dimmed()
        )
    }
}

impl Render for Expense {
    fn render(&self) -> String {
        format!(
            "{} {} {} {}",
            format!("{:>10.2} {}", self.amount, self.currency).yellow(),
            self.name,
            when_str(&self.date).dimmed(),
            self.user_id.dimmed()
        )
    }
}

impl Render for HomeDuty {
    fn render(&self) -> String {
        format!(
            "{} → {} due {} {}",
            self.name,
            self.assign_to.cyan(),
            when_str(&self.due_to),
            format!("({})", self.recurrence).dimmed()
        )
    }
}

/// A row of a list, marked while it only exists locally.
impl<R: Record + Render> Render for Displayed<R> {
    fn render(&self) -> String {
        let marker = if self.is_optimistic() {
            "…".yellow().to_string()
        } else {
            " ".to_string()
        };
        format!(
            "{marker} {} {}",
            short_id(self.id()).dimmed(),
            self.record.render()
        )
    }
}

impl Render for CalendarEntry {
    fn render(&self) -> String {
        match self {
            CalendarEntry::Holiday(h) => format!(
                "  {} {}",
                h.date.format("%a %d %b").to_string().dimmed(),
                format!("🎉 {}", h.name).magenta()
            ),
            CalendarEntry::Event(o) => format!(
                "{} {} {} {}",
                self.priority().render(),
                when(&o.start).dimmed(),
                o.event.name,
                short_id(&o.original_event_id).dimmed()
            ),
        }
    }
}

impl Render for Alert {
    fn render(&self) -> String {
        if self.message.starts_with("Could not") {
            format!("✗ {}", self.message).red().to_string()
        } else {
            format!("✓ {}", self.message).green().to_string()
        }
    }
}

/// Print a list, or a dimmed placeholder when it is empty.
pub fn print_list<T: Render>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "   Nothing here".dimmed());
        return;
    }
    for row in rows {
        println!("{}", row.render());
    }
}
