//! Household record types.
//!
//! These are the rows of the four family collections as they travel over the
//! wire (camelCase JSON). Each record has a `*Patch` companion carrying only
//! the fields an edit changes.

mod calendar_event;
mod expense;
mod home_duty;
mod shop_item;

pub use calendar_event::{CalendarEvent, CalendarEventPatch};
pub use expense::{Expense, ExpensePatch};
pub use home_duty::{HomeDuty, HomeDutyPatch, due_from_preset};
pub use shop_item::{ShopItem, ShopItemPatch};

use std::fmt;

use serde::{Deserialize, Serialize};

/// How often an event or chore repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recurrence {
    #[default]
    OneTime,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Anything the server sends that we don't know; expands like ONE_TIME.
    #[serde(other)]
    Unknown,
}

impl Recurrence {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ONE_TIME" | "ONCE" => Some(Recurrence::OneTime),
            "DAILY" => Some(Recurrence::Daily),
            "WEEKLY" => Some(Recurrence::Weekly),
            "MONTHLY" => Some(Recurrence::Monthly),
            "YEARLY" => Some(Recurrence::Yearly),
            _ => None,
        }
    }

    /// Whether the expander should emit a single occurrence.
    pub fn is_one_time(&self) -> bool {
        matches!(self, Recurrence::OneTime | Recurrence::Unknown)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recurrence::OneTime | Recurrence::Unknown => "one-time",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Yearly => "yearly",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HIGH" => Some(Priority::High),
            "NORMAL" => Some(Priority::Normal),
            "LOW" => Some(Priority::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    #[default]
    Eur,
    Czk,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Czk => "CZK",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "CZK" => Some(Currency::Czk),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Food,
    Bills,
    Entertainment,
    Transport,
    Health,
    Shopping,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShopCategory {
    Food,
    Clothes,
    Entertainment,
    Health,
    House,
    #[default]
    Other,
}
