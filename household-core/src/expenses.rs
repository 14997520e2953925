//! Spending totals over a trailing window.

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::Deserialize;

use crate::error::{HouseholdError, HouseholdResult};
use crate::model::{Currency, Expense};
use crate::time::parse_timestamp;

/// Daily EUR reference rates.
pub const RATES_URL: &str = "https://api.frankfurter.app/latest?from=EUR&to=USD,CZK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    #[default]
    Week,
    Month,
    Year,
}

impl Window {
    /// First day counted when looking back from `today`.
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        let start = match self {
            Window::Week => today.checked_sub_days(chrono::Days::new(7)),
            Window::Month => today.checked_sub_months(Months::new(1)),
            Window::Year => today.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(NaiveDate::MIN)
    }
}

impl FromStr for Window {
    type Err = HouseholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Window::Week),
            "month" => Ok(Window::Month),
            "year" => Ok(Window::Year),
            other => Err(HouseholdError::Validation(format!(
                "unknown window '{other}' (expected week, month or year)"
            ))),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Window::Week => "week",
            Window::Month => "month",
            Window::Year => "year",
        };
        write!(f, "{s}")
    }
}

/// How many units of each currency one euro buys.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rates {
    #[serde(rename = "USD")]
    pub usd: f64,
    #[serde(rename = "CZK")]
    pub czk: f64,
}

#[derive(Deserialize)]
struct RatesResponse {
    rates: Rates,
}

impl Rates {
    pub async fn fetch(http: &reqwest::Client) -> HouseholdResult<Self> {
        let resp: RatesResponse = http
            .get(RATES_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.rates)
    }

    fn per_euro(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Eur => 1.0,
            Currency::Usd => self.usd,
            Currency::Czk => self.czk,
        }
    }

    /// Convert through EUR. Returns `None` if a rate is unusable.
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> Option<f64> {
        if from == to {
            return Some(amount);
        }
        let from_rate = self.per_euro(from);
        let to_rate = self.per_euro(to);
        if !(from_rate.is_finite() && from_rate > 0.0 && to_rate.is_finite()) {
            return None;
        }
        Some(amount / from_rate * to_rate)
    }
}

/// Filters for [`spent_in_window`].
#[derive(Debug, Clone, Copy)]
pub struct SpendQuery<'a> {
    pub window: Window,
    /// Only count this member's expenses; `None` counts the whole family.
    pub user_id: Option<&'a str>,
    pub currency: Currency,
    pub today: NaiveDate,
}

/// Sum of expenses dated on or after the window start, in `query.currency`.
///
/// Without `rates` only expenses already in the target currency count.
/// Expenses with an unparseable date are skipped.
pub fn spent_in_window(items: &[Expense], query: &SpendQuery<'_>, rates: Option<&Rates>) -> f64 {
    let start = query.window.start(query.today);

    items
        .iter()
        .filter(|e| query.user_id.is_none_or(|user| e.user_id == user))
        .filter(|e| {
            parse_timestamp(&e.date)
                .map(|dt| dt.date_naive() >= start)
                .unwrap_or(false)
        })
        .filter_map(|e| match rates {
            Some(rates) => rates.convert(e.amount, e.currency, query.currency),
            None => (e.currency == query.currency).then_some(e.amount),
        })
        .sum()
}
