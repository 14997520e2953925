use anyhow::{Context as _, Result};
use chrono::{Duration, NaiveDate, Utc};
use owo_colors::OwoColorize;

use household_core::calendar::{CalendarEntry, between, calendar_entries, upcoming as upcoming_events};
use household_core::holidays::{HolidaySource, PublicHolidays};
use household_core::model::CalendarEvent;
use household_core::recurrence::Expander;

use crate::context::Context;
use crate::render::{Render, print_list};

async fn entries(ctx: &Context) -> Result<Vec<CalendarEntry>> {
    let store = ctx.store::<CalendarEvent>().await?;
    let now = Utc::now();

    let holidays = PublicHolidays::for_language(&ctx.config.language).around(now.date_naive());
    Ok(calendar_entries(
        store.displayed().as_slice(),
        &Expander::new(now),
        &holidays,
    ))
}

/// Entries from `from` (default today) for `days` days.
pub async fn run(ctx: &Context, from: Option<&str>, days: i64) -> Result<()> {
    let from = match from {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Expected YYYY-MM-DD, got '{s}'"))?,
        None => Utc::now().date_naive(),
    };
    let start = from.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = start + Duration::days(days.max(1));

    let entries = entries(ctx).await?;
    let window = between(&entries, start, end);

    println!(
        "{}",
        format!("📅 {} to {}", from, (end - Duration::days(1)).date_naive()).bold()
    );
    if window.is_empty() {
        println!("{}", "   Nothing planned".dimmed());
    }
    for entry in window {
        println!("{}", entry.render());
    }
    Ok(())
}

/// One-time events that have not ended yet.
pub async fn upcoming(ctx: &Context) -> Result<()> {
    let entries = entries(ctx).await?;
    let events: Vec<CalendarEntry> = upcoming_events(&entries, Utc::now())
        .into_iter()
        .cloned()
        .map(CalendarEntry::Event)
        .collect();

    print_list(&events);
    Ok(())
}
