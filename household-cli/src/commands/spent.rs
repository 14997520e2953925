use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;

use household_core::expenses::{Rates, SpendQuery, Window, spent_in_window};
use household_core::model::{Currency, Expense};

use crate::context::Context;

pub async fn run(ctx: &Context, window: &str, user: Option<&str>, currency: &str) -> Result<()> {
    let window: Window = window.parse()?;
    let currency = Currency::parse(currency)
        .ok_or_else(|| anyhow::anyhow!("Unknown currency '{currency}' (EUR, USD, CZK)"))?;

    let store = ctx.store::<Expense>().await?;
    let rows = store.displayed();
    let items: Vec<Expense> = rows.iter().map(|d| d.record.clone()).collect();

    let rates = match Rates::fetch(&reqwest::Client::new()).await {
        Ok(rates) => Some(rates),
        Err(e) => {
            tracing::warn!(error = %e, "exchange rates unavailable, counting {currency} expenses only");
            None
        }
    };

    let query = SpendQuery {
        window,
        user_id: user,
        currency,
        today: Utc::now().date_naive(),
    };
    let total = spent_in_window(&items, &query, rates.as_ref());

    let who = user.unwrap_or("family");
    println!(
        "{} {}",
        format!("{total:.2} {currency}").yellow().bold(),
        format!("spent by {who} in the last {window}").dimmed()
    );
    Ok(())
}
