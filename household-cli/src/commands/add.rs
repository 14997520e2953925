use anyhow::{Context as _, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use serde::de::DeserializeOwned;

use household_core::Record;
use household_core::model::{
    CalendarEvent, Currency, Expense, ExpenseCategory, HomeDuty, Priority, Recurrence,
    ShopCategory, ShopItem, due_from_preset,
};
use household_core::time::{format_timestamp, parse_timestamp};

use crate::commands::settle;
use crate::context::Context;
use crate::render::Render;

#[derive(Subcommand)]
pub enum AddCommand {
    /// Calendar event
    Event {
        name: String,

        /// Start date/time (e.g., "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End date/time; defaults to start + duration
        #[arg(short, long)]
        end: Option<String>,

        /// Length of the event (e.g., "90m", "2h")
        #[arg(short, long, default_value = "1h")]
        duration: String,

        #[arg(short, long, default_value = "ONE_TIME", value_parser = parse_recurrence)]
        recurrence: Recurrence,

        #[arg(short, long, default_value = "NORMAL", value_parser = wire_enum::<Priority>)]
        priority: Priority,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Expense
    Expense {
        name: String,
        amount: f64,

        #[arg(short, long, default_value = "EUR", value_parser = wire_enum::<Currency>)]
        currency: Currency,

        /// Day of the expense; defaults to today
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value = "OTHER", value_parser = wire_enum::<ExpenseCategory>)]
        category: ExpenseCategory,

        #[arg(long)]
        note: Option<String>,
    },
    /// Shopping list item
    Shop {
        name: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[arg(long, default_value = "OTHER", value_parser = wire_enum::<ShopCategory>)]
        category: ShopCategory,

        #[arg(short, long, default_value = "NORMAL", value_parser = wire_enum::<Priority>)]
        priority: Priority,

        #[arg(long)]
        description: Option<String>,
    },
    /// Home chore
    Chore {
        name: String,

        /// Member the chore is assigned to; defaults to you
        #[arg(short, long)]
        assign_to: Option<String>,

        /// today, tomorrow, week, month or a date
        #[arg(long, default_value = "today")]
        due: String,

        #[arg(short, long, default_value = "ONE_TIME", value_parser = parse_recurrence)]
        recurrence: Recurrence,

        #[arg(long)]
        description: Option<String>,
    },
}

/// Parse an enum by its wire name, case-insensitively.
fn wire_enum<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    let name = s.trim().to_ascii_uppercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(name))
        .map_err(|_| format!("unknown value '{s}'"))
}

fn parse_recurrence(s: &str) -> Result<Recurrence, String> {
    Recurrence::parse(s).ok_or_else(|| format!("unknown recurrence '{s}'"))
}

fn parse_when(s: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(s).with_context(|| format!("Could not parse date/time '{s}'"))
}

fn parse_duration(s: &str) -> Result<Duration> {
    let std_dur = humantime::parse_duration(s).map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(Duration::from_std(std_dur)?)
}

pub async fn run(ctx: &Context, command: AddCommand) -> Result<()> {
    let family_id = ctx.member.family_id.clone();
    let now = Utc::now();

    match command {
        AddCommand::Event {
            name,
            start,
            end,
            duration,
            recurrence,
            priority,
            color,
            description,
        } => {
            let start = parse_when(&start)?;
            let end = match end {
                Some(end) => parse_when(&end)?,
                None => start + parse_duration(&duration)?,
            };

            let mut event = CalendarEvent::new(
                name,
                format_timestamp(&start),
                format_timestamp(&end),
                family_id,
            );
            event.recurrence = recurrence;
            event.priority = priority;
            event.color = color;
            event.description = description;
            event.user_ids = vec![ctx.member.user_id.clone()];

            add(ctx, event).await
        }
        AddCommand::Expense {
            name,
            amount,
            currency,
            date,
            category,
            note,
        } => {
            let date = match date {
                Some(date) => parse_when(&date)?,
                None => now,
            };

            add(
                ctx,
                Expense {
                    id: String::new(),
                    name,
                    amount,
                    currency,
                    date: format_timestamp(&date),
                    note,
                    category,
                    user_id: ctx.member.user_id.clone(),
                    family_id,
                },
            )
            .await
        }
        AddCommand::Shop {
            name,
            quantity,
            category,
            priority,
            description,
        } => {
            add(
                ctx,
                ShopItem {
                    id: String::new(),
                    name,
                    description,
                    quantity,
                    category,
                    priority,
                    family_id,
                },
            )
            .await
        }
        AddCommand::Chore {
            name,
            assign_to,
            due,
            recurrence,
            description,
        } => {
            let due_to = match due.as_str() {
                "today" | "tomorrow" | "week" | "month" => due_from_preset(&due, now),
                other => parse_when(other)?,
            };

            add(
                ctx,
                HomeDuty {
                    id: String::new(),
                    name,
                    description,
                    assign_to: assign_to.unwrap_or_else(|| ctx.member.user_id.clone()),
                    due_to: format_timestamp(&due_to),
                    recurrence,
                    family_id,
                },
            )
            .await
        }
    }
}

async fn add<R: Record + Render>(ctx: &Context, draft: R) -> Result<()> {
    let store = ctx.store::<R>().await?;
    let submitted = store.create(draft)?;
    settle(&store, submitted).await
}
