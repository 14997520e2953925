use anyhow::{Context as _, Result};
use serde_json::{Map, Value};

use household_core::model::{CalendarEvent, Expense, HomeDuty, ShopItem};
use household_core::{Collection, Record};

use crate::commands::{find, settle};
use crate::context::Context;
use crate::render::Render;

pub async fn run(ctx: &Context, collection: Collection, id: &str, fields: &[String]) -> Result<()> {
    match collection {
        Collection::Calendar => edit::<CalendarEvent>(ctx, id, fields).await,
        Collection::Expenses => edit::<Expense>(ctx, id, fields).await,
        Collection::ShopList => edit::<ShopItem>(ctx, id, fields).await,
        Collection::HomeChores => edit::<HomeDuty>(ctx, id, fields).await,
    }
}

async fn edit<R: Record + Render>(ctx: &Context, id: &str, fields: &[String]) -> Result<()> {
    let patch = parse_patch::<R>(fields)?;

    let store = ctx.store::<R>().await?;
    let rows = store.displayed();
    let target = find(rows.as_slice(), id)?;

    let submitted = store.update(target, patch)?;
    settle(&store, submitted).await
}

/// Build a patch from `field=value` pairs. Values are read as JSON when they
/// parse (numbers, booleans) and as plain strings otherwise.
fn parse_patch<R: Record>(fields: &[String]) -> Result<R::Patch> {
    let mut map = Map::new();
    for field in fields {
        let (key, raw) = field
            .split_once('=')
            .with_context(|| format!("Expected FIELD=VALUE, got '{field}'"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(key.trim().to_string(), value);
    }

    let requested: Vec<String> = map.keys().cloned().collect();
    let patch: R::Patch = serde_json::from_value(Value::Object(map))
        .context("Could not read the changed fields")?;

    let accepted = serde_json::to_value(&patch)?;
    if let Some(unknown) = requested.iter().find(|key| accepted.get(key.as_str()).is_none()) {
        anyhow::bail!("'{unknown}' is not an editable field of {}", R::COLLECTION);
    }

    Ok(patch)
}
