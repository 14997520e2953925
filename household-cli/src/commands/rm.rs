use anyhow::Result;

use household_core::model::{CalendarEvent, Expense, HomeDuty, ShopItem};
use household_core::{Collection, Record};

use crate::commands::{find, settle};
use crate::context::Context;
use crate::render::Render;

pub async fn run(ctx: &Context, collection: Collection, id: &str) -> Result<()> {
    match collection {
        Collection::Calendar => remove::<CalendarEvent>(ctx, id).await,
        Collection::Expenses => remove::<Expense>(ctx, id).await,
        Collection::ShopList => remove::<ShopItem>(ctx, id).await,
        Collection::HomeChores => remove::<HomeDuty>(ctx, id).await,
    }
}

async fn remove<R: Record + Render>(ctx: &Context, id: &str) -> Result<()> {
    let store = ctx.store::<R>().await?;
    let rows = store.displayed();
    let target = find(rows.as_slice(), id)?;

    let submitted = store.delete(target);
    settle(&store, submitted).await
}
