use anyhow::Result;

use household_core::model::{CalendarEvent, Expense, HomeDuty, ShopItem};
use household_core::{Collection, Record};

use crate::context::Context;
use crate::render::{Render, print_list};

pub async fn run(ctx: &Context, collection: Collection) -> Result<()> {
    match collection {
        Collection::Calendar => list::<CalendarEvent>(ctx).await,
        Collection::Expenses => list::<Expense>(ctx).await,
        Collection::ShopList => list::<ShopItem>(ctx).await,
        Collection::HomeChores => list::<HomeDuty>(ctx).await,
    }
}

async fn list<R: Record + Render>(ctx: &Context) -> Result<()> {
    let store = ctx.store::<R>().await?;
    print_list(store.displayed().as_slice());
    Ok(())
}
