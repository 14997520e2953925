pub mod add;
pub mod agenda;
pub mod config;
pub mod edit;
pub mod list;
pub mod rm;
pub mod spent;

use anyhow::Result;

use household_core::dispatcher::{ListStore, Submitted};
use household_core::reconcile::Displayed;
use household_core::remote::HttpRemote;
use household_core::Record;

use crate::render::{Render, print_list};

/// Print the optimistic list right away, then wait for the network call and
/// print what the server made of it.
pub async fn settle<R: Record + Render>(
    store: &ListStore<R, HttpRemote>,
    submitted: Submitted,
) -> Result<()> {
    print_list(store.displayed().as_slice());

    submitted.task.await?;
    for alert in store.alerts().alerts() {
        println!("{}", alert.render());
    }
    Ok(())
}

/// Find a displayed row by id, server id or unique id prefix.
pub fn find<'a, R: Record>(rows: &'a [Displayed<R>], id: &str) -> Result<&'a Displayed<R>> {
    if let Some(row) = rows
        .iter()
        .find(|r| r.id() == id || r.server_id.as_deref() == Some(id))
    {
        return Ok(row);
    }

    let mut matches = rows.iter().filter(|r| r.id().starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(row), None) => Ok(row),
        (Some(_), Some(_)) => anyhow::bail!("'{id}' matches more than one row"),
        (None, _) => anyhow::bail!("No row with id '{id}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use household_core::model::ShopItem;
    use household_core::reconcile::Origin;

    fn row(id: &str, server_id: Option<&str>) -> Displayed<ShopItem> {
        Displayed {
            record: ShopItem {
                id: id.into(),
                name: "Milk".into(),
                description: None,
                quantity: 1,
                category: Default::default(),
                priority: Default::default(),
                family_id: "fam-1".into(),
            },
            server_id: server_id.map(Into::into),
            origin: Origin::Server,
        }
    }

    #[test]
    fn finds_by_id_server_id_or_prefix() {
        let rows = [row("tmp-9", Some("srv-1")), row("abc123", None), row("abd456", None)];

        assert_eq!(find(&rows, "tmp-9").unwrap().id(), "tmp-9");
        assert_eq!(find(&rows, "srv-1").unwrap().id(), "tmp-9");
        assert_eq!(find(&rows, "abc").unwrap().id(), "abc123");
        assert!(find(&rows, "ab").is_err(), "ambiguous prefix");
        assert!(find(&rows, "zzz").is_err());
    }
}
