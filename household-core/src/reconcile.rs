//! Merge a server snapshot with the optimistic ledger into the displayed list.

use std::collections::HashSet;

use crate::ledger::Ledger;
use crate::record::Record;

/// Where a displayed row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Present in the server snapshot (possibly adopted by an optimistic id).
    Server,
    /// Only known locally; its create has not shown up in a snapshot yet.
    Optimistic,
}

/// A row as it should be shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Displayed<R> {
    /// The record with pending updates applied. Its id is the displayed id.
    pub record: R,
    /// The server's id for this row, if it came from the snapshot.
    pub server_id: Option<String>,
    pub origin: Origin,
}

impl<R: Record> Displayed<R> {
    pub fn id(&self) -> &str {
        self.record.id()
    }

    /// Id to send to the server for updates and deletes.
    pub fn mutation_id(&self) -> &str {
        self.server_id.as_deref().unwrap_or(self.record.id())
    }

    pub fn is_optimistic(&self) -> bool {
        self.origin == Origin::Optimistic
    }
}

/// Produce the rows to display.
///
/// Server rows come first in snapshot order, then optimistic creates that no
/// server row has claimed, in the order they were staged. A server row claims
/// a pending create with the same id or, failing that, with an equal
/// [`Record::match_key`]; the row is then shown under the optimistic id so the
/// UI keeps rendering the identity it already had. Each create is claimed at
/// most once, and every displayed id is unique.
pub fn reconcile<R: Record>(snapshot: &[R], ledger: &Ledger<R>) -> Vec<Displayed<R>> {
    let creates = ledger.pending_creates();
    let mut claimed = vec![false; creates.len()];
    let mut seen: HashSet<String> = HashSet::new();
    let mut displayed = Vec::with_capacity(snapshot.len() + creates.len());

    for row in snapshot {
        let server_id = row.id();
        if ledger.is_tombstoned(server_id) {
            continue;
        }

        let by_id = creates
            .iter()
            .enumerate()
            .position(|(i, c)| !claimed[i] && c.record.id() == server_id);
        let by_key = || {
            let key = row.match_key()?;
            creates
                .iter()
                .enumerate()
                .position(|(i, c)| !claimed[i] && c.record.match_key() == Some(key))
        };

        let resolved_id = match by_id.or_else(by_key) {
            Some(i) => {
                claimed[i] = true;
                creates[i].record.id()
            }
            None => server_id,
        };

        if !seen.insert(resolved_id.to_string()) {
            tracing::warn!(id = %resolved_id, "duplicate id in snapshot, keeping the first row");
            continue;
        }

        // An adopted row can carry patches under both ids; the newest wins.
        let mut record = row.clone();
        for patch in ledger.patches_for(&[resolved_id, server_id]) {
            record.apply(patch);
        }
        record.set_id(resolved_id.to_string());

        displayed.push(Displayed {
            record,
            server_id: Some(server_id.to_string()),
            origin: Origin::Server,
        });
    }

    for (create, claimed) in creates.iter().zip(claimed) {
        if claimed || seen.contains(create.record.id()) {
            continue;
        }

        let mut record = create.record.clone();
        if let Some(patch) = create.patch {
            record.apply(patch);
        }

        displayed.push(Displayed {
            record,
            server_id: None,
            origin: Origin::Optimistic,
        });
    }

    displayed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CalendarEvent, CalendarEventPatch, ShopItem, ShopItemPatch};

    fn dinner(id: &str) -> CalendarEvent {
        let mut event = CalendarEvent::new(
            "Dinner",
            "2024-01-01T18:00:00Z",
            "2024-01-01T19:00:00Z",
            "fam-1",
        );
        event.id = id.into();
        event
    }

    fn milk(id: &str) -> ShopItem {
        ShopItem {
            id: id.into(),
            name: "Milk".into(),
            description: None,
            quantity: 1,
            category: Default::default(),
            priority: Default::default(),
            family_id: "fam-1".into(),
        }
    }

    fn ids<R: Record>(rows: &[Displayed<R>]) -> Vec<&str> {
        rows.iter().map(|d| d.id()).collect()
    }

    #[test]
    fn optimistic_create_shows_before_any_response() {
        let mut ledger = Ledger::new();
        ledger.stage_create(dinner("tmp-1")).unwrap();

        let rows = reconcile(&[], &ledger);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.name, "Dinner");
        assert_eq!(rows[0].origin, Origin::Optimistic);
        assert_eq!(rows[0].mutation_id(), "tmp-1");
    }

    #[test]
    fn server_row_adopts_optimistic_identity_by_value() {
        let mut ledger = Ledger::new();
        ledger.stage_create(dinner("tmp-9")).unwrap();

        let rows = reconcile(&[dinner("srv-1")], &ledger);

        assert_eq!(ids(&rows), ["tmp-9"]);
        assert_eq!(rows[0].server_id.as_deref(), Some("srv-1"));
        assert_eq!(rows[0].mutation_id(), "srv-1");
        assert_eq!(rows[0].origin, Origin::Server);
    }

    #[test]
    fn server_row_with_same_id_replaces_optimistic_row() {
        let mut ledger = Ledger::new();
        ledger.stage_create(milk("tmp-1")).unwrap();

        let rows = reconcile(&[milk("tmp-1")], &ledger);

        assert_eq!(ids(&rows), ["tmp-1"]);
        assert_eq!(rows[0].origin, Origin::Server);
    }

    #[test]
    fn collections_without_match_key_do_not_pair_by_value() {
        let mut ledger = Ledger::new();
        ledger.stage_create(milk("tmp-1")).unwrap();

        let rows = reconcile(&[milk("srv-1")], &ledger);

        assert_eq!(ids(&rows), ["srv-1", "tmp-1"]);
    }

    #[test]
    fn each_create_is_claimed_at_most_once() {
        let mut ledger = Ledger::new();
        ledger.stage_create(dinner("tmp-9")).unwrap();

        let rows = reconcile(&[dinner("srv-1"), dinner("srv-2")], &ledger);

        assert_eq!(ids(&rows), ["tmp-9", "srv-2"]);
    }

    #[test]
    fn tombstoned_rows_are_hidden() {
        let mut ledger = Ledger::<CalendarEvent>::new();
        ledger.stage_delete("srv-1");

        let rows = reconcile(&[dinner("srv-1")], &ledger);

        assert!(rows.is_empty());
    }

    #[test]
    fn delete_wins_over_pending_update() {
        let mut ledger = Ledger::<CalendarEvent>::new();
        ledger
            .stage_update(
                "srv-1",
                CalendarEventPatch {
                    name: Some("Brunch".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        ledger.stage_delete("srv-1");

        assert!(reconcile(&[dinner("srv-1")], &ledger).is_empty());
    }

    #[test]
    fn pending_update_overlays_server_fields() {
        let mut ledger = Ledger::<ShopItem>::new();
        ledger
            .stage_update(
                "srv-1",
                ShopItemPatch {
                    quantity: Some(4),
                    ..Default::default()
                },
            )
            .unwrap();

        let rows = reconcile(&[milk("srv-1"), milk("srv-2")], &ledger);

        assert_eq!(rows[0].record.quantity, 4);
        assert_eq!(rows[0].record.name, "Milk");
        assert_eq!(rows[1].record.quantity, 1);
    }

    #[test]
    fn update_keyed_by_optimistic_id_follows_adoption() {
        let mut ledger = Ledger::new();
        ledger.stage_create(dinner("tmp-9")).unwrap();
        ledger
            .stage_update(
                "tmp-9",
                CalendarEventPatch {
                    color: Some("red".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let before = reconcile(&[], &ledger);
        let after = reconcile(&[dinner("srv-1")], &ledger);

        assert_eq!(before[0].record.color.as_deref(), Some("red"));
        assert_eq!(after[0].record.color.as_deref(), Some("red"));
        assert_eq!(after[0].id(), "tmp-9");
    }

    #[test]
    fn later_edit_under_the_server_id_wins_over_earlier_optimistic_edit() {
        let color = |c: &str| CalendarEventPatch {
            color: Some(c.into()),
            ..Default::default()
        };
        let mut ledger = Ledger::new();
        ledger.stage_create(dinner("tmp-9")).unwrap();
        ledger.stage_update("tmp-9", color("red")).unwrap();
        let snapshot = [dinner("srv-1")];

        let adopted = reconcile(&snapshot, &ledger);
        assert_eq!(adopted[0].id(), "tmp-9");
        ledger.stage_update(adopted[0].mutation_id(), color("blue")).unwrap();

        let rows = reconcile(&snapshot, &ledger);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.color.as_deref(), Some("blue"));

        ledger.stage_update("tmp-9", color("green")).unwrap();
        let rows = reconcile(&snapshot, &ledger);
        assert_eq!(rows[0].record.color.as_deref(), Some("green"));
    }

    #[test]
    fn duplicate_snapshot_ids_are_collapsed() {
        let ledger = Ledger::new();
        let rows = reconcile(&[milk("srv-1"), milk("srv-1")], &ledger);
        assert_eq!(ids(&rows), ["srv-1"]);
    }

    #[test]
    fn reconciliation_is_pure() {
        let mut ledger = Ledger::new();
        ledger.stage_create(dinner("tmp-9")).unwrap();
        ledger.stage_create(dinner("tmp-10")).unwrap();
        ledger.stage_delete("srv-3");
        let snapshot = [dinner("srv-1"), dinner("srv-2"), dinner("srv-3")];
        let revision = ledger.revision();

        let first = reconcile(&snapshot, &ledger);
        let second = reconcile(&snapshot, &ledger);

        assert_eq!(first, second);
        assert_eq!(ledger.revision(), revision);

        let unique: HashSet<_> = first.iter().map(|d| d.id()).collect();
        assert_eq!(unique.len(), first.len());
    }
}
