//! Client-side optimistic overlay for one collection.
//!
//! Each entity id is in exactly one state. Ids the ledger has never seen are
//! `ServerOnly`; the rest carry an overlay:
//!
//! | from \ event | create  | update                 | delete     | create settled            |
//! |--------------|---------|------------------------|------------|---------------------------|
//! | ServerOnly   | Created | Updated                | Tombstoned | -                         |
//! | Created      | error   | Created (patch replaced) | Tombstoned | ok: Updated/ServerOnly, err: ServerOnly |
//! | Updated      | error   | Updated (replaced)     | Tombstoned | -                         |
//! | Tombstoned   | error   | ignored                | Tombstoned | Tombstoned                |

use std::collections::HashMap;

use crate::error::{HouseholdError, HouseholdResult};
use crate::record::Record;

/// Observable state of one entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    ServerOnly,
    OptimisticCreate,
    OptimisticUpdate,
    Tombstoned,
}

/// A pending update, stamped with the order it was staged in.
#[derive(Debug, Clone)]
struct Staged<P> {
    patch: P,
    seq: u64,
}

#[derive(Debug, Clone)]
enum Overlay<R: Record> {
    Created {
        record: R,
        patch: Option<Staged<R::Patch>>,
        seq: u64,
    },
    Updated(Staged<R::Patch>),
    Tombstoned,
}

impl<R: Record> Overlay<R> {
    fn state(&self) -> EntryState {
        match self {
            Overlay::Created { .. } => EntryState::OptimisticCreate,
            Overlay::Updated(_) => EntryState::OptimisticUpdate,
            Overlay::Tombstoned => EntryState::Tombstoned,
        }
    }
}

/// A pending create as seen by the reconciler.
#[derive(Debug, Clone)]
pub struct PendingCreate<'a, R: Record> {
    pub record: &'a R,
    pub patch: Option<&'a R::Patch>,
}

#[derive(Debug, Clone)]
pub struct Ledger<R: Record> {
    entries: HashMap<String, Overlay<R>>,
    next_seq: u64,
    revision: u64,
}

impl<R: Record> Default for Ledger<R> {
    fn default() -> Self {
        Ledger {
            entries: HashMap::new(),
            next_seq: 0,
            revision: 0,
        }
    }
}

impl<R: Record> Ledger<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every change; used to memoize reconciliation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, id: &str) -> EntryState {
        self.entries
            .get(id)
            .map_or(EntryState::ServerOnly, Overlay::state)
    }

    pub fn is_tombstoned(&self, id: &str) -> bool {
        matches!(self.entries.get(id), Some(Overlay::Tombstoned))
    }

    /// The pending update for `id`, whether it overlays a server row or an
    /// optimistic create.
    pub fn patch_for(&self, id: &str) -> Option<&R::Patch> {
        self.staged(id).map(|staged| &staged.patch)
    }

    /// Pending updates for any of `ids`, oldest first, so applying them in
    /// order lets the latest write win field by field.
    pub fn patches_for(&self, ids: &[&str]) -> Vec<&R::Patch> {
        let mut staged: Vec<&Staged<R::Patch>> = Vec::new();
        for id in ids {
            if let Some(s) = self.staged(id) {
                if !staged.iter().any(|seen| seen.seq == s.seq) {
                    staged.push(s);
                }
            }
        }
        staged.sort_by_key(|s| s.seq);
        staged.into_iter().map(|s| &s.patch).collect()
    }

    fn staged(&self, id: &str) -> Option<&Staged<R::Patch>> {
        match self.entries.get(id)? {
            Overlay::Updated(staged) => Some(staged),
            Overlay::Created { patch, .. } => patch.as_ref(),
            Overlay::Tombstoned => None,
        }
    }

    /// Pending creates in the order they were staged.
    pub fn pending_creates(&self) -> Vec<PendingCreate<'_, R>> {
        let mut creates: Vec<_> = self
            .entries
            .values()
            .filter_map(|overlay| match overlay {
                Overlay::Created { record, patch, seq } => Some((
                    *seq,
                    PendingCreate {
                        record,
                        patch: patch.as_ref().map(|s| &s.patch),
                    },
                )),
                _ => None,
            })
            .collect();
        creates.sort_by_key(|(seq, _)| *seq);
        creates.into_iter().map(|(_, create)| create).collect()
    }

    /// ServerOnly -> Created. The record's id is the temporary id.
    pub fn stage_create(&mut self, record: R) -> HouseholdResult<EntryState> {
        let id = record.id().to_string();
        if let Some(existing) = self.entries.get(&id) {
            return Err(invalid(&id, format!("create over {:?}", existing.state())));
        }

        let seq = self.next_seq();
        self.entries.insert(
            id,
            Overlay::Created {
                record,
                patch: None,
                seq,
            },
        );
        self.bump();
        Ok(EntryState::OptimisticCreate)
    }

    /// Replace the pending update for `id`. Last write wins; updates to a
    /// tombstoned id are ignored.
    pub fn stage_update(&mut self, id: &str, patch: R::Patch) -> HouseholdResult<EntryState> {
        if self.is_tombstoned(id) {
            return Ok(EntryState::Tombstoned);
        }

        let staged = Staged {
            patch,
            seq: self.next_seq(),
        };
        match self.entries.get_mut(id) {
            Some(Overlay::Created { patch: slot, .. }) => *slot = Some(staged),
            Some(Overlay::Updated(slot)) => *slot = staged,
            _ => {
                self.entries.insert(id.to_string(), Overlay::Updated(staged));
            }
        }
        self.bump();
        Ok(self.state(id))
    }

    /// Any state -> Tombstoned. Permanent for the ledger's lifetime.
    pub fn stage_delete(&mut self, id: &str) -> EntryState {
        if !self.is_tombstoned(id) {
            self.entries.insert(id.to_string(), Overlay::Tombstoned);
            self.bump();
        }
        EntryState::Tombstoned
    }

    /// The network create for `id` finished. On success a patch staged while
    /// the create was in flight survives as a plain pending update.
    pub fn settle_create(&mut self, id: &str, succeeded: bool) -> EntryState {
        let Some(Overlay::Created { patch, .. }) = self.entries.get(id) else {
            return self.state(id);
        };

        match (succeeded, patch.clone()) {
            (true, Some(patch)) => {
                self.entries.insert(id.to_string(), Overlay::Updated(patch));
            }
            _ => {
                self.entries.remove(id);
            }
        }
        self.bump();
        self.state(id)
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

fn invalid(id: &str, reason: String) -> HouseholdError {
    HouseholdError::InvalidTransition {
        id: id.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ShopItem, ShopItemPatch};

    fn item(id: &str) -> ShopItem {
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

    fn qty(n: u32) -> ShopItemPatch {
        ShopItemPatch {
            quantity: Some(n),
            ..Default::default()
        }
    }

    #[test]
    fn unknown_ids_are_server_only() {
        let ledger = Ledger::<ShopItem>::new();
        assert_eq!(ledger.state("srv-1"), EntryState::ServerOnly);
        assert!(ledger.is_empty());
    }

    #[test]
    fn create_then_successful_settle_without_patch_forgets_the_id() {
        let mut ledger = Ledger::new();
        ledger.stage_create(item("tmp-1")).unwrap();
        assert_eq!(ledger.state("tmp-1"), EntryState::OptimisticCreate);

        assert_eq!(ledger.settle_create("tmp-1", true), EntryState::ServerOnly);
        assert!(ledger.is_empty());
    }

    #[test]
    fn patch_staged_during_create_survives_success() {
        let mut ledger = Ledger::new();
        ledger.stage_create(item("tmp-1")).unwrap();
        ledger.stage_update("tmp-1", qty(3)).unwrap();

        assert_eq!(
            ledger.settle_create("tmp-1", true),
            EntryState::OptimisticUpdate
        );
        assert_eq!(ledger.patch_for("tmp-1"), Some(&qty(3)));
    }

    #[test]
    fn failed_create_drops_everything() {
        let mut ledger = Ledger::new();
        ledger.stage_create(item("tmp-1")).unwrap();
        ledger.stage_update("tmp-1", qty(3)).unwrap();

        assert_eq!(ledger.settle_create("tmp-1", false), EntryState::ServerOnly);
        assert!(ledger.pending_creates().is_empty());
    }

    #[test]
    fn duplicate_create_is_rejected_and_leaves_state_alone() {
        let mut ledger = Ledger::new();
        ledger.stage_create(item("tmp-1")).unwrap();
        let revision = ledger.revision();

        assert!(matches!(
            ledger.stage_create(item("tmp-1")),
            Err(HouseholdError::InvalidTransition { .. })
        ));
        assert_eq!(ledger.revision(), revision);

        ledger.stage_delete("srv-9");
        assert!(ledger.stage_create(item("srv-9")).is_err());
    }

    #[test]
    fn updates_are_last_write_wins() {
        let mut ledger = Ledger::<ShopItem>::new();
        ledger.stage_update("srv-1", qty(2)).unwrap();
        ledger.stage_update("srv-1", qty(5)).unwrap();
        assert_eq!(ledger.patch_for("srv-1"), Some(&qty(5)));
    }

    #[test]
    fn patches_for_several_ids_come_oldest_first() {
        let mut ledger = Ledger::new();
        ledger.stage_create(item("tmp-1")).unwrap();
        ledger.stage_update("tmp-1", qty(2)).unwrap();
        ledger.stage_update("srv-1", qty(7)).unwrap();

        assert_eq!(ledger.patches_for(&["srv-1", "tmp-1"]), [&qty(2), &qty(7)]);

        ledger.stage_update("tmp-1", qty(9)).unwrap();
        assert_eq!(ledger.patches_for(&["srv-1", "tmp-1"]), [&qty(7), &qty(9)]);
        assert_eq!(ledger.patches_for(&["tmp-1", "tmp-1"]), [&qty(9)]);
    }

    #[test]
    fn delete_wins_over_update() {
        let mut ledger = Ledger::<ShopItem>::new();
        ledger.stage_update("srv-1", qty(2)).unwrap();
        ledger.stage_delete("srv-1");

        assert_eq!(
            ledger.stage_update("srv-1", qty(9)).unwrap(),
            EntryState::Tombstoned
        );
        assert!(ledger.is_tombstoned("srv-1"));
        assert_eq!(ledger.patch_for("srv-1"), None);
    }

    #[test]
    fn tombstone_survives_create_settlement() {
        let mut ledger = Ledger::new();
        ledger.stage_create(item("tmp-1")).unwrap();
        ledger.stage_delete("tmp-1");

        assert_eq!(ledger.settle_create("tmp-1", true), EntryState::Tombstoned);
    }

    #[test]
    fn pending_creates_keep_staging_order() {
        let mut ledger = Ledger::new();
        for id in ["c", "a", "b"] {
            ledger.stage_create(item(id)).unwrap();
        }

        let ids: Vec<_> = ledger
            .pending_creates()
            .iter()
            .map(|c| c.record.id.clone())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn every_change_bumps_the_revision() {
        let mut ledger = Ledger::new();
        let r0 = ledger.revision();
        ledger.stage_create(item("tmp-1")).unwrap();
        let r1 = ledger.revision();
        ledger.stage_delete("tmp-1");
        let r2 = ledger.revision();
        ledger.stage_delete("tmp-1");

        assert!(r0 < r1 && r1 < r2);
        assert_eq!(ledger.revision(), r2);
    }
}
