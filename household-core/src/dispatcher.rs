//! Optimistic mutations for one family collection.
//!
//! A [`ListStore`] owns the ledger of a collection, reads server snapshots
//! through the shared [`SnapshotCache`] and runs writes against a [`Remote`].
//! Every mutation updates the ledger synchronously, returns, and performs the
//! network call on a spawned task. Calls are made at most once; failures end
//! in an alert, never a retry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::alert::AlertCenter;
use crate::error::HouseholdResult;
use crate::ledger::{EntryState, Ledger};
use crate::notify::FamilyNotification;
use crate::reconcile::{Displayed, reconcile};
use crate::record::Record;
use crate::remote::{Notifier, Remote};
use crate::snapshot::SnapshotCache;

/// The signed-in family member a store acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub family_id: String,
    pub user_id: String,
    pub user_name: String,
}

/// A mutation that has been applied locally and dispatched.
#[derive(Debug)]
pub struct Submitted {
    /// The displayed id the mutation applies to.
    pub id: String,
    /// Resolves once the network call and its follow-up, including any
    /// family notification, have settled.
    pub task: JoinHandle<()>,
}

struct Memo<R> {
    ledger_revision: u64,
    snapshot_revision: u64,
    rows: Arc<Vec<Displayed<R>>>,
}

struct Shared<R: Record, C> {
    remote: C,
    member: Member,
    cache: SnapshotCache<R>,
    alerts: AlertCenter,
    ledger: Mutex<Ledger<R>>,
    memo: Mutex<Option<Memo<R>>>,
}

/// Optimistic view and mutation dispatcher for the collection of `R`.
pub struct ListStore<R: Record, C> {
    shared: Arc<Shared<R, C>>,
}

impl<R: Record, C> Clone for ListStore<R, C> {
    fn clone(&self) -> Self {
        ListStore {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R, C> ListStore<R, C>
where
    R: Record,
    C: Remote + Notifier,
{
    pub fn new(remote: C, member: Member, cache: SnapshotCache<R>, alerts: AlertCenter) -> Self {
        ListStore {
            shared: Arc::new(Shared {
                remote,
                member,
                cache,
                alerts,
                ledger: Mutex::new(Ledger::new()),
                memo: Mutex::new(None),
            }),
        }
    }

    pub fn member(&self) -> &Member {
        &self.shared.member
    }

    pub fn remote(&self) -> &C {
        &self.shared.remote
    }

    pub fn alerts(&self) -> &AlertCenter {
        &self.shared.alerts
    }

    pub fn state(&self, id: &str) -> EntryState {
        self.ledger().state(id)
    }

    fn family_id(&self) -> &str {
        &self.shared.member.family_id
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger<R>> {
        self.shared
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the snapshot if the cached one is missing, stale or too old.
    pub async fn refresh(&self) -> HouseholdResult<()> {
        if self.shared.cache.needs_refresh(self.family_id(), Utc::now()) {
            self.fetch().await?;
        }
        Ok(())
    }

    /// Unconditionally refetch the snapshot.
    pub async fn fetch(&self) -> HouseholdResult<()> {
        let rows = self
            .shared
            .remote
            .fetch::<R>(self.family_id())
            .await
            .inspect_err(|e| {
                tracing::warn!(collection = %R::COLLECTION, error = %e, "snapshot fetch failed")
            })?;

        tracing::debug!(collection = %R::COLLECTION, rows = rows.len(), "snapshot fetched");
        self.shared.cache.store(self.family_id(), rows, Utc::now());
        Ok(())
    }

    /// The reconciled list. Recomputed only when the ledger or the snapshot
    /// changed since the last call.
    pub fn displayed(&self) -> Arc<Vec<Displayed<R>>> {
        let snapshot = self.shared.cache.get(self.family_id());
        let snapshot_revision = snapshot.as_ref().map_or(0, |s| s.revision);
        let rows: &[R] = match &snapshot {
            Some(s) => s.rows.as_slice(),
            None => &[],
        };

        let ledger = self.ledger();
        let mut memo = self
            .shared
            .memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = memo.as_ref().filter(|m| {
            m.ledger_revision == ledger.revision() && m.snapshot_revision == snapshot_revision
        }) {
            return Arc::clone(&cached.rows);
        }

        let displayed = Arc::new(reconcile(rows, &ledger));
        *memo = Some(Memo {
            ledger_revision: ledger.revision(),
            snapshot_revision,
            rows: Arc::clone(&displayed),
        });
        displayed
    }

    /// Show `draft` immediately under a fresh temporary id and POST it.
    ///
    /// The temporary id is sent as the entity id, so the server normally
    /// confirms the row under the same id.
    pub fn create(&self, mut draft: R) -> HouseholdResult<Submitted> {
        draft.validate()?;

        let id = Uuid::new_v4().to_string();
        draft.set_id(id.clone());
        self.ledger().stage_create(draft.clone())?;

        let store = self.clone();
        let temp_id = id.clone();
        let task = tokio::spawn(async move {
            tokio::task::yield_now().await;
            store.finish_create(&temp_id, draft).await;
        });

        Ok(Submitted { id, task })
    }

    async fn finish_create(&self, temp_id: &str, draft: R) {
        match self.shared.remote.create(&draft).await {
            Ok(saved) => {
                tracing::debug!(collection = %R::COLLECTION, temp_id, server_id = %saved.id(), "create confirmed");
                self.revalidate().await;
                let state = self.ledger().settle_create(temp_id, true);
                if state == EntryState::Tombstoned {
                    tracing::debug!(collection = %R::COLLECTION, temp_id, "created row was deleted meanwhile");
                    return;
                }
                self.shared.alerts.show(format!("Added {}", draft.name()));
                self.notify_created(draft.name()).await;
            }
            Err(e) => {
                tracing::warn!(collection = %R::COLLECTION, temp_id, error = %e, "create failed");
                self.ledger().settle_create(temp_id, false);
                self.shared
                    .alerts
                    .show(format!("Could not add {}: {e}", draft.name()));
            }
        }
    }

    /// Overlay `patch` on `target` immediately and PUT it.
    ///
    /// The overlay is keyed by the server id when the row has one. It is
    /// kept after the call settles; a later snapshot carries the same values.
    pub fn update(&self, target: &Displayed<R>, patch: R::Patch) -> HouseholdResult<Submitted> {
        let mut preview = target.record.clone();
        preview.apply(&patch);
        preview.validate()?;

        let key = target.mutation_id().to_string();
        self.ledger().stage_update(&key, patch.clone())?;

        let store = self.clone();
        let name = preview.name().to_string();
        let id = key.clone();
        let task = tokio::spawn(async move {
            tokio::task::yield_now().await;
            match store.shared.remote.update::<R>(&id, &patch).await {
                Ok(_) => {
                    store.revalidate().await;
                    store.shared.alerts.show(format!("Updated {name}"));
                }
                Err(e) => {
                    tracing::warn!(collection = %R::COLLECTION, id, error = %e, "update failed");
                    store
                        .shared
                        .alerts
                        .show(format!("Could not update {name}: {e}"));
                }
            }
        });

        Ok(Submitted {
            id: target.id().to_string(),
            task,
        })
    }

    /// Hide `target` immediately and DELETE it. The tombstone is permanent
    /// for the life of the store, even if the call fails.
    pub fn delete(&self, target: &Displayed<R>) -> Submitted {
        {
            let mut ledger = self.ledger();
            ledger.stage_delete(target.id());
            if let Some(server_id) = target.server_id.as_deref() {
                ledger.stage_delete(server_id);
            }
        }

        let store = self.clone();
        let id = target.mutation_id().to_string();
        let name = target.record.name().to_string();
        let task = tokio::spawn(async move {
            tokio::task::yield_now().await;
            match store.shared.remote.delete::<R>(&id).await {
                Ok(()) => {
                    store.revalidate().await;
                    store.shared.alerts.show(format!("Deleted {name}"));
                }
                Err(e) => {
                    tracing::warn!(collection = %R::COLLECTION, id, error = %e, "delete failed");
                    store
                        .shared
                        .alerts
                        .show(format!("Could not delete {name}: {e}"));
                }
            }
        });

        Submitted {
            id: target.id().to_string(),
            task,
        }
    }

    /// Invalidate the snapshot and refetch it.
    async fn revalidate(&self) {
        self.shared.cache.invalidate(self.family_id());
        // A failed refetch leaves the entry stale for the next refresh.
        let _ = self.fetch().await;
    }

    /// Failures are logged and otherwise ignored.
    async fn notify_created(&self, item_name: &str) {
        let member = &self.shared.member;
        let notification = FamilyNotification::created(
            R::COLLECTION,
            &member.family_id,
            &member.user_id,
            &member.user_name,
            item_name,
        );

        if let Err(e) = self.shared.remote.notify(&notification).await {
            tracing::warn!(error = %e, "family notification failed");
        }
    }
}
