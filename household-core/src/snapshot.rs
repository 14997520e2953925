//! Last-fetched server state per (collection, family).

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::record::{Collection, Record};

/// How long a fetched snapshot is served without refetching.
pub const DEFAULT_MAX_AGE_SECS: i64 = 5 * 60;

pub type SnapshotKey = (Collection, String);

/// A fetched server snapshot.
#[derive(Debug)]
pub struct Snapshot<R> {
    pub rows: Arc<Vec<R>>,
    /// Cache-wide counter value at the time this snapshot was stored.
    pub revision: u64,
    pub fetched_at: DateTime<Utc>,
}

impl<R> Clone for Snapshot<R> {
    fn clone(&self) -> Self {
        Snapshot {
            rows: Arc::clone(&self.rows),
            revision: self.revision,
            fetched_at: self.fetched_at,
        }
    }
}

#[derive(Debug)]
struct Entry<R> {
    snapshot: Snapshot<R>,
    stale: bool,
}

#[derive(Debug)]
struct Inner<R> {
    entries: HashMap<SnapshotKey, Entry<R>>,
    revision: u64,
}

/// Shared, revalidated cache of server snapshots.
///
/// Invalidation is coarse: a successful mutation marks the whole
/// (collection, family) entry stale and the next read refetches it.
#[derive(Debug)]
pub struct SnapshotCache<R> {
    inner: Arc<RwLock<Inner<R>>>,
    max_age: Duration,
}

impl<R> Clone for SnapshotCache<R> {
    fn clone(&self) -> Self {
        SnapshotCache {
            inner: Arc::clone(&self.inner),
            max_age: self.max_age,
        }
    }
}

impl<R: Record> Default for SnapshotCache<R> {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_MAX_AGE_SECS))
    }
}

impl<R: Record> SnapshotCache<R> {
    pub fn new(max_age: Duration) -> Self {
        SnapshotCache {
            inner: Arc::new(RwLock::new(Inner {
                entries: HashMap::new(),
                revision: 0,
            })),
            max_age,
        }
    }

    fn key(family_id: &str) -> SnapshotKey {
        (R::COLLECTION, family_id.to_string())
    }

    pub fn get(&self, family_id: &str) -> Option<Snapshot<R>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .entries
            .get(&Self::key(family_id))
            .map(|entry| entry.snapshot.clone())
    }

    /// Whether the entry is missing, invalidated or older than the max age.
    pub fn needs_refresh(&self, family_id: &str, now: DateTime<Utc>) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match inner.entries.get(&Self::key(family_id)) {
            Some(entry) => entry.stale || now - entry.snapshot.fetched_at > self.max_age,
            None => true,
        }
    }

    pub fn store(&self, family_id: &str, rows: Vec<R>, fetched_at: DateTime<Utc>) -> Snapshot<R> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.revision += 1;

        let snapshot = Snapshot {
            rows: Arc::new(rows),
            revision: inner.revision,
            fetched_at,
        };
        inner.entries.insert(
            Self::key(family_id),
            Entry {
                snapshot: snapshot.clone(),
                stale: false,
            },
        );
        snapshot
    }

    /// Mark the entry stale. The rows stay readable until the refetch lands.
    pub fn invalidate(&self, family_id: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = inner.entries.get_mut(&Self::key(family_id)) {
            entry.stale = true;
        }
    }
}
