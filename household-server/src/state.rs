//! In-memory collection tables.
//!
//! Rows are kept as JSON per collection and checked against the typed record
//! on every write.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use household_core::{Collection, HouseholdError, HouseholdResult, Record};
use serde_json::Value;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    tables: Arc<RwLock<HashMap<Collection, Vec<Value>>>>,
    tokens: Arc<HashSet<String>>,
    pub language: Arc<str>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        AppState {
            tables: Arc::default(),
            tokens: Arc::new(config.tokens.clone()),
            language: Arc::from(config.language.as_str()),
        }
    }

    pub fn accepts(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Collection, Vec<Value>>> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Collection, Vec<Value>>> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rows of the family in insertion order.
    pub fn list<R: Record>(&self, family_id: &str) -> HouseholdResult<Vec<R>> {
        let tables = self.read();
        let Some(rows) = tables.get(&R::COLLECTION) else {
            return Ok(Vec::new());
        };

        rows.iter()
            .filter(|row| row["familyId"] == family_id)
            .map(|row| serde_json::from_value(row.clone()).map_err(HouseholdError::from))
            .collect()
    }

    /// Insert a new row. Returns false if the id is taken.
    pub fn insert<R: Record>(&self, record: &R) -> HouseholdResult<bool> {
        let value = serde_json::to_value(record)?;
        let mut tables = self.write();
        let rows = tables.entry(R::COLLECTION).or_default();

        if rows.iter().any(|row| row["id"] == record.id()) {
            return Ok(false);
        }
        rows.push(value);
        Ok(true)
    }

    /// Apply `patch` to the row. `Ok(None)` if there is no such row.
    pub fn update<R: Record>(&self, id: &str, patch: &R::Patch) -> HouseholdResult<Option<R>> {
        let mut tables = self.write();
        let Some(row) = tables
            .get_mut(&R::COLLECTION)
            .and_then(|rows| rows.iter_mut().find(|row| row["id"] == id))
        else {
            return Ok(None);
        };

        let mut record: R = serde_json::from_value(row.clone())?;
        record.apply(patch);
        record.validate()?;
        *row = serde_json::to_value(&record)?;
        Ok(Some(record))
    }

    /// Remove the row. Returns false if there was none.
    pub fn remove<R: Record>(&self, id: &str) -> bool {
        let mut tables = self.write();
        let Some(rows) = tables.get_mut(&R::COLLECTION) else {
            return false;
        };
        let before = rows.len();
        rows.retain(|row| row["id"] != id);
        rows.len() != before
    }
}
