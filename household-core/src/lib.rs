//! Core types for the household app.
//!
//! This crate is shared by household-server and household-cli:
//! - `model` with the four family collections and their patches
//! - `ledger`, `reconcile` and `dispatcher` for optimistic list editing
//! - `recurrence`, `holidays` and `calendar` for the expanded calendar view
//! - `remote` for the HTTP endpoints and `notify` for family notifications

pub mod alert;
pub mod calendar;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod expenses;
pub mod holidays;
pub mod ledger;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod record;
pub mod recurrence;
pub mod remote;
pub mod snapshot;
pub mod time;

pub use error::{HouseholdError, HouseholdResult};
pub use record::{Collection, Record};
