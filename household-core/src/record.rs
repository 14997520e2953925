//! The [`Record`] trait shared by every family collection.

use std::fmt::{self, Debug};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::HouseholdResult;

/// One of the family collections served under `/api/<path>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Calendar,
    Expenses,
    ShopList,
    HomeChores,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Calendar,
        Collection::Expenses,
        Collection::ShopList,
        Collection::HomeChores,
    ];

    /// Path segment of the collection endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Calendar => "calendar",
            Collection::Expenses => "expenses",
            Collection::ShopList => "shop-list",
            Collection::HomeChores => "home-chores",
        }
    }

    /// Notification category name understood by the notification templates.
    pub fn category(&self) -> &'static str {
        match self {
            Collection::Calendar => "calendar",
            Collection::Expenses => "expenses",
            Collection::ShopList => "shopList",
            Collection::HomeChores => "homeDuty",
        }
    }

    /// Page a notification should open.
    pub fn page_url(&self) -> &'static str {
        match self {
            Collection::Calendar => "/calendar",
            Collection::Expenses => "/expenses",
            Collection::ShopList => "/shoplist",
            Collection::HomeChores => "/homeduties",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.path() == path)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// A row of a family collection.
///
/// `Patch` is the partial form used both as the pending-update overlay and as
/// the body of a PUT request. Applying a patch is a shallow merge where the
/// patch's fields win.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Patch: Clone + Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static;

    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn name(&self) -> &str;
    fn family_id(&self) -> &str;

    fn apply(&mut self, patch: &Self::Patch);

    /// Value key used to pair an optimistic create with a server row whose id
    /// differs. Only collections that need the pairing return `Some`.
    fn match_key(&self) -> Option<(&str, &str)> {
        None
    }

    /// Checks a draft before it is submitted.
    fn validate(&self) -> HouseholdResult<()>;
}

/// Shorthand for a required, non-blank text field check.
pub(crate) fn require_text(field: &str, value: &str) -> HouseholdResult<()> {
    if value.trim().is_empty() {
        return Err(crate::error::HouseholdError::Validation(format!(
            "{field} is required"
        )));
    }
    Ok(())
}
