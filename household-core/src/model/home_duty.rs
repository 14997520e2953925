use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HouseholdError, HouseholdResult};
use crate::model::Recurrence;
use crate::record::{Collection, Record, require_text};
use crate::time::parse_timestamp;

/// A household chore assigned to a family member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeDuty {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub assign_to: String,
    pub due_to: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    pub family_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeDutyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl Record for HomeDuty {
    type Patch = HomeDutyPatch;

    const COLLECTION: Collection = Collection::HomeChores;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn family_id(&self) -> &str {
        &self.family_id
    }

    fn apply(&mut self, patch: &HomeDutyPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(assign_to) = &patch.assign_to {
            self.assign_to = assign_to.clone();
        }
        if let Some(due_to) = &patch.due_to {
            self.due_to = due_to.clone();
        }
        if let Some(recurrence) = patch.recurrence {
            self.recurrence = recurrence;
        }
    }

    fn validate(&self) -> HouseholdResult<()> {
        require_text("name", &self.name)?;
        require_text("familyId", &self.family_id)?;
        require_text("assignTo", &self.assign_to)?;

        if parse_timestamp(&self.due_to).is_none() {
            return Err(HouseholdError::Validation(format!(
                "invalid due date '{}'",
                self.due_to
            )));
        }

        Ok(())
    }
}

/// Resolve a relative due-date choice ("today", "tomorrow", "week", "month")
/// against `now`. Unknown choices fall back to `now`.
pub fn due_from_preset(preset: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match preset {
        "tomorrow" => now + Duration::days(1),
        "week" => now + Duration::days(7),
        "month" => now.checked_add_months(Months::new(1)).unwrap_or(now),
        _ => now,
    }
}
