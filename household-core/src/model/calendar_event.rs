use serde::{Deserialize, Serialize};

use crate::error::{HouseholdError, HouseholdResult};
use crate::model::{Priority, Recurrence};
use crate::record::{Collection, Record, require_text};
use crate::time::parse_timestamp;

/// A family calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub date_time_start: String,
    pub date_time_end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
    pub family_id: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl CalendarEvent {
    pub fn new(
        name: impl Into<String>,
        date_time_start: impl Into<String>,
        date_time_end: impl Into<String>,
        family_id: impl Into<String>,
    ) -> Self {
        CalendarEvent {
            id: String::new(),
            name: name.into(),
            date_time_start: date_time_start.into(),
            date_time_end: date_time_end.into(),
            description: None,
            color: None,
            user_ids: Vec::new(),
            family_id: family_id.into(),
            recurrence: Recurrence::OneTime,
            priority: Priority::Normal,
        }
    }
}

impl Record for CalendarEvent {
    type Patch = CalendarEventPatch;

    const COLLECTION: Collection = Collection::Calendar;

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

    fn apply(&mut self, patch: &CalendarEventPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(start) = &patch.date_time_start {
            self.date_time_start = start.clone();
        }
        if let Some(end) = &patch.date_time_end {
            self.date_time_end = end.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(recurrence) = patch.recurrence {
            self.recurrence = recurrence;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }

    fn match_key(&self) -> Option<(&str, &str)> {
        Some((&self.date_time_start, &self.name))
    }

    fn validate(&self) -> HouseholdResult<()> {
        require_text("name", &self.name)?;
        require_text("familyId", &self.family_id)?;

        let start = parse_timestamp(&self.date_time_start).ok_or_else(|| {
            HouseholdError::Validation(format!("invalid start '{}'", self.date_time_start))
        })?;
        let end = parse_timestamp(&self.date_time_end).ok_or_else(|| {
            HouseholdError::Validation(format!("invalid end '{}'", self.date_time_end))
        })?;

        if end < start {
            return Err(HouseholdError::Validation(
                "end time is before start time".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dinner() -> CalendarEvent {
        CalendarEvent::new("Dinner", "2024-01-01T18:00", "2024-01-01T19:00", "fam-1")
    }

    #[test]
    fn patch_fields_win() {
        let mut event = dinner();
        event.apply(&CalendarEventPatch {
            name: Some("Late dinner".into()),
            priority: Some(Priority::High),
            ..Default::default()
        });

        assert_eq!(event.name, "Late dinner");
        assert_eq!(event.priority, Priority::High);
        assert_eq!(event.date_time_start, "2024-01-01T18:00");
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut event = dinner();
        event.date_time_end = "2024-01-01T17:00".into();
        assert!(matches!(event.validate(), Err(HouseholdError::Validation(_))));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut event = dinner();
        event.name = "  ".into();
        assert!(event.validate().is_err());
        assert!(dinner().validate().is_ok());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let json = r#"{
            "id": "srv-1",
            "name": "Dinner",
            "dateTimeStart": "2024-01-01T18:00:00Z",
            "dateTimeEnd": "2024-01-01T19:00:00Z",
            "familyId": "fam-1",
            "recurrence": "BIWEEKLY"
        }"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.recurrence, Recurrence::Unknown);
        assert!(event.recurrence.is_one_time());
        assert_eq!(event.priority, Priority::Normal);

        let patch = serde_json::to_value(CalendarEventPatch {
            date_time_end: Some("x".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch, serde_json::json!({ "dateTimeEnd": "x" }));
    }
}
