use serde::{Deserialize, Serialize};

use crate::error::{HouseholdError, HouseholdResult};
use crate::model::{Priority, ShopCategory};
use crate::record::{Collection, Record, require_text};

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub category: ShopCategory,
    #[serde(default)]
    pub priority: Priority,
    pub family_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ShopCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl Record for ShopItem {
    type Patch = ShopItemPatch;

    const COLLECTION: Collection = Collection::ShopList;

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

    fn apply(&mut self, patch: &ShopItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }

    fn validate(&self) -> HouseholdResult<()> {
        require_text("name", &self.name)?;
        require_text("familyId", &self.family_id)?;

        if self.quantity == 0 {
            return Err(HouseholdError::Validation(
                "quantity must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
