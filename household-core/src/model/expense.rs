use serde::{Deserialize, Serialize};

use crate::error::{HouseholdError, HouseholdResult};
use crate::model::{Currency, ExpenseCategory};
use crate::record::{Collection, Record, require_text};
use crate::time::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: Currency,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub user_id: String,
    pub family_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,
}

impl Record for Expense {
    type Patch = ExpensePatch;

    const COLLECTION: Collection = Collection::Expenses;

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

    fn apply(&mut self, patch: &ExpensePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(note) = &patch.note {
            self.note = Some(note.clone());
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }

    fn validate(&self) -> HouseholdResult<()> {
        require_text("name", &self.name)?;
        require_text("familyId", &self.family_id)?;
        require_text("userId", &self.user_id)?;

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(HouseholdError::Validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }

        if parse_timestamp(&self.date).is_none() {
            return Err(HouseholdError::Validation(format!(
                "invalid date '{}'",
                self.date
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groceries() -> Expense {
        Expense {
            id: String::new(),
            name: "Groceries".into(),
            amount: 42.5,
            currency: Currency::Eur,
            date: "2024-02-10".into(),
            note: None,
            category: ExpenseCategory::Food,
            user_id: "user-1".into(),
            family_id: "fam-1".into(),
        }
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let mut expense = groceries();
        expense.amount = 0.0;
        assert!(expense.validate().is_err());

        expense.amount = f64::NAN;
        assert!(expense.validate().is_err());

        assert!(groceries().validate().is_ok());
    }

    #[test]
    fn currency_uses_iso_codes() {
        let json = serde_json::to_value(groceries()).unwrap();
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["category"], "FOOD");
        assert_eq!(json["userId"], "user-1");
    }
}
