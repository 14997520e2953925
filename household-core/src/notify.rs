//! Family notifications sent when a member adds something.
//!
//! The client only fires the request; rendering the text per recipient
//! language happens on the server with [`render`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    EventCreated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyNotification {
    pub family_id: String,
    /// The member who triggered it; they are not notified.
    pub exclude_user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Collection category (`calendar`, `shopList`, `homeDuty`, `expenses`).
    pub type_category: String,
    pub variables: BTreeMap<String, String>,
    pub url: String,
}

impl FamilyNotification {
    /// Notification for a newly created item in `collection`.
    pub fn created(
        collection: Collection,
        family_id: &str,
        user_id: &str,
        user_name: &str,
        item_name: &str,
    ) -> Self {
        let variables = BTreeMap::from([
            ("userName".to_string(), user_name.to_string()),
            ("eventName".to_string(), item_name.to_string()),
        ]);

        FamilyNotification {
            family_id: family_id.to_string(),
            exclude_user_id: user_id.to_string(),
            kind: NotificationKind::EventCreated,
            type_category: collection.category().to_string(),
            variables,
            url: collection.page_url().to_string(),
        }
    }
}

/// Title and body in the recipient's language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedNotification {
    pub title: String,
    pub body: String,
    pub url: String,
}

struct Template {
    title: &'static str,
    body: &'static str,
}

fn template(kind: NotificationKind, language: &str) -> Template {
    match (kind, language) {
        (NotificationKind::EventCreated, "cz") => Template {
            title: "Nová událost: ",
            body: "{userName} přidal: {eventName}",
        },
        (NotificationKind::EventCreated, _) => Template {
            title: "New Event: ",
            body: "{userName} added: {eventName}",
        },
    }
}

fn category_label(category: &str, language: &str) -> String {
    let label = match (category, language) {
        ("calendar", "cz") => "Kalendář",
        ("calendar", _) => "Calendar",
        ("shopList", "cz") => "Nákupní seznam",
        ("shopList", _) => "Shop List",
        ("homeDuty", "cz") => "Domácí povinnosti",
        ("homeDuty", _) => "Home chores",
        ("expenses", "cz") => "Výdaje",
        ("expenses", _) => "Expenses",
        (other, _) => other,
    };
    label.to_string()
}

/// Render `notification` for a recipient speaking `language` (`en`, `cz`).
pub fn render(notification: &FamilyNotification, language: &str) -> RenderedNotification {
    let template = template(notification.kind, language);

    RenderedNotification {
        title: format!(
            "{}{}",
            template.title,
            category_label(&notification.type_category, language)
        ),
        body: fill(template.body, &notification.variables),
        url: notification.url.clone(),
    }
}

/// Replace `{name}` placeholders; unknown names render as `?`.
fn fill(template: &str, variables: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close)
                if !after[..close].is_empty()
                    && after[..close]
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_') =>
            {
                let key = &after[..close];
                match variables.get(key).filter(|v| !v.is_empty()) {
                    Some(value) => out.push_str(value),
                    None => out.push('?'),
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_english_by_default() {
        let n = FamilyNotification::created(
            Collection::ShopList,
            "fam-1",
            "user-1",
            "Jana",
            "Milk",
        );

        let rendered = render(&n, "de");

        assert_eq!(rendered.title, "New Event: Shop List");
        assert_eq!(rendered.body, "Jana added: Milk");
        assert_eq!(rendered.url, "/shoplist");
    }

    #[test]
    fn renders_czech() {
        let n = FamilyNotification::created(
            Collection::Calendar,
            "fam-1",
            "user-1",
            "Jana",
            "Večeře",
        );

        let rendered = render(&n, "cz");

        assert_eq!(rendered.title, "Nová událost: Kalendář");
        assert_eq!(rendered.body, "Jana přidal: Večeře");
    }

    #[test]
    fn missing_variables_render_as_question_marks() {
        let vars = BTreeMap::from([("userName".to_string(), String::new())]);
        assert_eq!(fill("{userName} added: {eventName}", &vars), "? added: ?");
        assert_eq!(fill("{ not a key } {", &vars), "{ not a key } {");
    }

    #[test]
    fn wire_shape() {
        let n = FamilyNotification::created(
            Collection::HomeChores,
            "fam-1",
            "user-1",
            "Jana",
            "Vacuum",
        );
        let json = serde_json::to_value(&n).unwrap();

        assert_eq!(json["type"], "EVENT_CREATED");
        assert_eq!(json["typeCategory"], "homeDuty");
        assert_eq!(json["excludeUserId"], "user-1");
        assert_eq!(json["variables"]["eventName"], "Vacuum");
    }
}
