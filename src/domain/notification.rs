//! In-app notifications and their templates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Event keys that have a template.
pub const TEMPLATE_TICKET_CREATED: &str = "ticket_created";
pub const TEMPLATE_TICKET_ASSIGNED: &str = "ticket_assigned";
pub const TEMPLATE_TICKET_STATUS_CHANGED: &str = "ticket_status_changed";

/// Title/body pair with `{{name}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationTemplate {
    pub key: String,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

impl NotificationTemplate {
    pub fn new(key: &str, title: &str, body: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            updated_at: Utc::now(),
        }
    }

    /// Render title and body with the given variables.
    pub fn render(&self, vars: &HashMap<&str, String>) -> (String, String) {
        (render_placeholders(&self.title, vars), render_placeholders(&self.body, vars))
    }

    /// Templates seeded into an empty store.
    pub fn defaults() -> Vec<NotificationTemplate> {
        vec![
            NotificationTemplate::new(
                TEMPLATE_TICKET_CREATED,
                "بلاغ جديد #{{ticket_number}}",
                "تم فتح بلاغ \"{{title}}\" في فرع {{branch_name}}",
            ),
            NotificationTemplate::new(
                TEMPLATE_TICKET_ASSIGNED,
                "تم إسناد البلاغ #{{ticket_number}} إليك",
                "{{title}} - {{branch_name}} (الأولوية: {{priority}})",
            ),
            NotificationTemplate::new(
                TEMPLATE_TICKET_STATUS_CHANGED,
                "تحديث حالة البلاغ #{{ticket_number}}",
                "تغيرت حالة \"{{title}}\" إلى {{status}}",
            ),
        ]
    }
}

/// Replace `{{name}}` with the matching variable. Unknown names and
/// unterminated braces are left verbatim.
pub fn render_placeholders(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Web-push shaped payload a service worker can display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: String,
}

/// A notification delivered to one profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient_id: Uuid, title: String, body: String, url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            title,
            body,
            url,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn push_payload(&self) -> PushPayload {
        PushPayload {
            title: self.title.clone(),
            body: self.body.clone(),
            url: self.url.clone().unwrap_or_else(|| "/".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_known_and_unknown() {
        let mut vars = HashMap::new();
        vars.insert("ticket_number", "42".to_string());
        vars.insert("title", "عطل في الثلاجة".to_string());

        let out = render_placeholders("#{{ticket_number}} {{ title }} {{missing}}", &vars);
        assert_eq!(out, "#42 عطل في الثلاجة {{missing}}");
    }

    #[test]
    fn test_render_unterminated() {
        let vars = HashMap::new();
        assert_eq!(render_placeholders("a {{b", &vars), "a {{b");
        assert_eq!(render_placeholders("plain", &vars), "plain");
    }

    #[test]
    fn test_push_payload_default_url() {
        let n = Notification::new(Uuid::new_v4(), "t".into(), "b".into(), None);
        assert_eq!(n.push_payload().url, "/");
    }

    #[test]
    fn test_default_templates_cover_events() {
        let keys: Vec<_> = NotificationTemplate::defaults()
            .into_iter()
            .map(|t| t.key)
            .collect();
        assert!(keys.contains(&TEMPLATE_TICKET_CREATED.to_string()));
        assert!(keys.contains(&TEMPLATE_TICKET_ASSIGNED.to_string()));
        assert!(keys.contains(&TEMPLATE_TICKET_STATUS_CHANGED.to_string()));
    }
}
