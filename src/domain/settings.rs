//! System-wide settings and form configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Priority;

/// Resolution targets per priority, in hours.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlaHours {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

impl SlaHours {
    pub fn for_priority(&self, priority: Priority) -> i64 {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
            Priority::Critical => self.critical,
        }
    }
}

impl Default for SlaHours {
    fn default() -> Self {
        Self {
            low: 168,
            medium: 72,
            high: 24,
            critical: 4,
        }
    }
}

/// The single settings row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SystemSettings {
    pub organization_name: String,
    pub default_priority: Priority,
    pub sla_hours: SlaHours,
    /// Lets technicians take unassigned tickets themselves.
    pub allow_technician_self_assign: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            organization_name: "Facility Desk".to_string(),
            default_priority: Priority::Medium,
            sla_hours: SlaHours::default(),
            allow_technician_self_assign: false,
            updated_at: Utc::now(),
        }
    }
}

/// Request to update settings.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub default_priority: Option<Priority>,
    #[serde(default)]
    pub sla_hours: Option<SlaHours>,
    #[serde(default)]
    pub allow_technician_self_assign: Option<bool>,
}

impl SettingsUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.organization_name {
            if name.trim().is_empty() {
                return Err("Organization name cannot be empty".to_string());
            }
        }
        if let Some(sla) = &self.sla_hours {
            if [sla.low, sla.medium, sla.high, sla.critical]
                .iter()
                .any(|h| *h <= 0)
            {
                return Err("SLA hours must be positive".to_string());
            }
        }
        Ok(())
    }

    pub fn apply(&self, settings: &mut SystemSettings) {
        if let Some(name) = &self.organization_name {
            settings.organization_name = name.trim().to_string();
        }
        if let Some(priority) = self.default_priority {
            settings.default_priority = priority;
        }
        if let Some(sla) = &self.sla_hours {
            settings.sla_hours = sla.clone();
        }
        if let Some(allow) = self.allow_technician_self_assign {
            settings.allow_technician_self_assign = allow;
        }
        settings.updated_at = Utc::now();
    }
}

/// Visibility and requirement of one field on a client form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormFieldConfig {
    /// Form identifier, e.g. `ticket`.
    pub form: String,
    /// Field name on that form.
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

/// Optional ticket fields whose presence a form config can require.
pub const TICKET_CONFIGURABLE_FIELDS: [&str; 4] = ["description", "asset_id", "category", "priority"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sla_lookup() {
        let sla = SlaHours::default();
        assert_eq!(sla.for_priority(Priority::Critical), 4);
        assert!(sla.for_priority(Priority::Low) > sla.for_priority(Priority::High));
    }

    #[test]
    fn test_settings_update_validation() {
        let bad = SettingsUpdate {
            sla_hours: Some(SlaHours {
                low: 0,
                ..SlaHours::default()
            }),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let blank = SettingsUpdate {
            organization_name: Some("   ".into()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());

        let mut settings = SystemSettings::default();
        let ok = SettingsUpdate {
            default_priority: Some(Priority::High),
            ..Default::default()
        };
        ok.validate().unwrap();
        ok.apply(&mut settings);
        assert_eq!(settings.default_priority, Priority::High);
    }
}
