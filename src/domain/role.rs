//! Application roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role of a profile, governing visibility and permitted actions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to configuration, users, and every resource.
    Admin,
    /// Oversees workforce, inventory, and ticket assignment.
    Manager,
    /// Files and resolves maintenance tickets.
    #[default]
    Technician,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Technician];

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Technician => "technician",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "technician" => Ok(Role::Technician),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" manager ".parse::<Role>().unwrap(), Role::Manager);
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::Technician.to_string(), "technician");
    }

    #[test]
    fn test_default_role_is_least_privileged() {
        assert_eq!(Role::default(), Role::Technician);
        assert!(!Role::default().is_admin());
    }
}
