//! Permission matrix types.
//!
//! A permission is an (action, resource) pair granted to a role. The
//! effective matrix is the built-in default overlaid with stored
//! per-(role, resource) overrides.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Role;

/// Something a caller can do to a resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Assign,
    Close,
    Export,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Assign => "assign",
            Action::Close => "close",
            Action::Export => "export",
        };
        f.write_str(s)
    }
}

/// A protected area of the application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Tickets,
    Branches,
    /// Sectors, areas and brands.
    Organization,
    Assets,
    SpareParts,
    Users,
    Reports,
    Settings,
    Import,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Resource::Tickets => "tickets",
            Resource::Branches => "branches",
            Resource::Organization => "organization",
            Resource::Assets => "assets",
            Resource::SpareParts => "spare_parts",
            Resource::Users => "users",
            Resource::Reports => "reports",
            Resource::Settings => "settings",
            Resource::Import => "import",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("Unknown resource: {}", s))
    }
}

/// Role → resource → allowed actions.
pub type PermissionMatrix = BTreeMap<Role, BTreeMap<Resource, BTreeSet<Action>>>;

/// Built-in permissions used whenever no override is stored.
///
/// Admin is absent on purpose: admins pass every check unconditionally.
pub fn default_matrix() -> PermissionMatrix {
    use Action::*;
    use Resource::*;

    fn grants(entries: &[(Resource, &[Action])]) -> BTreeMap<Resource, BTreeSet<Action>> {
        entries
            .iter()
            .map(|(resource, actions)| (*resource, actions.iter().copied().collect()))
            .collect()
    }

    let mut matrix = PermissionMatrix::new();
    matrix.insert(
        Role::Manager,
        grants(&[
            (Tickets, &[View, Create, Edit, Assign, Close]),
            (Branches, &[View, Create, Edit]),
            (Organization, &[View]),
            (Assets, &[View, Create, Edit, Delete]),
            (SpareParts, &[View, Create, Edit]),
            (Users, &[View]),
            (Reports, &[View, Export]),
            (Settings, &[View]),
        ]),
    );
    matrix.insert(
        Role::Technician,
        grants(&[
            (Tickets, &[View, Create, Edit]),
            (Branches, &[View]),
            (Organization, &[View]),
            (Assets, &[View]),
            (SpareParts, &[View]),
        ]),
    );
    matrix
}

/// Overlay stored overrides onto the defaults, per (role, resource).
///
/// Overrides for admin are ignored.
pub fn merge_overrides(defaults: &PermissionMatrix, overrides: &PermissionMatrix) -> PermissionMatrix {
    let mut merged = defaults.clone();
    for (role, resources) in overrides {
        if role.is_admin() {
            continue;
        }
        let entry = merged.entry(*role).or_default();
        for (resource, actions) in resources {
            entry.insert(*resource, actions.clone());
        }
    }
    merged
}

/// Look up a single permission.
pub fn is_allowed(matrix: &PermissionMatrix, role: Role, action: Action, resource: Resource) -> bool {
    if role.is_admin() {
        return true;
    }
    matrix
        .get(&role)
        .and_then(|resources| resources.get(&resource))
        .is_some_and(|actions| actions.contains(&action))
}

/// Everything a role may do, expanded (admin gets the full grid).
pub fn effective_for(matrix: &PermissionMatrix, role: Role) -> BTreeMap<Resource, BTreeSet<Action>> {
    if role.is_admin() {
        return ALL_RESOURCES
            .iter()
            .map(|r| (*r, ALL_ACTIONS.iter().copied().collect()))
            .collect();
    }
    matrix.get(&role).cloned().unwrap_or_default()
}

pub const ALL_ACTIONS: [Action; 7] = [
    Action::View,
    Action::Create,
    Action::Edit,
    Action::Delete,
    Action::Assign,
    Action::Close,
    Action::Export,
];

pub const ALL_RESOURCES: [Resource; 9] = [
    Resource::Tickets,
    Resource::Branches,
    Resource::Organization,
    Resource::Assets,
    Resource::SpareParts,
    Resource::Users,
    Resource::Reports,
    Resource::Settings,
    Resource::Import,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_always_allowed() {
        let empty = PermissionMatrix::new();
        for resource in ALL_RESOURCES {
            for action in ALL_ACTIONS {
                assert!(is_allowed(&empty, Role::Admin, action, resource));
            }
        }
    }

    #[test]
    fn test_default_grants() {
        let m = default_matrix();
        assert!(is_allowed(&m, Role::Manager, Action::Assign, Resource::Tickets));
        assert!(is_allowed(&m, Role::Technician, Action::Create, Resource::Tickets));
        assert!(!is_allowed(&m, Role::Technician, Action::Assign, Resource::Tickets));
        assert!(!is_allowed(&m, Role::Technician, Action::View, Resource::Reports));
        assert!(!is_allowed(&m, Role::Manager, Action::Edit, Resource::Settings));
        assert!(!is_allowed(&m, Role::Manager, Action::Create, Resource::Import));
    }

    #[test]
    fn test_override_replaces_single_pair() {
        let defaults = default_matrix();
        let mut overrides = PermissionMatrix::new();
        overrides
            .entry(Role::Technician)
            .or_default()
            .insert(Resource::Reports, [Action::View].into_iter().collect());

        let merged = merge_overrides(&defaults, &overrides);
        assert!(is_allowed(&merged, Role::Technician, Action::View, Resource::Reports));
        // Untouched pairs keep their defaults
        assert!(is_allowed(&merged, Role::Technician, Action::Create, Resource::Tickets));
    }

    #[test]
    fn test_override_can_revoke() {
        let defaults = default_matrix();
        let mut overrides = PermissionMatrix::new();
        overrides
            .entry(Role::Manager)
            .or_default()
            .insert(Resource::Tickets, BTreeSet::new());

        let merged = merge_overrides(&defaults, &overrides);
        assert!(!is_allowed(&merged, Role::Manager, Action::View, Resource::Tickets));
    }

    #[test]
    fn test_matrix_json_shape() {
        let json = serde_json::to_value(default_matrix()).unwrap();
        assert!(json["technician"]["tickets"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("view")));
        assert_eq!("spare_parts".parse::<Resource>().unwrap(), Resource::SpareParts);
    }
}
