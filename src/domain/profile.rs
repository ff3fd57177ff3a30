//! Profile and account domain types.
//!
//! An account is the authentication identity (email + password hash). A
//! profile is the application-level record holding role and assignment.
//! Both share the same id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;

/// Authentication account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&email),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Application user record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    /// Same id as the authentication account.
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    /// Home branch for technicians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<Uuid>,
    /// Area a manager is responsible for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: Uuid, email: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: normalize_email(&email),
            full_name: None,
            phone: None,
            role,
            branch_id: None,
            area_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name, falling back to the email.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

/// Input for creating an account together with its profile.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub branch_id: Option<Uuid>,
    #[serde(default)]
    pub area_id: Option<Uuid>,
}

impl NewUser {
    /// Check the email shape and password strength.
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_email(&self.email) {
            return Err(format!("Invalid email address: {}", self.email.trim()));
        }
        if self.password.chars().count() < 8 {
            return Err("Password must be at least 8 characters".to_string());
        }
        Ok(())
    }

    /// Profile for the account with `id`.
    pub fn into_profile(self, id: Uuid) -> Profile {
        let mut profile = Profile::new(id, self.email, self.role);
        profile.full_name = self.full_name;
        profile.phone = self.phone;
        profile.branch_id = self.branch_id;
        profile.area_id = self.area_id;
        profile
    }
}

/// Partial update applied by an admin.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub branch_id: Option<Uuid>,
    #[serde(default)]
    pub area_id: Option<Uuid>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ProfileUpdate {
    /// Whether applying this update would strip admin rights from `profile`.
    pub fn demotes_admin(&self, profile: &Profile) -> bool {
        if !profile.role.is_admin() || !profile.is_active {
            return false;
        }
        let loses_role = self.role.is_some_and(|r| !r.is_admin());
        let deactivated = self.is_active == Some(false);
        loses_role || deactivated
    }

    pub fn apply(&self, profile: &mut Profile) {
        if let Some(email) = &self.email {
            profile.email = normalize_email(email);
        }
        if let Some(name) = &self.full_name {
            profile.full_name = Some(name.clone());
        }
        if let Some(phone) = &self.phone {
            profile.phone = Some(phone.clone());
        }
        if let Some(role) = self.role {
            profile.role = role;
        }
        if self.branch_id.is_some() {
            profile.branch_id = self.branch_id;
        }
        if self.area_id.is_some() {
            profile.area_id = self.area_id;
        }
        if let Some(active) = self.is_active {
            profile.is_active = active;
        }
        profile.updated_at = Utc::now();
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal email shape check.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_helpers() {
        assert_eq!(normalize_email("  Tech@Example.COM "), "tech@example.com");
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@localhost"));
    }

    #[test]
    fn test_demotes_admin() {
        let admin = Profile::new(Uuid::new_v4(), "a@b.co".into(), Role::Admin);
        let demote = ProfileUpdate {
            role: Some(Role::Manager),
            ..Default::default()
        };
        let deactivate = ProfileUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let rename = ProfileUpdate {
            full_name: Some("أحمد".into()),
            ..Default::default()
        };
        assert!(demote.demotes_admin(&admin));
        assert!(deactivate.demotes_admin(&admin));
        assert!(!rename.demotes_admin(&admin));

        let tech = Profile::new(Uuid::new_v4(), "t@b.co".into(), Role::Technician);
        assert!(!demote.demotes_admin(&tech));
    }

    #[test]
    fn test_apply_update() {
        let mut p = Profile::new(Uuid::new_v4(), "t@b.co".into(), Role::Technician);
        ProfileUpdate {
            role: Some(Role::Manager),
            phone: Some("0500000000".into()),
            ..Default::default()
        }
        .apply(&mut p);
        assert_eq!(p.role, Role::Manager);
        assert_eq!(p.phone.as_deref(), Some("0500000000"));
        assert!(p.is_active);
    }
}
