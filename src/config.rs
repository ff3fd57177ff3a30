//! Configuration module for Facility Desk.
//!
//! Loads configuration from YAML files and environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::Role;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// When false, routes are served without the bearer middleware.
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub jwt_secret: String,
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    #[serde(default = "default_token_hours")]
    pub token_duration_hours: i64,
    /// Role given to profiles created on first sign-in.
    #[serde(default)]
    pub default_role: Role,
    /// Admin account seeded when the accounts table is empty.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// First admin account, created once on an empty database.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_issuer() -> String {
    "facility-desk".to_string()
}

fn default_token_hours() -> i64 {
    12
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DESK__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("DESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_defaults() {
        let auth: AuthConfig = serde_json::from_value(serde_json::json!({
            "jwt_secret": "secret"
        }))
        .unwrap();

        assert!(auth.enabled);
        assert_eq!(auth.jwt_issuer, "facility-desk");
        assert_eq!(auth.token_duration_hours, 12);
        assert_eq!(auth.default_role, Role::Technician);
        assert!(auth.bootstrap_admin.is_none());
    }

    #[test]
    fn test_default_role_never_implicitly_admin() {
        let auth: AuthConfig = serde_json::from_value(serde_json::json!({
            "jwt_secret": "secret",
            "default_role": "manager"
        }))
        .unwrap();
        assert_eq!(auth.default_role, Role::Manager);
    }
}
