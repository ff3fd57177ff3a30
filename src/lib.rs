//! Facility Desk - maintenance ticketing for multi-branch chains.
//!
//! Technicians file and resolve tickets against branches and assets,
//! managers oversee work and stock, and admins configure structure,
//! permissions and settings.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod import;
pub mod logging;
pub mod services;
pub mod storage;

use crate::auth::JwtManager;
use crate::config::AuthConfig;
use crate::error::DeskResult;
use crate::import::Importer;
use crate::services::{Notifier, PermissionService, SessionService, UserService};
use crate::storage::DeskRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database repository.
    pub repository: DeskRepository,
    /// JWT manager for token operations.
    pub jwt_manager: JwtManager,
    pub permissions: PermissionService,
    /// Resolves the caller's stored profile.
    pub sessions: SessionService,
    pub notifier: Notifier,
    pub users: UserService,
    pub importer: Importer,
}

impl AppState {
    /// Wire services over an initialized repository.
    pub async fn new(repository: DeskRepository, auth: &AuthConfig) -> DeskResult<Self> {
        let permissions = PermissionService::load(repository.clone()).await?;
        Ok(Self {
            jwt_manager: JwtManager::new(
                &auth.jwt_secret,
                auth.jwt_issuer.clone(),
                auth.token_duration_hours,
            ),
            permissions,
            sessions: SessionService::new(repository.clone(), auth.default_role),
            notifier: Notifier::new(repository.clone()),
            users: UserService::new(repository.clone()),
            importer: Importer::new(repository.clone()),
            repository,
        })
    }
}
