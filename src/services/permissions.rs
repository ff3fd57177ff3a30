//! Permission lookups against the merged matrix.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{
    default_matrix, effective_for, is_allowed, merge_overrides, Action, PermissionMatrix,
    Resource, Role,
};
use crate::error::{DeskError, DeskResult};
use crate::storage::DeskRepository;

/// Holds the default matrix overlaid with stored overrides.
#[derive(Clone)]
pub struct PermissionService {
    repository: DeskRepository,
    matrix: Arc<RwLock<PermissionMatrix>>,
}

impl PermissionService {
    /// Create the service and load overrides from the store.
    pub async fn load(repository: DeskRepository) -> DeskResult<Self> {
        let service = Self {
            repository,
            matrix: Arc::new(RwLock::new(default_matrix())),
        };
        service.refresh().await?;
        Ok(service)
    }

    /// Re-read overrides and rebuild the merged matrix.
    pub async fn refresh(&self) -> DeskResult<()> {
        let overrides = self.repository.load_permission_overrides().await?;
        let merged = merge_overrides(&default_matrix(), &overrides);
        *self.matrix.write().await = merged;
        tracing::debug!(override_roles = overrides.len(), "Permission matrix refreshed");
        Ok(())
    }

    pub async fn check(&self, role: Role, action: Action, resource: Resource) -> bool {
        let matrix = self.matrix.read().await;
        is_allowed(&matrix, role, action, resource)
    }

    /// Like [`Self::check`] but yields a 403 on denial.
    pub async fn require(&self, role: Role, action: Action, resource: Resource) -> DeskResult<()> {
        if self.check(role, action, resource).await {
            return Ok(());
        }
        tracing::debug!(%role, %action, %resource, "Permission denied");
        Err(DeskError::Forbidden(format!(
            "Role {} may not {} {}",
            role, action, resource
        )))
    }

    pub async fn effective(&self, role: Role) -> BTreeMap<Resource, BTreeSet<Action>> {
        let matrix = self.matrix.read().await;
        effective_for(&matrix, role)
    }

    /// Snapshot of the merged matrix for every non-admin role.
    pub async fn snapshot(&self) -> PermissionMatrix {
        self.matrix.read().await.clone()
    }

    /// Store new overrides and apply them immediately.
    pub async fn replace_overrides(&self, overrides: &PermissionMatrix) -> DeskResult<()> {
        self.repository.replace_permission_overrides(overrides).await?;
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_apply_without_overrides() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let service = PermissionService::load(repo).await.unwrap();

        assert!(service.check(Role::Admin, Action::Delete, Resource::Users).await);
        assert!(service.check(Role::Manager, Action::Assign, Resource::Tickets).await);
        assert!(!service.check(Role::Technician, Action::View, Resource::Reports).await);
        assert!(matches!(
            service.require(Role::Manager, Action::Create, Resource::Import).await,
            Err(DeskError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_override_replaces_default_for_pair_only() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let service = PermissionService::load(repo).await.unwrap();

        let mut overrides = PermissionMatrix::new();
        overrides
            .entry(Role::Manager)
            .or_default()
            .insert(Resource::Tickets, [Action::View].into_iter().collect());
        service.replace_overrides(&overrides).await.unwrap();

        assert!(service.check(Role::Manager, Action::View, Resource::Tickets).await);
        assert!(!service.check(Role::Manager, Action::Assign, Resource::Tickets).await);
        // Other resources keep their defaults.
        assert!(service.check(Role::Manager, Action::Delete, Resource::Assets).await);
    }
}
