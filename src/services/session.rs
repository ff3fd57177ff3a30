//! Caller resolution: token subject → stored profile.
//!
//! The role used for authorization always comes from the profile row. A
//! missing profile is created with the configured default role; a store
//! failure fails the request. There is no fallback to a privileged role or
//! to the role claim inside the token.

use uuid::Uuid;

use crate::auth::Claims;
use crate::domain::{Profile, Role};
use crate::error::{DeskError, DeskResult};
use crate::storage::DeskRepository;

#[derive(Clone)]
pub struct SessionService {
    repository: DeskRepository,
    default_role: Role,
}

impl SessionService {
    pub fn new(repository: DeskRepository, default_role: Role) -> Self {
        Self {
            repository,
            default_role,
        }
    }

    pub fn default_role(&self) -> Role {
        self.default_role
    }

    /// Load the caller's profile, creating it on first sight.
    ///
    /// Inactive profiles are rejected with 403.
    pub async fn resolve(&self, claims: &Claims) -> DeskResult<Profile> {
        self.resolve_id(claims.profile_id()?).await
    }

    /// Same as [`Self::resolve`], for an already-authenticated account id.
    pub async fn resolve_id(&self, id: Uuid) -> DeskResult<Profile> {
        let profile = match self.repository.find_profile(id).await? {
            Some(profile) => profile,
            None => self.provision(id).await?,
        };

        if !profile.is_active {
            return Err(DeskError::Forbidden("Account is deactivated".to_string()));
        }
        Ok(profile)
    }

    async fn provision(&self, id: Uuid) -> DeskResult<Profile> {
        let account = match self.repository.get_account(id).await {
            Ok(account) => account,
            Err(DeskError::NotFound(_)) => {
                return Err(DeskError::Unauthorized("Account no longer exists".to_string()))
            }
            Err(e) => return Err(e),
        };

        let profile = Profile::new(account.id, account.email, self.default_role);
        match self.repository.create_profile(&profile).await {
            Ok(()) => {
                tracing::info!(
                    profile_id = %profile.id,
                    role = %profile.role,
                    "Created missing profile with default role"
                );
                Ok(profile)
            }
            // A concurrent request created it first.
            Err(DeskError::Conflict(_)) => self.repository.get_profile(id).await,
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, JwtManager};
    use crate::domain::Account;

    async fn seeded(role: Role) -> (DeskRepository, Account) {
        let repo = DeskRepository::in_memory().await.unwrap();
        let account = Account::new("user@example.com".into(), hash_password("password123"));
        repo.create_account(&account, &Profile::new(account.id, account.email.clone(), role))
            .await
            .unwrap();
        (repo, account)
    }

    fn claims_for(account: &Account, claimed: Role) -> Claims {
        let jwt = JwtManager::new("test-secret", "facility-desk".into(), 1);
        let token = jwt.generate_token(account.id, &account.email, claimed).unwrap();
        jwt.validate_token(&token).unwrap()
    }

    #[tokio::test]
    async fn test_stored_role_wins_over_claim() {
        let (repo, account) = seeded(Role::Technician).await;
        let sessions = SessionService::new(repo, Role::Technician);

        let profile = sessions.resolve(&claims_for(&account, Role::Admin)).await.unwrap();
        assert_eq!(profile.role, Role::Technician);
    }

    #[tokio::test]
    async fn test_missing_profile_gets_default_role() {
        let (repo, account) = seeded(Role::Manager).await;
        sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(account.id.to_string())
            .execute(repo.pool())
            .await
            .unwrap();

        let sessions = SessionService::new(repo.clone(), Role::Technician);
        let profile = sessions.resolve(&claims_for(&account, Role::Admin)).await.unwrap();

        assert_eq!(profile.role, Role::Technician);
        assert!(repo.find_profile(account.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_inactive_profile_forbidden() {
        let (repo, account) = seeded(Role::Manager).await;
        let mut profile = repo.get_profile(account.id).await.unwrap();
        profile.is_active = false;
        repo.save_profile(&profile).await.unwrap();

        let sessions = SessionService::new(repo, Role::Technician);
        let err = sessions.resolve(&claims_for(&account, Role::Manager)).await.unwrap_err();
        assert!(matches!(err, DeskError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_store_failure_does_not_fall_back() {
        let (repo, account) = seeded(Role::Admin).await;
        repo.pool().close().await;

        let sessions = SessionService::new(repo, Role::Technician);
        let err = sessions.resolve(&claims_for(&account, Role::Admin)).await.unwrap_err();
        assert!(matches!(err, DeskError::Database(_)));
    }
}
