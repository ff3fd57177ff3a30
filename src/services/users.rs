//! Privileged user administration.
//!
//! Every operation requires the caller's stored profile to be an admin and
//! protects the last active admin from demotion, deactivation or deletion.

use uuid::Uuid;

use crate::auth::{hash_password, validate_password};
use crate::config::BootstrapAdmin;
use crate::domain::{normalize_email, Account, NewUser, Profile, ProfileUpdate, Role};
use crate::error::{DeskError, DeskResult};
use crate::storage::DeskRepository;

#[derive(Clone)]
pub struct UserService {
    repository: DeskRepository,
}

impl UserService {
    pub fn new(repository: DeskRepository) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, actor: &Profile, input: NewUser) -> DeskResult<Profile> {
        require_admin(actor)?;
        input.validate().map_err(DeskError::BadRequest)?;

        if self
            .repository
            .get_account_by_email(&input.email)
            .await?
            .is_some()
        {
            return Err(DeskError::Conflict(format!(
                "An account with email {} already exists",
                normalize_email(&input.email)
            )));
        }

        let account = Account::new(input.email.clone(), hash_password(&input.password));
        let profile = input.into_profile(account.id);
        self.repository.create_account(&account, &profile).await?;

        tracing::info!(
            actor_id = %actor.id,
            user_id = %profile.id,
            role = %profile.role,
            "User created"
        );
        Ok(profile)
    }

    pub async fn update_user(
        &self,
        actor: &Profile,
        id: Uuid,
        update: ProfileUpdate,
    ) -> DeskResult<Profile> {
        require_admin(actor)?;

        let mut profile = self.repository.get_profile(id).await?;

        if update.demotes_admin(&profile) && self.repository.count_active_admins().await? <= 1 {
            return Err(DeskError::BadRequest(
                "Cannot demote or deactivate the last active admin".to_string(),
            ));
        }

        let email = match &update.email {
            Some(email) => {
                if !crate::domain::is_valid_email(email) {
                    return Err(DeskError::BadRequest(format!("Invalid email address: {}", email)));
                }
                Some(normalize_email(email))
            }
            None => None,
        };
        let password_hash = match &update.password {
            Some(password) => {
                validate_password(password).map_err(DeskError::BadRequest)?;
                Some(hash_password(password))
            }
            None => None,
        };

        update.apply(&mut profile);
        self.repository
            .update_account(&profile, email.as_deref(), password_hash.as_deref())
            .await?;

        tracing::info!(
            actor_id = %actor.id,
            user_id = %id,
            role = %profile.role,
            active = profile.is_active,
            password_changed = password_hash.is_some(),
            "User updated"
        );
        Ok(profile)
    }

    pub async fn delete_user(&self, actor: &Profile, id: Uuid) -> DeskResult<()> {
        require_admin(actor)?;

        if actor.id == id {
            return Err(DeskError::BadRequest("You cannot delete your own account".to_string()));
        }

        let target = self.repository.get_profile(id).await?;
        if target.role.is_admin()
            && target.is_active
            && self.repository.count_active_admins().await? <= 1
        {
            return Err(DeskError::BadRequest("Cannot delete the last active admin".to_string()));
        }

        self.repository.delete_account(id).await?;
        tracing::info!(actor_id = %actor.id, user_id = %id, "User deleted");
        Ok(())
    }

    /// Seed the configured admin when no account exists yet.
    pub async fn ensure_bootstrap_admin(&self, admin: &BootstrapAdmin) -> DeskResult<Option<Profile>> {
        if self.repository.count_accounts().await? > 0 {
            return Ok(None);
        }

        let input = NewUser {
            email: admin.email.clone(),
            password: admin.password.clone(),
            full_name: admin.full_name.clone(),
            phone: None,
            role: Role::Admin,
            branch_id: None,
            area_id: None,
        };
        input.validate().map_err(DeskError::Config)?;

        let account = Account::new(input.email.clone(), hash_password(&input.password));
        let profile = input.into_profile(account.id);
        self.repository.create_account(&account, &profile).await?;

        tracing::warn!(
            email = %profile.email,
            "Bootstrap admin created; change its password"
        );
        Ok(Some(profile))
    }
}

fn require_admin(actor: &Profile) -> DeskResult<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(DeskError::Forbidden("Admin role required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.into(),
            password: "password123".into(),
            full_name: None,
            phone: None,
            role,
            branch_id: None,
            area_id: None,
        }
    }

    async fn with_admin() -> (UserService, DeskRepository, Profile) {
        let repo = DeskRepository::in_memory().await.unwrap();
        let service = UserService::new(repo.clone());
        let admin = service
            .ensure_bootstrap_admin(&BootstrapAdmin {
                email: "root@example.com".into(),
                password: "admin12345".into(),
                full_name: Some("مدير النظام".into()),
            })
            .await
            .unwrap()
            .unwrap();
        (service, repo, admin)
    }

    #[tokio::test]
    async fn test_bootstrap_only_once() {
        let (service, repo, admin) = with_admin().await;
        assert_eq!(admin.role, Role::Admin);

        let again = service
            .ensure_bootstrap_admin(&BootstrapAdmin {
                email: "other@example.com".into(),
                password: "admin12345".into(),
                full_name: None,
            })
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(repo.count_accounts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let (service, _, admin) = with_admin().await;
        let manager = service
            .create_user(&admin, new_user("m@example.com", Role::Manager))
            .await
            .unwrap();

        let err = service.delete_user(&manager, admin.id).await.unwrap_err();
        assert!(matches!(err, DeskError::Forbidden(_)));
        let err = service
            .create_user(&manager, new_user("x@example.com", Role::Technician))
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_last_admin_protected() {
        let (service, _, admin) = with_admin().await;

        let err = service
            .update_user(
                &admin,
                admin.id,
                ProfileUpdate {
                    role: Some(Role::Manager),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::BadRequest(_)));

        let err = service.delete_user(&admin, admin.id).await.unwrap_err();
        assert!(matches!(err, DeskError::BadRequest(_)));

        // With a second admin, demotion is allowed.
        service
            .create_user(&admin, new_user("second@example.com", Role::Admin))
            .await
            .unwrap();
        let demoted = service
            .update_user(
                &admin,
                admin.id,
                ProfileUpdate {
                    role: Some(Role::Manager),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(demoted.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_password_change_and_delete() {
        let (service, repo, admin) = with_admin().await;
        let tech = service
            .create_user(&admin, new_user("Tech@Example.com", Role::Technician))
            .await
            .unwrap();
        assert_eq!(tech.email, "tech@example.com");

        let err = service
            .update_user(
                &admin,
                tech.id,
                ProfileUpdate {
                    password: Some("short".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::BadRequest(_)));

        service
            .update_user(
                &admin,
                tech.id,
                ProfileUpdate {
                    password: Some("new-password".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let account = repo.get_account(tech.id).await.unwrap();
        assert!(crate::auth::verify_password("new-password", &account.password_hash));

        service.delete_user(&admin, tech.id).await.unwrap();
        assert!(matches!(
            service.delete_user(&admin, tech.id).await,
            Err(DeskError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (service, _, admin) = with_admin().await;
        let err = service
            .create_user(&admin, new_user("ROOT@example.com", Role::Manager))
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_failed_profile_write_keeps_credentials() {
        let (service, repo, admin) = with_admin().await;
        let tech = service
            .create_user(&admin, new_user("tech@example.com", Role::Technician))
            .await
            .unwrap();

        let err = service
            .update_user(
                &admin,
                tech.id,
                ProfileUpdate {
                    email: Some("moved@example.com".into()),
                    password: Some("brand-new-pass".into()),
                    branch_id: Some(Uuid::new_v4()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Conflict(_)));

        let account = repo.get_account(tech.id).await.unwrap();
        assert_eq!(account.email, "tech@example.com");
        assert!(crate::auth::verify_password("password123", &account.password_hash));
        assert!(!crate::auth::verify_password("brand-new-pass", &account.password_hash));
        assert_eq!(repo.get_profile(tech.id).await.unwrap().branch_id, None);
    }
}
