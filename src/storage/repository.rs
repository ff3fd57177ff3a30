//! Repository layer for database operations.
//!
//! Entity-specific queries live in sibling modules as further
//! `impl DeskRepository` blocks.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{Account, Profile, Role};
use crate::error::{DeskError, DeskResult};
use crate::storage::models::{AccountRow, ProfileRow};

/// Repository for all Facility Desk database operations.
#[derive(Clone)]
pub struct DeskRepository {
    pub(super) pool: SqlitePool,
}

impl DeskRepository {
    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl DeskRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `url` with foreign keys enforced.
    pub async fn connect(url: &str, max_connections: u32) -> DeskResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Single-connection in-memory database, schema initialized.
    pub async fn in_memory() -> DeskResult<Self> {
        let repo = Self::connect("sqlite::memory:", 1).await?;
        repo.init_schema().await?;
        Ok(repo)
    }

    /// Initialize the database schema.
    pub async fn init_schema(&self) -> DeskResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                full_name TEXT,
                phone TEXT,
                role TEXT NOT NULL DEFAULT 'technician',
                branch_id TEXT,
                area_id TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (id) REFERENCES accounts(id) ON DELETE CASCADE,
                FOREIGN KEY (branch_id) REFERENCES branches(id) ON DELETE SET NULL,
                FOREIGN KEY (area_id) REFERENCES areas(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_profiles_role ON profiles(role);
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Organization tables
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sectors (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS areas (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sector_id TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (sector_id) REFERENCES sectors(id)
            );

            CREATE TABLE IF NOT EXISTS brands (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS branches (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                code TEXT,
                area_id TEXT,
                brand_id TEXT,
                address TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (area_id) REFERENCES areas(id),
                FOREIGN KEY (brand_id) REFERENCES brands(id)
            );

            CREATE INDEX IF NOT EXISTS idx_branches_area ON branches(area_id);
            CREATE INDEX IF NOT EXISTS idx_branches_brand ON branches(brand_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Inventory tables
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS assets (
                id TEXT PRIMARY KEY,
                branch_id TEXT NOT NULL,
                name TEXT NOT NULL,
                category TEXT,
                serial_number TEXT,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (branch_id) REFERENCES branches(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_assets_branch ON assets(branch_id);

            CREATE TABLE IF NOT EXISTS spare_parts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                part_number TEXT UNIQUE,
                quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
                min_quantity INTEGER NOT NULL DEFAULT 0,
                unit_cost REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Tickets
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                ticket_number INTEGER NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT,
                branch_id TEXT NOT NULL,
                asset_id TEXT,
                category TEXT,
                priority TEXT NOT NULL,
                status TEXT NOT NULL,
                reported_by TEXT NOT NULL,
                assigned_to TEXT,
                resolution_notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                resolved_at TEXT,
                closed_at TEXT,
                FOREIGN KEY (branch_id) REFERENCES branches(id),
                FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE SET NULL,
                FOREIGN KEY (assigned_to) REFERENCES profiles(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_tickets_branch ON tickets(branch_id);
            CREATE INDEX IF NOT EXISTS idx_tickets_assigned ON tickets(assigned_to);
            CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at);

            CREATE TABLE IF NOT EXISTS ticket_parts (
                id TEXT PRIMARY KEY,
                ticket_id TEXT NOT NULL,
                spare_part_id TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE,
                FOREIGN KEY (spare_part_id) REFERENCES spare_parts(id)
            );

            CREATE INDEX IF NOT EXISTS idx_ticket_parts_ticket ON ticket_parts(ticket_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Settings, permissions, templates, notifications
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS system_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                organization_name TEXT NOT NULL,
                default_priority TEXT NOT NULL,
                sla_low_hours INTEGER NOT NULL,
                sla_medium_hours INTEGER NOT NULL,
                sla_high_hours INTEGER NOT NULL,
                sla_critical_hours INTEGER NOT NULL,
                allow_technician_self_assign INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS role_permissions (
                role TEXT NOT NULL,
                resource TEXT NOT NULL,
                actions TEXT NOT NULL,
                PRIMARY KEY (role, resource)
            );

            CREATE TABLE IF NOT EXISTS notification_templates (
                key TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS form_field_configs (
                form TEXT NOT NULL,
                field TEXT NOT NULL,
                label TEXT,
                visible INTEGER NOT NULL DEFAULT 1,
                required INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (form, field)
            );

            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                recipient_id TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                url TEXT,
                read_at TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (recipient_id) REFERENCES profiles(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications(recipient_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        self.seed_defaults().await?;

        Ok(())
    }

    // ==================== Accounts ====================

    /// Create an account together with its profile, atomically.
    pub async fn create_account(&self, account: &Account, profile: &Profile) -> DeskResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO accounts (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(account.id.to_string())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        insert_profile(&mut tx, profile).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get an account by email.
    pub async fn get_account_by_email(&self, email: &str) -> DeskResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE email = ?")
            .bind(crate::domain::normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: Uuid) -> DeskResult<Account> {
        let row: AccountRow = sqlx::query_as("SELECT * FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("Account {} not found", id)))?;

        row.try_into()
    }

    pub async fn count_accounts(&self) -> DeskResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Change an account's email and/or password and save its profile,
    /// atomically. A failed profile write leaves the credentials untouched.
    pub async fn update_account(
        &self,
        profile: &Profile,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> DeskResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(email) = email {
            sqlx::query("UPDATE accounts SET email = ? WHERE id = ?")
                .bind(email)
                .bind(profile.id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        if let Some(hash) = password_hash {
            sqlx::query("UPDATE accounts SET password_hash = ? WHERE id = ?")
                .bind(hash)
                .bind(profile.id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        update_profile(&mut tx, profile).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete an account; its profile and notifications cascade.
    pub async fn delete_account(&self, id: Uuid) -> DeskResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DeskError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    // ==================== Profiles ====================

    /// Get a profile by ID, if present.
    pub async fn find_profile(&self, id: Uuid) -> DeskResult<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    /// Get a profile by ID.
    pub async fn get_profile(&self, id: Uuid) -> DeskResult<Profile> {
        self.find_profile(id)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("User {} not found", id)))
    }

    /// Insert a standalone profile for an existing account.
    pub async fn create_profile(&self, profile: &Profile) -> DeskResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_profile(&mut tx, profile).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Persist every mutable profile column.
    pub async fn save_profile(&self, profile: &Profile) -> DeskResult<()> {
        let mut tx = self.pool.begin().await?;
        update_profile(&mut tx, profile).await?;
        tx.commit().await?;
        Ok(())
    }

    /// List profiles, optionally filtered by role.
    pub async fn list_profiles(&self, role: Option<Role>) -> DeskResult<Vec<Profile>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT * FROM profiles
            WHERE (?1 IS NULL OR role = ?1)
            ORDER BY COALESCE(full_name, email) ASC
            "#,
        )
        .bind(role.map(|r| r.to_string()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Number of active admin profiles.
    pub async fn count_active_admins(&self) -> DeskResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE role = 'admin' AND is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

async fn insert_profile(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    profile: &Profile,
) -> DeskResult<()> {
    sqlx::query(
        r#"
        INSERT INTO profiles (
            id, email, full_name, phone, role, branch_id, area_id,
            is_active, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(profile.id.to_string())
    .bind(&profile.email)
    .bind(&profile.full_name)
    .bind(&profile.phone)
    .bind(profile.role.to_string())
    .bind(profile.branch_id.map(|id| id.to_string()))
    .bind(profile.area_id.map(|id| id.to_string()))
    .bind(profile.is_active)
    .bind(profile.created_at.to_rfc3339())
    .bind(profile.updated_at.to_rfc3339())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn update_profile(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    profile: &Profile,
) -> DeskResult<()> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET email = ?, full_name = ?, phone = ?, role = ?, branch_id = ?,
            area_id = ?, is_active = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&profile.email)
    .bind(&profile.full_name)
    .bind(&profile.phone)
    .bind(profile.role.to_string())
    .bind(profile.branch_id.map(|id| id.to_string()))
    .bind(profile.area_id.map(|id| id.to_string()))
    .bind(profile.is_active)
    .bind(profile.updated_at.to_rfc3339())
    .bind(profile.id.to_string())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, verify_password};

    #[tokio::test]
    async fn test_account_with_profile() {
        let repo = DeskRepository::in_memory().await.unwrap();

        let account = Account::new("Tech@Example.com".into(), hash_password("password123"));
        let profile = Profile::new(account.id, account.email.clone(), Role::Technician);
        repo.create_account(&account, &profile).await.unwrap();

        let found = repo
            .get_account_by_email("tech@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, account.id);
        assert!(verify_password("password123", &found.password_hash));

        let stored = repo.get_profile(account.id).await.unwrap();
        assert_eq!(stored.role, Role::Technician);
        assert!(stored.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = DeskRepository::in_memory().await.unwrap();

        let a = Account::new("dup@example.com".into(), hash_password("password123"));
        repo.create_account(&a, &Profile::new(a.id, a.email.clone(), Role::Manager))
            .await
            .unwrap();

        let b = Account::new("dup@example.com".into(), hash_password("password123"));
        let err = repo
            .create_account(&b, &Profile::new(b.id, b.email.clone(), Role::Manager))
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Conflict(_)));
        // Profile insert rolled back with the account
        assert!(repo.find_profile(b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_account_cascades_profile() {
        let repo = DeskRepository::in_memory().await.unwrap();

        let a = Account::new("gone@example.com".into(), hash_password("password123"));
        repo.create_account(&a, &Profile::new(a.id, a.email.clone(), Role::Technician))
            .await
            .unwrap();

        repo.delete_account(a.id).await.unwrap();
        assert!(repo.find_profile(a.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_account(a.id).await,
            Err(DeskError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_count_active_admins() {
        let repo = DeskRepository::in_memory().await.unwrap();
        assert_eq!(repo.count_active_admins().await.unwrap(), 0);

        let a = Account::new("boss@example.com".into(), hash_password("password123"));
        let mut p = Profile::new(a.id, a.email.clone(), Role::Admin);
        repo.create_account(&a, &p).await.unwrap();
        assert_eq!(repo.count_active_admins().await.unwrap(), 1);

        p.is_active = false;
        repo.save_profile(&p).await.unwrap();
        assert_eq!(repo.count_active_admins().await.unwrap(), 0);
    }
}
