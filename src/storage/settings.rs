//! System settings, permission overrides, templates, form fields and
//! in-app notifications.

use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Action, FormFieldConfig, Notification, NotificationTemplate, PermissionMatrix, Role,
    SystemSettings,
};
use crate::error::{DeskError, DeskResult};
use crate::storage::models::{
    FormFieldConfigRow, NotificationRow, NotificationTemplateRow, RolePermissionRow,
    SystemSettingsRow,
};
use crate::storage::DeskRepository;

impl DeskRepository {
    /// Insert the settings row and default templates if they are missing.
    pub(super) async fn seed_defaults(&self) -> DeskResult<()> {
        let defaults = SystemSettings::default();
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO system_settings (
                id, organization_name, default_priority, sla_low_hours, sla_medium_hours,
                sla_high_hours, sla_critical_hours, allow_technician_self_assign, updated_at
            ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&defaults.organization_name)
        .bind(defaults.default_priority.to_string())
        .bind(defaults.sla_hours.low)
        .bind(defaults.sla_hours.medium)
        .bind(defaults.sla_hours.high)
        .bind(defaults.sla_hours.critical)
        .bind(defaults.allow_technician_self_assign)
        .bind(defaults.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        for template in NotificationTemplate::defaults() {
            sqlx::query(
                "INSERT OR IGNORE INTO notification_templates (key, title, body, updated_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&template.key)
            .bind(&template.title)
            .bind(&template.body)
            .bind(template.updated_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    // ==================== System settings ====================

    pub async fn get_settings(&self) -> DeskResult<SystemSettings> {
        let row: SystemSettingsRow = sqlx::query_as(
            r#"
            SELECT organization_name, default_priority, sla_low_hours, sla_medium_hours,
                   sla_high_hours, sla_critical_hours, allow_technician_self_assign, updated_at
            FROM system_settings WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DeskError::Internal("System settings row missing".to_string()))?;
        row.try_into()
    }

    pub async fn save_settings(&self, settings: &SystemSettings) -> DeskResult<()> {
        sqlx::query(
            r#"
            UPDATE system_settings
            SET organization_name = ?, default_priority = ?, sla_low_hours = ?,
                sla_medium_hours = ?, sla_high_hours = ?, sla_critical_hours = ?,
                allow_technician_self_assign = ?, updated_at = ?
            WHERE id = 1
            "#,
        )
        .bind(&settings.organization_name)
        .bind(settings.default_priority.to_string())
        .bind(settings.sla_hours.low)
        .bind(settings.sla_hours.medium)
        .bind(settings.sla_hours.high)
        .bind(settings.sla_hours.critical)
        .bind(settings.allow_technician_self_assign)
        .bind(settings.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ==================== Permission overrides ====================

    /// Stored overrides as a (sparse) matrix.
    pub async fn load_permission_overrides(&self) -> DeskResult<PermissionMatrix> {
        let rows: Vec<RolePermissionRow> =
            sqlx::query_as("SELECT role, resource, actions FROM role_permissions")
                .fetch_all(&self.pool)
                .await?;

        let mut matrix = PermissionMatrix::new();
        for row in rows {
            let role: Role = row.role.parse().map_err(DeskError::Internal)?;
            let resource = row.resource.parse().map_err(DeskError::Internal)?;
            let actions: BTreeSet<Action> = serde_json::from_str(&row.actions)?;
            matrix.entry(role).or_default().insert(resource, actions);
        }
        Ok(matrix)
    }

    /// Replace every stored override with `overrides`.
    pub async fn replace_permission_overrides(&self, overrides: &PermissionMatrix) -> DeskResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions")
            .execute(&mut *tx)
            .await?;

        for (role, resources) in overrides {
            if role.is_admin() {
                continue;
            }
            for (resource, actions) in resources {
                sqlx::query(
                    "INSERT INTO role_permissions (role, resource, actions) VALUES (?, ?, ?)",
                )
                .bind(role.to_string())
                .bind(resource.to_string())
                .bind(serde_json::to_string(actions)?)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    // ==================== Notification templates ====================

    pub async fn list_templates(&self) -> DeskResult<Vec<NotificationTemplate>> {
        let rows: Vec<NotificationTemplateRow> =
            sqlx::query_as("SELECT * FROM notification_templates ORDER BY key ASC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn find_template(&self, key: &str) -> DeskResult<Option<NotificationTemplate>> {
        let row: Option<NotificationTemplateRow> =
            sqlx::query_as("SELECT * FROM notification_templates WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| r.try_into()).transpose()
    }

    pub async fn upsert_template(&self, template: &NotificationTemplate) -> DeskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_templates (key, title, body, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&template.key)
        .bind(&template.title)
        .bind(&template.body)
        .bind(template.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ==================== Form fields ====================

    pub async fn list_form_fields(&self, form: Option<&str>) -> DeskResult<Vec<FormFieldConfig>> {
        let rows: Vec<FormFieldConfigRow> = sqlx::query_as(
            "SELECT * FROM form_field_configs WHERE (?1 IS NULL OR form = ?1) ORDER BY form, field",
        )
        .bind(form)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FormFieldConfig::from).collect())
    }

    pub async fn upsert_form_field(&self, config: &FormFieldConfig) -> DeskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO form_field_configs (form, field, label, visible, required)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(form, field) DO UPDATE SET
                label = excluded.label,
                visible = excluded.visible,
                required = excluded.required
            "#,
        )
        .bind(&config.form)
        .bind(&config.field)
        .bind(&config.label)
        .bind(config.visible)
        .bind(config.required)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ==================== Notifications ====================

    pub async fn create_notification(&self, notification: &Notification) -> DeskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, title, body, url, read_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(notification.id.to_string())
        .bind(notification.recipient_id.to_string())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.url)
        .bind(notification.read_at.map(|t| t.to_rfc3339()))
        .bind(notification.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
    ) -> DeskResult<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = ?1 AND (?2 = 0 OR read_at IS NULL)
            ORDER BY created_at DESC
            LIMIT 200
            "#,
        )
        .bind(recipient_id.to_string())
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Mark a notification read. Only its recipient may do so.
    pub async fn mark_notification_read(&self, id: Uuid, recipient_id: Uuid) -> DeskResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET read_at = COALESCE(read_at, ?)
            WHERE id = ? AND recipient_id = ?
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(recipient_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DeskError::NotFound(format!("Notification {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::domain::{Account, Priority, Profile, Resource, TEMPLATE_TICKET_CREATED};

    #[tokio::test]
    async fn test_defaults_seeded_once() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let mut settings = repo.get_settings().await.unwrap();
        assert_eq!(settings.default_priority, Priority::Medium);

        settings.organization_name = "مطاعم الريف".into();
        repo.save_settings(&settings).await.unwrap();

        // Re-running schema init must not reset anything.
        repo.init_schema().await.unwrap();
        assert_eq!(repo.get_settings().await.unwrap().organization_name, "مطاعم الريف");
        assert!(repo.find_template(TEMPLATE_TICKET_CREATED).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_permission_overrides_roundtrip() {
        let repo = DeskRepository::in_memory().await.unwrap();
        assert!(repo.load_permission_overrides().await.unwrap().is_empty());

        let mut overrides = PermissionMatrix::new();
        overrides
            .entry(Role::Technician)
            .or_default()
            .insert(Resource::Reports, [Action::View].into_iter().collect());
        overrides
            .entry(Role::Admin)
            .or_default()
            .insert(Resource::Users, BTreeSet::new());
        repo.replace_permission_overrides(&overrides).await.unwrap();

        let loaded = repo.load_permission_overrides().await.unwrap();
        assert!(!loaded.contains_key(&Role::Admin));
        assert!(loaded[&Role::Technician][&Resource::Reports].contains(&Action::View));
    }

    #[tokio::test]
    async fn test_notifications_read_by_recipient_only() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let account = Account::new("tech@example.com".into(), hash_password("password123"));
        repo.create_account(&account, &Profile::new(account.id, account.email.clone(), Role::Technician))
            .await
            .unwrap();

        let n = Notification::new(account.id, "بلاغ جديد".into(), "تم إنشاء بلاغ".into(), None);
        repo.create_notification(&n).await.unwrap();

        assert!(matches!(
            repo.mark_notification_read(n.id, Uuid::new_v4()).await,
            Err(DeskError::NotFound(_))
        ));
        repo.mark_notification_read(n.id, account.id).await.unwrap();

        assert_eq!(repo.list_notifications(account.id, false).await.unwrap().len(), 1);
        assert!(repo.list_notifications(account.id, true).await.unwrap().is_empty());
    }
}
