//! Database models for Facility Desk.
//!
//! These are the row types returned by SQLx queries.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    Account, Area, Asset, Branch, Brand, FormFieldConfig, Notification, NotificationTemplate,
    Profile, Sector, SlaHours, SparePart, SystemSettings, Ticket, TicketPart,
};
use crate::error::DeskError;

fn parse_uuid(s: &str) -> Result<Uuid, DeskError> {
    Uuid::parse_str(s).map_err(|e| DeskError::Internal(e.to_string()))
}

fn parse_opt_uuid(s: Option<String>) -> Result<Option<Uuid>, DeskError> {
    s.as_deref().map(parse_uuid).transpose()
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, DeskError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DeskError::Internal(e.to_string()))
}

fn parse_opt_ts(s: Option<String>) -> Result<Option<DateTime<Utc>>, DeskError> {
    s.as_deref().map(parse_ts).transpose()
}

/// Database row for accounts table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = DeskError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: parse_uuid(&row.id)?,
            email: row.email,
            password_hash: row.password_hash,
            created_at: parse_ts(&row.created_at)?,
        })
    }
}

/// Database row for profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub branch_id: Option<String>,
    pub area_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DeskError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: parse_uuid(&row.id)?,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            role: row.role.parse().map_err(DeskError::Internal)?,
            branch_id: parse_opt_uuid(row.branch_id)?,
            area_id: parse_opt_uuid(row.area_id)?,
            is_active: row.is_active,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

// ==================== Organization ====================

#[derive(Debug, Clone, FromRow)]
pub struct SectorRow {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl TryFrom<SectorRow> for Sector {
    type Error = DeskError;

    fn try_from(row: SectorRow) -> Result<Self, Self::Error> {
        Ok(Sector {
            id: parse_uuid(&row.id)?,
            name: row.name,
            created_at: parse_ts(&row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AreaRow {
    pub id: String,
    pub name: String,
    pub sector_id: Option<String>,
    pub created_at: String,
}

impl TryFrom<AreaRow> for Area {
    type Error = DeskError;

    fn try_from(row: AreaRow) -> Result<Self, Self::Error> {
        Ok(Area {
            id: parse_uuid(&row.id)?,
            name: row.name,
            sector_id: parse_opt_uuid(row.sector_id)?,
            created_at: parse_ts(&row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BrandRow {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl TryFrom<BrandRow> for Brand {
    type Error = DeskError;

    fn try_from(row: BrandRow) -> Result<Self, Self::Error> {
        Ok(Brand {
            id: parse_uuid(&row.id)?,
            name: row.name,
            created_at: parse_ts(&row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BranchRow {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub area_id: Option<String>,
    pub brand_id: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<BranchRow> for Branch {
    type Error = DeskError;

    fn try_from(row: BranchRow) -> Result<Self, Self::Error> {
        Ok(Branch {
            id: parse_uuid(&row.id)?,
            name: row.name,
            code: row.code,
            area_id: parse_opt_uuid(row.area_id)?,
            brand_id: parse_opt_uuid(row.brand_id)?,
            address: row.address,
            is_active: row.is_active,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

// ==================== Inventory ====================

#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<AssetRow> for Asset {
    type Error = DeskError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: parse_uuid(&row.id)?,
            branch_id: parse_uuid(&row.branch_id)?,
            name: row.name,
            category: row.category,
            serial_number: row.serial_number,
            status: row.status.parse().map_err(DeskError::Internal)?,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SparePartRow {
    pub id: String,
    pub name: String,
    pub part_number: Option<String>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub unit_cost: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<SparePartRow> for SparePart {
    type Error = DeskError;

    fn try_from(row: SparePartRow) -> Result<Self, Self::Error> {
        Ok(SparePart {
            id: parse_uuid(&row.id)?,
            name: row.name,
            part_number: row.part_number,
            quantity: row.quantity,
            min_quantity: row.min_quantity,
            unit_cost: row.unit_cost,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

// ==================== Tickets ====================

/// Database row for tickets table.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: String,
    pub ticket_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub branch_id: String,
    pub asset_id: Option<String>,
    pub category: Option<String>,
    pub priority: String,
    pub status: String,
    pub reported_by: String,
    pub assigned_to: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub resolved_at: Option<String>,
    pub closed_at: Option<String>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = DeskError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Ticket {
            id: parse_uuid(&row.id)?,
            ticket_number: row.ticket_number,
            title: row.title,
            description: row.description,
            branch_id: parse_uuid(&row.branch_id)?,
            asset_id: parse_opt_uuid(row.asset_id)?,
            category: row.category,
            priority: row.priority.parse().map_err(DeskError::Internal)?,
            status: row.status.parse().map_err(DeskError::Internal)?,
            reported_by: parse_uuid(&row.reported_by)?,
            assigned_to: parse_opt_uuid(row.assigned_to)?,
            resolution_notes: row.resolution_notes,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            resolved_at: parse_opt_ts(row.resolved_at)?,
            closed_at: parse_opt_ts(row.closed_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TicketPartRow {
    pub id: String,
    pub ticket_id: String,
    pub spare_part_id: String,
    pub quantity: i64,
    pub created_at: String,
}

impl TryFrom<TicketPartRow> for TicketPart {
    type Error = DeskError;

    fn try_from(row: TicketPartRow) -> Result<Self, Self::Error> {
        Ok(TicketPart {
            id: parse_uuid(&row.id)?,
            ticket_id: parse_uuid(&row.ticket_id)?,
            spare_part_id: parse_uuid(&row.spare_part_id)?,
            quantity: row.quantity,
            created_at: parse_ts(&row.created_at)?,
        })
    }
}

// ==================== Settings ====================

/// Database row for system_settings table.
#[derive(Debug, Clone, FromRow)]
pub struct SystemSettingsRow {
    pub organization_name: String,
    pub default_priority: String,
    pub sla_low_hours: i64,
    pub sla_medium_hours: i64,
    pub sla_high_hours: i64,
    pub sla_critical_hours: i64,
    pub allow_technician_self_assign: bool,
    pub updated_at: String,
}

impl TryFrom<SystemSettingsRow> for SystemSettings {
    type Error = DeskError;

    fn try_from(row: SystemSettingsRow) -> Result<Self, Self::Error> {
        Ok(SystemSettings {
            organization_name: row.organization_name,
            default_priority: row.default_priority.parse().map_err(DeskError::Internal)?,
            sla_hours: SlaHours {
                low: row.sla_low_hours,
                medium: row.sla_medium_hours,
                high: row.sla_high_hours,
                critical: row.sla_critical_hours,
            },
            allow_technician_self_assign: row.allow_technician_self_assign,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

/// Database row for role_permissions table.
#[derive(Debug, Clone, FromRow)]
pub struct RolePermissionRow {
    pub role: String,
    pub resource: String,
    /// JSON array of action names.
    pub actions: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationTemplateRow {
    pub key: String,
    pub title: String,
    pub body: String,
    pub updated_at: String,
}

impl TryFrom<NotificationTemplateRow> for NotificationTemplate {
    type Error = DeskError;

    fn try_from(row: NotificationTemplateRow) -> Result<Self, Self::Error> {
        Ok(NotificationTemplate {
            key: row.key,
            title: row.title,
            body: row.body,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FormFieldConfigRow {
    pub form: String,
    pub field: String,
    pub label: Option<String>,
    pub visible: bool,
    pub required: bool,
}

impl From<FormFieldConfigRow> for FormFieldConfig {
    fn from(row: FormFieldConfigRow) -> Self {
        FormFieldConfig {
            form: row.form,
            field: row.field,
            label: row.label,
            visible: row.visible,
            required: row.required,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: String,
    pub recipient_id: String,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub read_at: Option<String>,
    pub created_at: String,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DeskError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: parse_uuid(&row.id)?,
            recipient_id: parse_uuid(&row.recipient_id)?,
            title: row.title,
            body: row.body,
            url: row.url,
            read_at: parse_opt_ts(row.read_at)?,
            created_at: parse_ts(&row.created_at)?,
        })
    }
}
