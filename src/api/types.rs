//! API request and response types.
//!
//! Domain types are returned as-is where they already are the wire shape;
//! the types here cover envelopes, queries and small command bodies.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    Action, Asset, Branch, Notification, PermissionMatrix, Profile, PushPayload, Resource, Role,
    SparePart, Ticket, TicketPart, TicketStatus,
};

// ==================== Health ====================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Database connectivity.
    pub database: String,
    /// Timestamp.
    pub timestamp: String,
}

// ==================== Authentication ====================

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT token.
    pub token: String,
    pub profile: Profile,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// The caller's profile and what they may do.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub profile: Profile,
    /// Resource → allowed actions.
    #[schema(value_type = Object)]
    pub permissions: BTreeMap<Resource, BTreeSet<Action>>,
}

// ==================== Admin users ====================

/// Success envelope of the admin user operations.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserResponse {
    pub data: Profile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedUser {
    pub id: Uuid,
    pub deleted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDeleteResponse {
    pub data: DeletedUser,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfilesQuery {
    /// Filter by role.
    #[serde(default)]
    pub role: Option<Role>,
}

// ==================== Tickets ====================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub branch_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    /// Maximum results (default 50).
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketListResponse {
    pub tickets: Vec<Ticket>,
    pub limit: i64,
    pub offset: i64,
}

/// Assign or unassign a ticket.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTicketRequest {
    /// Profile to assign, or null to unassign.
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    pub status: TicketStatus,
    /// Resolution notes, kept on the ticket.
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTicketPartRequest {
    pub spare_part_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketPartsResponse {
    pub parts: Vec<TicketPart>,
}

// ==================== Organization ====================

#[derive(Debug, Deserialize, ToSchema)]
pub struct NamedRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAreaRequest {
    pub name: String,
    #[serde(default)]
    pub sector_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AreasQuery {
    #[serde(default)]
    pub sector_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BranchesQuery {
    #[serde(default)]
    pub area_id: Option<Uuid>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BranchListResponse {
    pub branches: Vec<Branch>,
}

// ==================== Inventory ====================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssetsQuery {
    #[serde(default)]
    pub branch_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetListResponse {
    pub assets: Vec<Asset>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SparePartsQuery {
    /// Only parts at or below their minimum quantity.
    #[serde(default)]
    pub low_stock: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SparePartListResponse {
    pub spare_parts: Vec<SparePart>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    /// Signed change in stock.
    pub delta: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

// ==================== Settings ====================

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionsResponse {
    /// Effective matrix (defaults overlaid with overrides). Admin is implicit.
    #[schema(value_type = Object)]
    pub effective: PermissionMatrix,
    /// Stored overrides only.
    #[schema(value_type = Object)]
    pub overrides: PermissionMatrix,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePermissionsRequest {
    /// Role → resource → actions. Replaces every stored override.
    #[schema(value_type = Object)]
    pub overrides: PermissionMatrix,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTemplateRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormFieldsQuery {
    #[serde(default)]
    pub form: Option<String>,
}

// ==================== Notifications ====================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// A notification together with its web-push payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub push: PushPayload,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        let push = notification.push_payload();
        Self { notification, push }
    }
}

// ==================== Reports ====================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// 24h, 7d, 30d, 90d or 365d.
    #[serde(default)]
    pub range: Option<String>,
}

// ==================== Import ====================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImportQuery {
    /// Parse and match without writing.
    #[serde(default)]
    pub dry_run: bool,
}
