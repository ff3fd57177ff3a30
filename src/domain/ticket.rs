//! Maintenance ticket domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    OnHold,
    Resolved,
    Closed,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 6] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::OnHold,
        TicketStatus::Resolved,
        TicketStatus::Closed,
        TicketStatus::Cancelled,
    ];

    /// Whether a ticket may move from `self` to `next`.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, InProgress | OnHold | Cancelled)
                | (InProgress, OnHold | Resolved | Cancelled)
                | (OnHold, InProgress | Cancelled)
                | (Resolved, Closed | InProgress)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Closed | TicketStatus::Cancelled)
    }

    /// Open work counted against the SLA.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TicketStatus::Open | TicketStatus::InProgress | TicketStatus::OnHold
        )
    }

    /// Moving into this state ends the ticket and needs the close permission.
    pub fn requires_close_permission(self) -> bool {
        self.is_terminal()
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::OnHold => "on_hold",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
            TicketStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "on_hold" => Ok(TicketStatus::OnHold),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            "cancelled" => Ok(TicketStatus::Cancelled),
            _ => Err(format!("Invalid ticket status: {}", s)),
        }
    }
}

/// Ticket urgency.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" | "urgent" => Ok(Priority::Critical),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// A maintenance request tied to a branch and optionally an asset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Ticket {
    pub id: Uuid,
    /// Human-facing sequential number.
    pub ticket_number: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub branch_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub priority: Priority,
    pub status: TicketStatus,
    pub reported_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// A fresh ticket. The number is allocated by the store on insert.
    pub fn new(new: NewTicket, reported_by: Uuid, default_priority: Priority) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ticket_number: 0,
            title: new.title.trim().to_string(),
            description: new.description,
            branch_id: new.branch_id,
            asset_id: new.asset_id,
            category: new.category,
            priority: new.priority.unwrap_or(default_priority),
            status: TicketStatus::Open,
            reported_by,
            assigned_to: None,
            resolution_notes: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            closed_at: None,
        }
    }

    /// Whether `profile_id` reported or is assigned to this ticket.
    pub fn involves(&self, profile_id: Uuid) -> bool {
        self.reported_by == profile_id || self.assigned_to == Some(profile_id)
    }

    /// Move to `next`, stamping lifecycle timestamps.
    pub fn transition(&mut self, next: TicketStatus, notes: Option<String>) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Cannot move ticket from {} to {}",
                self.status, next
            ));
        }
        let now = Utc::now();
        match next {
            TicketStatus::Resolved => self.resolved_at = Some(now),
            TicketStatus::InProgress if self.status == TicketStatus::Resolved => {
                self.resolved_at = None;
            }
            TicketStatus::Closed | TicketStatus::Cancelled => self.closed_at = Some(now),
            _ => {}
        }
        if notes.is_some() {
            self.resolution_notes = notes;
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Hours from creation to resolution, if resolved.
    pub fn resolution_hours(&self) -> Option<f64> {
        self.resolved_at
            .map(|r| (r - self.created_at).num_seconds() as f64 / 3600.0)
    }
}

/// Input for filing a ticket.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewTicket {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub branch_id: Uuid,
    #[serde(default)]
    pub asset_id: Option<Uuid>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Editable ticket fields.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TicketUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub asset_id: Option<Uuid>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl TicketUpdate {
    pub fn apply(&self, ticket: &mut Ticket) {
        if let Some(title) = &self.title {
            ticket.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            ticket.description = Some(description.clone());
        }
        if self.asset_id.is_some() {
            ticket.asset_id = self.asset_id;
        }
        if let Some(category) = &self.category {
            ticket.category = Some(category.clone());
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        ticket.updated_at = Utc::now();
    }
}

/// Filters for listing tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub branch_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    /// Restrict to tickets this profile reported or is assigned to.
    pub involving: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

/// Spare parts consumed while working a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketPart {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub spare_part_id: Uuid,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl TicketPart {
    pub fn new(ticket_id: Uuid, spare_part_id: Uuid, quantity: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            spare_part_id,
            quantity,
            created_at: Utc::now(),
        }
    }
}
