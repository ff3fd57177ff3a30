//! Assets installed at branches and spare-part stock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Operational state of an asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    #[default]
    Operational,
    UnderMaintenance,
    OutOfService,
    Retired,
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssetStatus::Operational => "operational",
            AssetStatus::UnderMaintenance => "under_maintenance",
            AssetStatus::OutOfService => "out_of_service",
            AssetStatus::Retired => "retired",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "operational" => Ok(AssetStatus::Operational),
            "under_maintenance" => Ok(AssetStatus::UnderMaintenance),
            "out_of_service" => Ok(AssetStatus::OutOfService),
            "retired" => Ok(AssetStatus::Retired),
            _ => Err(format!("Invalid asset status: {}", s)),
        }
    }
}

/// Equipment installed at a branch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Asset {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub status: AssetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(input: NewAsset) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            branch_id: input.branch_id,
            name: input.name.trim().to_string(),
            category: input.category,
            serial_number: input.serial_number,
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAsset {
    pub branch_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: Option<AssetStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AssetUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: Option<AssetStatus>,
}

impl AssetUpdate {
    pub fn apply(&self, asset: &mut Asset) {
        if let Some(name) = &self.name {
            asset.name = name.trim().to_string();
        }
        if let Some(category) = &self.category {
            asset.category = Some(category.clone());
        }
        if let Some(serial) = &self.serial_number {
            asset.serial_number = Some(serial.clone());
        }
        if let Some(status) = self.status {
            asset.status = status;
        }
        asset.updated_at = Utc::now();
    }
}

/// Stocked replacement part.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SparePart {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    pub quantity: i64,
    /// Reorder threshold.
    pub min_quantity: i64,
    pub unit_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SparePart {
    pub fn new(input: NewSparePart) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            part_number: input.part_number,
            quantity: input.quantity,
            min_quantity: input.min_quantity,
            unit_cost: input.unit_cost,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// Stock level after applying `delta`, or an error if it would go negative.
    pub fn adjusted_quantity(&self, delta: i64) -> Result<i64, String> {
        let next = self.quantity + delta;
        if next < 0 {
            return Err(format!(
                "Insufficient stock for '{}': {} available, {} requested",
                self.name, self.quantity, -delta
            ));
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewSparePart {
    pub name: String,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub unit_cost: f64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SparePartUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub min_quantity: Option<i64>,
    #[serde(default)]
    pub unit_cost: Option<f64>,
}

impl SparePartUpdate {
    pub fn apply(&self, part: &mut SparePart) {
        if let Some(name) = &self.name {
            part.name = name.trim().to_string();
        }
        if let Some(pn) = &self.part_number {
            part.part_number = Some(pn.clone());
        }
        if let Some(min) = self.min_quantity {
            part.min_quantity = min;
        }
        if let Some(cost) = self.unit_cost {
            part.unit_cost = cost;
        }
        part.updated_at = Utc::now();
    }
}
