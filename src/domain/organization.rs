//! Organizational structure: sectors contain areas, areas contain branches,
//! and each branch trades under a brand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Top-level business sector.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Sector {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Sector {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Geographic area grouping branches.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Area {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Area {
    pub fn new(name: String, sector_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            sector_id,
            created_at: Utc::now(),
        }
    }
}

/// Trading brand.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A physical retail/restaurant location.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Branch {
    pub fn new(input: NewBranch) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            code: input.code,
            area_id: input.area_id,
            brand_id: input.brand_id,
            address: input.address,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewBranch {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub area_id: Option<Uuid>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BranchUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub area_id: Option<Uuid>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl BranchUpdate {
    pub fn apply(&self, branch: &mut Branch) {
        if let Some(name) = &self.name {
            branch.name = name.trim().to_string();
        }
        if let Some(code) = &self.code {
            branch.code = Some(code.clone());
        }
        if self.area_id.is_some() {
            branch.area_id = self.area_id;
        }
        if self.brand_id.is_some() {
            branch.brand_id = self.brand_id;
        }
        if let Some(address) = &self.address {
            branch.address = Some(address.clone());
        }
        if let Some(active) = self.is_active {
            branch.is_active = active;
        }
        branch.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_update() {
        let mut branch = Branch::new(NewBranch {
            name: " فرع العليا ".to_string(),
            ..Default::default()
        });
        assert_eq!(branch.name, "فرع العليا");
        assert!(branch.is_active);

        let area = Uuid::new_v4();
        BranchUpdate {
            area_id: Some(area),
            is_active: Some(false),
            ..Default::default()
        }
        .apply(&mut branch);
        assert_eq!(branch.area_id, Some(area));
        assert!(!branch.is_active);
    }
}
