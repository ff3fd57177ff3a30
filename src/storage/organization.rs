//! Sectors, areas, brands and branches.

use uuid::Uuid;

use crate::domain::{Area, Branch, Brand, Sector};
use crate::error::{DeskError, DeskResult};
use crate::storage::models::{AreaRow, BranchRow, BrandRow, SectorRow};
use crate::storage::DeskRepository;

impl DeskRepository {
    // ==================== Sectors ====================

    pub async fn create_sector(&self, sector: &Sector) -> DeskResult<()> {
        sqlx::query("INSERT INTO sectors (id, name, created_at) VALUES (?, ?, ?)")
            .bind(sector.id.to_string())
            .bind(&sector.name)
            .bind(sector.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_sectors(&self) -> DeskResult<Vec<Sector>> {
        let rows: Vec<SectorRow> = sqlx::query_as("SELECT * FROM sectors ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn delete_sector(&self, id: Uuid) -> DeskResult<()> {
        delete_by_id(self, "sectors", "Sector", id).await
    }

    // ==================== Areas ====================

    pub async fn create_area(&self, area: &Area) -> DeskResult<()> {
        sqlx::query("INSERT INTO areas (id, name, sector_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(area.id.to_string())
            .bind(&area.name)
            .bind(area.sector_id.map(|id| id.to_string()))
            .bind(area.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_area(&self, id: Uuid) -> DeskResult<Area> {
        let row: AreaRow = sqlx::query_as("SELECT * FROM areas WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("Area {} not found", id)))?;
        row.try_into()
    }

    pub async fn list_areas(&self, sector_id: Option<Uuid>) -> DeskResult<Vec<Area>> {
        let rows: Vec<AreaRow> = sqlx::query_as(
            "SELECT * FROM areas WHERE (?1 IS NULL OR sector_id = ?1) ORDER BY name ASC",
        )
        .bind(sector_id.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn delete_area(&self, id: Uuid) -> DeskResult<()> {
        delete_by_id(self, "areas", "Area", id).await
    }

    // ==================== Brands ====================

    pub async fn create_brand(&self, brand: &Brand) -> DeskResult<()> {
        sqlx::query("INSERT INTO brands (id, name, created_at) VALUES (?, ?, ?)")
            .bind(brand.id.to_string())
            .bind(&brand.name)
            .bind(brand.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_brand(&self, id: Uuid) -> DeskResult<Brand> {
        let row: BrandRow = sqlx::query_as("SELECT * FROM brands WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("Brand {} not found", id)))?;
        row.try_into()
    }

    pub async fn list_brands(&self) -> DeskResult<Vec<Brand>> {
        let rows: Vec<BrandRow> = sqlx::query_as("SELECT * FROM brands ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn delete_brand(&self, id: Uuid) -> DeskResult<()> {
        delete_by_id(self, "brands", "Brand", id).await
    }

    // ==================== Branches ====================

    pub async fn create_branch(&self, branch: &Branch) -> DeskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO branches (
                id, name, code, area_id, brand_id, address, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(branch.id.to_string())
        .bind(&branch.name)
        .bind(&branch.code)
        .bind(branch.area_id.map(|id| id.to_string()))
        .bind(branch.brand_id.map(|id| id.to_string()))
        .bind(&branch.address)
        .bind(branch.is_active)
        .bind(branch.created_at.to_rfc3339())
        .bind(branch.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_branch(&self, id: Uuid) -> DeskResult<Branch> {
        let row: BranchRow = sqlx::query_as("SELECT * FROM branches WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("Branch {} not found", id)))?;
        row.try_into()
    }

    pub async fn list_branches(
        &self,
        area_id: Option<Uuid>,
        brand_id: Option<Uuid>,
    ) -> DeskResult<Vec<Branch>> {
        let rows: Vec<BranchRow> = sqlx::query_as(
            r#"
            SELECT * FROM branches
            WHERE (?1 IS NULL OR area_id = ?1)
              AND (?2 IS NULL OR brand_id = ?2)
            ORDER BY name ASC
            "#,
        )
        .bind(area_id.map(|id| id.to_string()))
        .bind(brand_id.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn save_branch(&self, branch: &Branch) -> DeskResult<()> {
        sqlx::query(
            r#"
            UPDATE branches
            SET name = ?, code = ?, area_id = ?, brand_id = ?, address = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&branch.name)
        .bind(&branch.code)
        .bind(branch.area_id.map(|id| id.to_string()))
        .bind(branch.brand_id.map(|id| id.to_string()))
        .bind(&branch.address)
        .bind(branch.is_active)
        .bind(branch.updated_at.to_rfc3339())
        .bind(branch.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_branch(&self, id: Uuid) -> DeskResult<()> {
        delete_by_id(self, "branches", "Branch", id).await
    }
}

/// Delete a row by id from a fixed table; 404 when nothing was deleted.
async fn delete_by_id(
    repo: &DeskRepository,
    table: &'static str,
    label: &str,
    id: Uuid,
) -> DeskResult<()> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
        .bind(id.to_string())
        .execute(&repo.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DeskError::NotFound(format!("{} {} not found", label, id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBranch;

    #[tokio::test]
    async fn test_branch_filters() {
        let repo = DeskRepository::in_memory().await.unwrap();

        let sector = Sector::new("المطاعم".into());
        repo.create_sector(&sector).await.unwrap();
        let riyadh = Area::new("الرياض".into(), Some(sector.id));
        let jeddah = Area::new("جدة".into(), Some(sector.id));
        repo.create_area(&riyadh).await.unwrap();
        repo.create_area(&jeddah).await.unwrap();

        for (name, area) in [("فرع العليا", riyadh.id), ("فرع الملز", riyadh.id), ("فرع الحمراء", jeddah.id)] {
            repo.create_branch(&Branch::new(NewBranch {
                name: name.into(),
                area_id: Some(area),
                ..Default::default()
            }))
            .await
            .unwrap();
        }

        assert_eq!(repo.list_branches(None, None).await.unwrap().len(), 3);
        assert_eq!(repo.list_branches(Some(riyadh.id), None).await.unwrap().len(), 2);
        assert_eq!(repo.list_areas(Some(sector.id)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_referenced_area_conflicts() {
        let repo = DeskRepository::in_memory().await.unwrap();

        let area = Area::new("الدمام".into(), None);
        repo.create_area(&area).await.unwrap();
        repo.create_branch(&Branch::new(NewBranch {
            name: "فرع الشاطئ".into(),
            area_id: Some(area.id),
            ..Default::default()
        }))
        .await
        .unwrap();

        let err = repo.delete_area(area.id).await.unwrap_err();
        assert!(matches!(err, DeskError::Conflict(_)));

        let missing = repo.delete_brand(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(missing, DeskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_brand_conflicts() {
        let repo = DeskRepository::in_memory().await.unwrap();
        repo.create_brand(&Brand::new("البيك".into())).await.unwrap();
        let err = repo.create_brand(&Brand::new("البيك".into())).await.unwrap_err();
        assert!(matches!(err, DeskError::Conflict(_)));
    }
}
