//! Assets and spare-part stock.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Asset, SparePart};
use crate::error::{DeskError, DeskResult};
use crate::storage::models::{AssetRow, SparePartRow};
use crate::storage::DeskRepository;

impl DeskRepository {
    // ==================== Assets ====================

    pub async fn create_asset(&self, asset: &Asset) -> DeskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (
                id, branch_id, name, category, serial_number, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(asset.id.to_string())
        .bind(asset.branch_id.to_string())
        .bind(&asset.name)
        .bind(&asset.category)
        .bind(&asset.serial_number)
        .bind(asset.status.to_string())
        .bind(asset.created_at.to_rfc3339())
        .bind(asset.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_asset(&self, id: Uuid) -> DeskResult<Asset> {
        let row: AssetRow = sqlx::query_as("SELECT * FROM assets WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("Asset {} not found", id)))?;
        row.try_into()
    }

    pub async fn list_assets(&self, branch_id: Option<Uuid>) -> DeskResult<Vec<Asset>> {
        let rows: Vec<AssetRow> = sqlx::query_as(
            "SELECT * FROM assets WHERE (?1 IS NULL OR branch_id = ?1) ORDER BY name ASC",
        )
        .bind(branch_id.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn save_asset(&self, asset: &Asset) -> DeskResult<()> {
        sqlx::query(
            r#"
            UPDATE assets
            SET name = ?, category = ?, serial_number = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&asset.name)
        .bind(&asset.category)
        .bind(&asset.serial_number)
        .bind(asset.status.to_string())
        .bind(asset.updated_at.to_rfc3339())
        .bind(asset.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_asset(&self, id: Uuid) -> DeskResult<()> {
        let result = sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DeskError::NotFound(format!("Asset {} not found", id)));
        }
        Ok(())
    }

    // ==================== Spare parts ====================

    pub async fn create_spare_part(&self, part: &SparePart) -> DeskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO spare_parts (
                id, name, part_number, quantity, min_quantity, unit_cost, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(part.id.to_string())
        .bind(&part.name)
        .bind(&part.part_number)
        .bind(part.quantity)
        .bind(part.min_quantity)
        .bind(part.unit_cost)
        .bind(part.created_at.to_rfc3339())
        .bind(part.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_spare_part(&self, id: Uuid) -> DeskResult<SparePart> {
        let row: SparePartRow = sqlx::query_as("SELECT * FROM spare_parts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("Spare part {} not found", id)))?;
        row.try_into()
    }

    pub async fn find_spare_part_by_number(&self, part_number: &str) -> DeskResult<Option<SparePart>> {
        let row: Option<SparePartRow> =
            sqlx::query_as("SELECT * FROM spare_parts WHERE part_number = ?")
                .bind(part_number)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| r.try_into()).transpose()
    }

    pub async fn list_spare_parts(&self, low_stock_only: bool) -> DeskResult<Vec<SparePart>> {
        let rows: Vec<SparePartRow> = sqlx::query_as(
            r#"
            SELECT * FROM spare_parts
            WHERE (?1 = 0 OR quantity <= min_quantity)
            ORDER BY name ASC
            "#,
        )
        .bind(low_stock_only)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Persist descriptive fields. Stock changes go through [`Self::adjust_stock`].
    pub async fn save_spare_part(&self, part: &SparePart) -> DeskResult<()> {
        sqlx::query(
            r#"
            UPDATE spare_parts
            SET name = ?, part_number = ?, min_quantity = ?, unit_cost = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&part.name)
        .bind(&part.part_number)
        .bind(part.min_quantity)
        .bind(part.unit_cost)
        .bind(part.updated_at.to_rfc3339())
        .bind(part.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Apply a signed stock delta in one statement; fails without changes if
    /// stock would go negative.
    pub async fn adjust_stock(&self, id: Uuid, delta: i64) -> DeskResult<SparePart> {
        let part = self.get_spare_part(id).await?;
        let result = sqlx::query(
            r#"
            UPDATE spare_parts
            SET quantity = quantity + ?1, updated_at = ?2
            WHERE id = ?3 AND quantity + ?1 >= 0
            "#,
        )
        .bind(delta)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_spare_part(id).await.unwrap_or(part);
            return Err(DeskError::BadRequest(
                current
                    .adjusted_quantity(delta)
                    .err()
                    .unwrap_or_else(|| "Stock changed concurrently, retry".to_string()),
            ));
        }

        self.get_spare_part(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewSparePart;

    fn part(quantity: i64) -> SparePart {
        SparePart::new(NewSparePart {
            name: "سير محرك".into(),
            part_number: Some("BLT-220".into()),
            quantity,
            min_quantity: 1,
            unit_cost: 80.0,
        })
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let p = part(3);
        repo.create_spare_part(&p).await.unwrap();

        let after = repo.adjust_stock(p.id, -2).await.unwrap();
        assert_eq!(after.quantity, 1);
        assert!(after.is_low_stock());

        let err = repo.adjust_stock(p.id, -5).await.unwrap_err();
        assert!(matches!(err, DeskError::BadRequest(_)));
        assert_eq!(repo.get_spare_part(p.id).await.unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let repo = DeskRepository::in_memory().await.unwrap();
        repo.create_spare_part(&part(0)).await.unwrap();
        let mut plenty = part(50);
        plenty.part_number = Some("BLT-221".into());
        repo.create_spare_part(&plenty).await.unwrap();

        assert_eq!(repo.list_spare_parts(false).await.unwrap().len(), 2);
        assert_eq!(repo.list_spare_parts(true).await.unwrap().len(), 1);
        assert!(repo
            .find_spare_part_by_number("BLT-221")
            .await
            .unwrap()
            .is_some());
    }
}
