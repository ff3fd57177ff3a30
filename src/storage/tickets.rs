//! Ticket persistence and part consumption.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Ticket, TicketFilter, TicketPart};
use crate::error::{DeskError, DeskResult};
use crate::storage::models::{TicketPartRow, TicketRow};
use crate::storage::DeskRepository;

impl DeskRepository {
    /// Insert a ticket, allocating the next `ticket_number` in the same
    /// statement. Returns the stored ticket.
    pub async fn create_ticket(&self, ticket: &Ticket) -> DeskResult<Ticket> {
        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, ticket_number, title, description, branch_id, asset_id, category,
                priority, status, reported_by, assigned_to, resolution_notes,
                created_at, updated_at, resolved_at, closed_at
            ) VALUES (
                ?, (SELECT COALESCE(MAX(ticket_number), 0) + 1 FROM tickets),
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            )
            "#,
        )
        .bind(ticket.id.to_string())
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.branch_id.to_string())
        .bind(ticket.asset_id.map(|id| id.to_string()))
        .bind(&ticket.category)
        .bind(ticket.priority.to_string())
        .bind(ticket.status.to_string())
        .bind(ticket.reported_by.to_string())
        .bind(ticket.assigned_to.map(|id| id.to_string()))
        .bind(&ticket.resolution_notes)
        .bind(ticket.created_at.to_rfc3339())
        .bind(ticket.updated_at.to_rfc3339())
        .bind(ticket.resolved_at.map(|t| t.to_rfc3339()))
        .bind(ticket.closed_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        self.get_ticket(ticket.id).await
    }

    pub async fn get_ticket(&self, id: Uuid) -> DeskResult<Ticket> {
        let row: TicketRow = sqlx::query_as("SELECT * FROM tickets WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("Ticket {} not found", id)))?;
        row.try_into()
    }

    /// List tickets newest first. `involving` keeps only tickets the given
    /// profile reported or is assigned to.
    pub async fn list_tickets(&self, filter: &TicketFilter) -> DeskResult<Vec<Ticket>> {
        let limit = if filter.limit <= 0 { 50 } else { filter.limit.min(500) };

        let rows: Vec<TicketRow> = sqlx::query_as(
            r#"
            SELECT * FROM tickets
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR priority = ?2)
              AND (?3 IS NULL OR branch_id = ?3)
              AND (?4 IS NULL OR assigned_to = ?4)
              AND (?5 IS NULL OR reported_by = ?5 OR assigned_to = ?5)
            ORDER BY ticket_number DESC
            LIMIT ?6 OFFSET ?7
            "#,
        )
        .bind(filter.status.map(|s| s.to_string()))
        .bind(filter.priority.map(|p| p.to_string()))
        .bind(filter.branch_id.map(|id| id.to_string()))
        .bind(filter.assigned_to.map(|id| id.to_string()))
        .bind(filter.involving.map(|id| id.to_string()))
        .bind(limit)
        .bind(filter.offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Tickets created at or after `since`, for reporting.
    pub async fn list_tickets_since(&self, since: DateTime<Utc>) -> DeskResult<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            "SELECT * FROM tickets WHERE created_at >= ? ORDER BY created_at ASC",
        )
        .bind(since.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Tickets still open, in progress or on hold, whenever they were filed.
    pub async fn list_active_tickets(&self) -> DeskResult<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            r#"
            SELECT * FROM tickets
            WHERE status IN ('open', 'in_progress', 'on_hold')
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Persist every mutable ticket column.
    pub async fn save_ticket(&self, ticket: &Ticket) -> DeskResult<()> {
        sqlx::query(
            r#"
            UPDATE tickets
            SET title = ?, description = ?, asset_id = ?, category = ?, priority = ?,
                status = ?, assigned_to = ?, resolution_notes = ?, updated_at = ?,
                resolved_at = ?, closed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.asset_id.map(|id| id.to_string()))
        .bind(&ticket.category)
        .bind(ticket.priority.to_string())
        .bind(ticket.status.to_string())
        .bind(ticket.assigned_to.map(|id| id.to_string()))
        .bind(&ticket.resolution_notes)
        .bind(ticket.updated_at.to_rfc3339())
        .bind(ticket.resolved_at.map(|t| t.to_rfc3339()))
        .bind(ticket.closed_at.map(|t| t.to_rfc3339()))
        .bind(ticket.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_ticket(&self, id: Uuid) -> DeskResult<()> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DeskError::NotFound(format!("Ticket {} not found", id)));
        }
        Ok(())
    }

    // ==================== Ticket parts ====================

    /// Record part usage on a ticket and take it out of stock, atomically.
    pub async fn add_ticket_part(&self, part: &TicketPart) -> DeskResult<()> {
        if part.quantity <= 0 {
            return Err(DeskError::BadRequest(
                "Quantity must be greater than zero".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let taken = sqlx::query(
            r#"
            UPDATE spare_parts
            SET quantity = quantity - ?1, updated_at = ?2
            WHERE id = ?3 AND quantity >= ?1
            "#,
        )
        .bind(part.quantity)
        .bind(Utc::now().to_rfc3339())
        .bind(part.spare_part_id.to_string())
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            // Either the part is unknown or stock is short; tell them apart.
            let stock: Option<(i64,)> =
                sqlx::query_as("SELECT quantity FROM spare_parts WHERE id = ?")
                    .bind(part.spare_part_id.to_string())
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match stock {
                None => DeskError::NotFound(format!(
                    "Spare part {} not found",
                    part.spare_part_id
                )),
                Some((available,)) => DeskError::BadRequest(format!(
                    "Insufficient stock: requested {}, available {}",
                    part.quantity, available
                )),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO ticket_parts (id, ticket_id, spare_part_id, quantity, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(part.id.to_string())
        .bind(part.ticket_id.to_string())
        .bind(part.spare_part_id.to_string())
        .bind(part.quantity)
        .bind(part.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_ticket_parts(&self, ticket_id: Uuid) -> DeskResult<Vec<TicketPart>> {
        let rows: Vec<TicketPartRow> = sqlx::query_as(
            "SELECT * FROM ticket_parts WHERE ticket_id = ? ORDER BY created_at ASC",
        )
        .bind(ticket_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Branch, NewBranch, NewSparePart, NewTicket, Priority, SparePart, TicketStatus,
    };

    async fn setup() -> (DeskRepository, Branch) {
        let repo = DeskRepository::in_memory().await.unwrap();
        let branch = Branch::new(NewBranch {
            name: "فرع التحلية".into(),
            ..Default::default()
        });
        repo.create_branch(&branch).await.unwrap();
        (repo, branch)
    }

    fn new_ticket(branch_id: Uuid, title: &str) -> NewTicket {
        NewTicket {
            title: title.into(),
            description: None,
            branch_id,
            asset_id: None,
            category: None,
            priority: None,
        }
    }

    #[tokio::test]
    async fn test_ticket_numbers_are_sequential() {
        let (repo, branch) = setup().await;
        let reporter = Uuid::new_v4();

        let first = repo
            .create_ticket(&Ticket::new(new_ticket(branch.id, "تسريب مياه"), reporter, Priority::Medium))
            .await
            .unwrap();
        let second = repo
            .create_ticket(&Ticket::new(new_ticket(branch.id, "عطل مكيف"), reporter, Priority::High))
            .await
            .unwrap();

        assert_eq!(first.ticket_number, 1);
        assert_eq!(second.ticket_number, 2);
        assert_eq!(first.status, TicketStatus::Open);
        assert_eq!(second.priority, Priority::High);
    }

    #[tokio::test]
    async fn test_involving_filter() {
        let (repo, branch) = setup().await;
        let tech = Uuid::new_v4();
        let other = Uuid::new_v4();

        repo.create_ticket(&Ticket::new(new_ticket(branch.id, "mine"), tech, Priority::Low))
            .await
            .unwrap();
        let mut assigned = Ticket::new(new_ticket(branch.id, "assigned"), other, Priority::Low);
        assigned.assigned_to = Some(tech);
        repo.create_ticket(&assigned).await.unwrap();
        repo.create_ticket(&Ticket::new(new_ticket(branch.id, "theirs"), other, Priority::Low))
            .await
            .unwrap();

        let all = repo.list_tickets(&TicketFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let visible = repo
            .list_tickets(&TicketFilter {
                involving: Some(tech),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|t| t.involves(tech)));
    }

    #[tokio::test]
    async fn test_unknown_branch_rejected() {
        let (repo, _) = setup().await;
        let ticket = Ticket::new(new_ticket(Uuid::new_v4(), "orphan"), Uuid::new_v4(), Priority::Low);
        let err = repo.create_ticket(&ticket).await.unwrap_err();
        assert!(matches!(err, DeskError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_part_consumption_respects_stock() {
        let (repo, branch) = setup().await;
        let ticket = repo
            .create_ticket(&Ticket::new(new_ticket(branch.id, "فلتر"), Uuid::new_v4(), Priority::Low))
            .await
            .unwrap();
        let part = SparePart::new(NewSparePart {
            name: "فلتر هواء".into(),
            part_number: None,
            quantity: 2,
            min_quantity: 0,
            unit_cost: 15.0,
        });
        repo.create_spare_part(&part).await.unwrap();

        repo.add_ticket_part(&TicketPart::new(ticket.id, part.id, 2))
            .await
            .unwrap();
        assert_eq!(repo.get_spare_part(part.id).await.unwrap().quantity, 0);

        let err = repo
            .add_ticket_part(&TicketPart::new(ticket.id, part.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::BadRequest(_)));
        assert_eq!(repo.get_spare_part(part.id).await.unwrap().quantity, 0);
        assert_eq!(repo.list_ticket_parts(ticket.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_active_tickets_ignore_age() {
        let (repo, branch) = setup().await;
        let reporter = Uuid::new_v4();

        let mut old = Ticket::new(new_ticket(branch.id, "قديم"), reporter, Priority::Critical);
        old.created_at = Utc::now() - chrono::Duration::days(10);
        repo.create_ticket(&old).await.unwrap();
        let mut done = Ticket::new(new_ticket(branch.id, "منتهي"), reporter, Priority::Low);
        done.status = TicketStatus::Closed;
        repo.create_ticket(&done).await.unwrap();

        let recent = repo
            .list_tickets_since(Utc::now() - chrono::Duration::days(7))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, done.id);

        let active = repo.list_active_tickets().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, old.id);
    }
}
