//! Ticket lifecycle endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::extract::Caller;
use crate::api::types::{
    AddTicketPartRequest, AssignTicketRequest, ChangeStatusRequest, TicketListResponse,
    TicketPartsResponse, TicketsQuery,
};
use crate::domain::{
    Action, Branch, NewTicket, Priority, Resource, Role, Ticket, TicketFilter, TicketPart,
    TicketStatus, TicketUpdate,
};
use crate::error::{DeskError, DeskResult};
use crate::AppState;

/// Load a ticket the caller is allowed to see. Out-of-scope tickets look
/// missing rather than forbidden.
async fn visible_ticket(state: &AppState, caller: &Caller, id: Uuid) -> DeskResult<Ticket> {
    let ticket = state.repository.get_ticket(id).await?;
    if !caller.can_see(&ticket) {
        return Err(DeskError::NotFound(format!("Ticket {} not found", id)));
    }
    Ok(ticket)
}

/// Branch name for notification text; blank when the lookup fails.
async fn branch_name(state: &AppState, id: Uuid) -> String {
    name_or_blank(id, state.repository.get_branch(id).await)
}

fn name_or_blank(id: Uuid, result: DeskResult<Branch>) -> String {
    match result {
        Ok(branch) => branch.name,
        Err(e) => {
            tracing::warn!(branch_id = %id, error = %e, "Failed to load branch for notification");
            String::new()
        }
    }
}

async fn check_asset(state: &AppState, asset_id: Uuid, branch_id: Uuid) -> DeskResult<()> {
    let asset = match state.repository.get_asset(asset_id).await {
        Ok(asset) => asset,
        Err(DeskError::NotFound(msg)) => return Err(DeskError::BadRequest(msg)),
        Err(e) => return Err(e),
    };
    if asset.branch_id != branch_id {
        return Err(DeskError::BadRequest(format!(
            "Asset {} does not belong to branch {}",
            asset_id, branch_id
        )));
    }
    Ok(())
}

/// Fields the ticket form marks as required must be present.
async fn check_required_fields(state: &AppState, input: &NewTicket) -> DeskResult<()> {
    let configs = state.repository.list_form_fields(Some("ticket")).await?;
    for config in configs.iter().filter(|c| c.required) {
        let present = match config.field.as_str() {
            "description" => input
                .description
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty()),
            "asset_id" => input.asset_id.is_some(),
            "category" => input
                .category
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty()),
            "priority" => input.priority.is_some(),
            _ => true,
        };
        if !present {
            return Err(DeskError::BadRequest(format!(
                "Field '{}' is required",
                config.label.as_deref().unwrap_or(&config.field)
            )));
        }
    }
    Ok(())
}

/// List tickets.
///
/// GET /v1/tickets
#[utoipa::path(
    get,
    path = "/v1/tickets",
    params(TicketsQuery),
    responses(
        (status = 200, description = "Tickets, newest first", body = TicketListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 403, description = "Missing tickets:view")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<TicketsQuery>,
) -> DeskResult<Json<TicketListResponse>> {
    caller.require(&state, Action::View, Resource::Tickets).await?;

    let status = query
        .status
        .as_deref()
        .map(str::parse::<TicketStatus>)
        .transpose()
        .map_err(DeskError::BadRequest)?;
    let priority = query
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()
        .map_err(DeskError::BadRequest)?;

    let filter = TicketFilter {
        status,
        priority,
        branch_id: query.branch_id,
        assigned_to: query.assigned_to,
        involving: caller.row_scope(),
        limit: query.limit,
        offset: query.offset,
    };
    let tickets = state.repository.list_tickets(&filter).await?;

    Ok(Json(TicketListResponse {
        tickets,
        limit: query.limit,
        offset: query.offset,
    }))
}

/// File a new ticket. It always starts `open`.
///
/// POST /v1/tickets
#[utoipa::path(
    post,
    path = "/v1/tickets",
    request_body = NewTicket,
    responses(
        (status = 201, description = "Ticket created", body = Ticket),
        (status = 400, description = "Invalid ticket"),
        (status = 403, description = "Missing tickets:create")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<NewTicket>,
) -> DeskResult<(StatusCode, Json<Ticket>)> {
    caller.require(&state, Action::Create, Resource::Tickets).await?;

    if request.title.trim().is_empty() {
        return Err(DeskError::BadRequest("Title cannot be empty".to_string()));
    }
    let branch = match state.repository.get_branch(request.branch_id).await {
        Ok(branch) => branch,
        Err(DeskError::NotFound(msg)) => return Err(DeskError::BadRequest(msg)),
        Err(e) => return Err(e),
    };
    if let Some(asset_id) = request.asset_id {
        check_asset(&state, asset_id, branch.id).await?;
    }
    check_required_fields(&state, &request).await?;

    let settings = state.repository.get_settings().await?;
    let ticket = Ticket::new(request, caller.profile().id, settings.default_priority);
    let ticket = state.repository.create_ticket(&ticket).await?;

    tracing::info!(
        ticket_id = %ticket.id,
        ticket_number = ticket.ticket_number,
        branch_id = %ticket.branch_id,
        reported_by = %ticket.reported_by,
        "Ticket created"
    );

    state.notifier.ticket_created(&ticket, &branch.name).await;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Get a ticket.
///
/// GET /v1/tickets/{id}
#[utoipa::path(
    get,
    path = "/v1/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket", body = Ticket),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<Json<Ticket>> {
    caller.require(&state, Action::View, Resource::Tickets).await?;
    Ok(Json(visible_ticket(&state, &caller, id).await?))
}

/// Edit a ticket's descriptive fields.
///
/// PUT /v1/tickets/{id}
#[utoipa::path(
    put,
    path = "/v1/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = TicketUpdate,
    responses(
        (status = 200, description = "Ticket updated", body = Ticket),
        (status = 400, description = "Invalid update or ticket is closed"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn update_ticket(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<TicketUpdate>,
) -> DeskResult<Json<Ticket>> {
    caller.require(&state, Action::Edit, Resource::Tickets).await?;
    let mut ticket = visible_ticket(&state, &caller, id).await?;

    if ticket.status.is_terminal() {
        return Err(DeskError::BadRequest(format!(
            "Ticket #{} is {} and can no longer be edited",
            ticket.ticket_number, ticket.status
        )));
    }
    if request.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(DeskError::BadRequest("Title cannot be empty".to_string()));
    }
    if let Some(asset_id) = request.asset_id {
        check_asset(&state, asset_id, ticket.branch_id).await?;
    }

    request.apply(&mut ticket);
    state.repository.save_ticket(&ticket).await?;

    tracing::info!(ticket_id = %ticket.id, actor_id = %caller.profile().id, "Ticket updated");
    Ok(Json(ticket))
}

/// Delete a ticket.
///
/// DELETE /v1/tickets/{id}
#[utoipa::path(
    delete,
    path = "/v1/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 403, description = "Missing tickets:delete"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn delete_ticket(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<StatusCode> {
    caller.require(&state, Action::Delete, Resource::Tickets).await?;
    visible_ticket(&state, &caller, id).await?;
    state.repository.delete_ticket(id).await?;

    tracing::info!(ticket_id = %id, actor_id = %caller.profile().id, "Ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Assign or unassign a ticket.
///
/// Technicians may take an unassigned ticket themselves when the settings
/// allow it; otherwise tickets:assign is needed.
///
/// POST /v1/tickets/{id}/assign
#[utoipa::path(
    post,
    path = "/v1/tickets/{id}/assign",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = AssignTicketRequest,
    responses(
        (status = 200, description = "Ticket assigned", body = Ticket),
        (status = 400, description = "Assignee missing or inactive"),
        (status = 403, description = "Not allowed to assign"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn assign_ticket(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignTicketRequest>,
) -> DeskResult<Json<Ticket>> {
    let me = caller.profile().id;
    let mut ticket = state.repository.get_ticket(id).await?;

    let self_assign = caller.role() == Role::Technician
        && request.assigned_to == Some(me)
        && ticket.assigned_to.is_none()
        && state.repository.get_settings().await?.allow_technician_self_assign;
    if !self_assign {
        caller.require(&state, Action::Assign, Resource::Tickets).await?;
        if !caller.can_see(&ticket) {
            return Err(DeskError::NotFound(format!("Ticket {} not found", id)));
        }
    }

    if ticket.status.is_terminal() {
        return Err(DeskError::BadRequest(format!(
            "Ticket #{} is {} and cannot be reassigned",
            ticket.ticket_number, ticket.status
        )));
    }

    if let Some(assignee_id) = request.assigned_to {
        let assignee = match state.repository.get_profile(assignee_id).await {
            Ok(profile) => profile,
            Err(DeskError::NotFound(msg)) => return Err(DeskError::BadRequest(msg)),
            Err(e) => return Err(e),
        };
        if !assignee.is_active {
            return Err(DeskError::BadRequest(format!(
                "{} is deactivated",
                assignee.display_name()
            )));
        }
    }

    ticket.assigned_to = request.assigned_to;
    ticket.updated_at = chrono::Utc::now();
    state.repository.save_ticket(&ticket).await?;

    tracing::info!(
        ticket_id = %ticket.id,
        actor_id = %me,
        assigned_to = ?ticket.assigned_to,
        "Ticket assignment changed"
    );

    if ticket.assigned_to.is_some() {
        let branch = branch_name(&state, ticket.branch_id).await;
        state.notifier.ticket_assigned(&ticket, &branch).await;
    }

    Ok(Json(ticket))
}

/// Move a ticket through its lifecycle.
///
/// POST /v1/tickets/{id}/status
#[utoipa::path(
    post,
    path = "/v1/tickets/{id}/status",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Ticket),
        (status = 400, description = "Illegal transition"),
        (status = 403, description = "Not allowed to change status"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn change_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> DeskResult<Json<Ticket>> {
    caller.require(&state, Action::Edit, Resource::Tickets).await?;
    if request.status.requires_close_permission() {
        caller.require(&state, Action::Close, Resource::Tickets).await?;
    }

    let mut ticket = visible_ticket(&state, &caller, id).await?;
    let me = caller.profile().id;
    if caller.role() == Role::Technician && ticket.assigned_to != Some(me) {
        return Err(DeskError::Forbidden(
            "Only the assigned technician can change this ticket's status".to_string(),
        ));
    }

    let previous = ticket.status;
    ticket
        .transition(request.status, request.notes)
        .map_err(DeskError::BadRequest)?;
    state.repository.save_ticket(&ticket).await?;

    tracing::info!(
        ticket_id = %ticket.id,
        actor_id = %me,
        from = %previous,
        to = %ticket.status,
        "Ticket status changed"
    );

    let branch = branch_name(&state, ticket.branch_id).await;
    state
        .notifier
        .ticket_status_changed(&ticket, &branch, me)
        .await;

    Ok(Json(ticket))
}

/// Spare parts used on a ticket.
///
/// GET /v1/tickets/{id}/parts
#[utoipa::path(
    get,
    path = "/v1/tickets/{id}/parts",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Parts used", body = TicketPartsResponse),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn list_ticket_parts(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<Json<TicketPartsResponse>> {
    caller.require(&state, Action::View, Resource::Tickets).await?;
    visible_ticket(&state, &caller, id).await?;
    let parts = state.repository.list_ticket_parts(id).await?;
    Ok(Json(TicketPartsResponse { parts }))
}

/// Record spare parts used on a ticket, drawing down stock.
///
/// POST /v1/tickets/{id}/parts
#[utoipa::path(
    post,
    path = "/v1/tickets/{id}/parts",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = AddTicketPartRequest,
    responses(
        (status = 201, description = "Part recorded", body = TicketPart),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 404, description = "Ticket or part not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn add_ticket_part(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<AddTicketPartRequest>,
) -> DeskResult<(StatusCode, Json<TicketPart>)> {
    caller.require(&state, Action::Edit, Resource::Tickets).await?;
    let ticket = visible_ticket(&state, &caller, id).await?;
    if ticket.status.is_terminal() {
        return Err(DeskError::BadRequest(format!(
            "Ticket #{} is {}",
            ticket.ticket_number, ticket.status
        )));
    }

    let part = TicketPart::new(ticket.id, request.spare_part_id, request.quantity);
    state.repository.add_ticket_part(&part).await?;

    tracing::info!(
        ticket_id = %ticket.id,
        spare_part_id = %part.spare_part_id,
        quantity = part.quantity,
        "Spare part consumed"
    );
    Ok((StatusCode::CREATED, Json(part)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBranch;

    #[test]
    fn test_branch_lookup_failure_gives_blank_name() {
        let branch = Branch::new(NewBranch {
            name: "فرع النخيل".into(),
            ..Default::default()
        });
        assert_eq!(name_or_blank(branch.id, Ok(branch.clone())), "فرع النخيل");

        let failed = Err(DeskError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(name_or_blank(branch.id, failed), "");
    }
}
