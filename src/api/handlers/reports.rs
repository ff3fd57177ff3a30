//! Ticket analytics.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::api::extract::Caller;
use crate::api::types::ReportQuery;
use crate::domain::{Action, Resource, TicketReport, TimeRange};
use crate::error::{DeskError, DeskResult};
use crate::AppState;

/// Ticket counts by status, priority and branch over a time range.
///
/// GET /v1/reports/tickets
#[utoipa::path(
    get,
    path = "/v1/reports/tickets",
    params(ReportQuery),
    responses(
        (status = 200, description = "Ticket report", body = TicketReport),
        (status = 400, description = "Invalid range"),
        (status = 403, description = "Missing reports:view")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn ticket_report(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ReportQuery>,
) -> DeskResult<Json<TicketReport>> {
    caller.require(&state, Action::View, Resource::Reports).await?;

    let range: TimeRange = match query.range.as_deref() {
        Some(s) => s.parse().map_err(DeskError::BadRequest)?,
        None => TimeRange::default(),
    };

    let tickets = state.repository.list_tickets_since(range.start_time()).await?;
    let active = state.repository.list_active_tickets().await?;
    let branches = state.repository.list_branches(None, None).await?;
    let settings = state.repository.get_settings().await?;

    Ok(Json(TicketReport::build(
        range,
        &tickets,
        &active,
        &branches,
        &settings.sla_hours,
        Utc::now(),
    )))
}
