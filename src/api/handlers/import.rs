//! Spreadsheet upload.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};

use crate::api::extract::Caller;
use crate::api::types::ImportQuery;
use crate::domain::{Action, Resource};
use crate::error::{DeskError, DeskResult};
use crate::import::{read_bytes, ImportKind, ImportReport};
use crate::AppState;

/// Import branches, assets or spare parts from a workbook sent as the raw
/// request body.
///
/// POST /v1/import/{kind}
#[utoipa::path(
    post,
    path = "/v1/import/{kind}",
    params(
        ("kind" = String, Path, description = "branches, assets or spare-parts"),
        ImportQuery
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, description = "Unreadable workbook or unknown kind"),
        (status = 403, description = "Missing import:create")
    ),
    security(("bearer_auth" = [])),
    tag = "import"
)]
pub async fn import_workbook(
    State(state): State<AppState>,
    caller: Caller,
    Path(kind): Path<String>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> DeskResult<Json<ImportReport>> {
    caller.require(&state, Action::Create, Resource::Import).await?;

    let kind: ImportKind = kind.parse().map_err(DeskError::BadRequest)?;
    if body.is_empty() {
        return Err(DeskError::BadRequest("Request body is empty".to_string()));
    }

    let rows = read_bytes(body.to_vec()).await?;
    let report = state.importer.run(kind, &rows, query.dry_run).await?;

    tracing::info!(
        kind = %kind,
        dry_run = query.dry_run,
        rows_read = report.rows_read,
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped.len(),
        actor_id = %caller.profile().id,
        "Workbook imported"
    );
    Ok(Json(report))
}
