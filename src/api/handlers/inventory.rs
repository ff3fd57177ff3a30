//! Assets and spare-part stock.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::extract::Caller;
use crate::api::types::{
    AdjustStockRequest, AssetListResponse, AssetsQuery, SparePartListResponse, SparePartsQuery,
};
use crate::domain::{
    Action, Asset, AssetUpdate, NewAsset, NewSparePart, Resource, SparePart, SparePartUpdate,
};
use crate::error::{DeskError, DeskResult};
use crate::AppState;

// ==================== Assets ====================

/// GET /v1/assets
#[utoipa::path(
    get,
    path = "/v1/assets",
    params(AssetsQuery),
    responses((status = 200, description = "Assets", body = AssetListResponse)),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn list_assets(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<AssetsQuery>,
) -> DeskResult<Json<AssetListResponse>> {
    caller.require(&state, Action::View, Resource::Assets).await?;
    let assets = state.repository.list_assets(query.branch_id).await?;
    Ok(Json(AssetListResponse { assets }))
}

/// POST /v1/assets
#[utoipa::path(
    post,
    path = "/v1/assets",
    request_body = NewAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid asset or unknown branch")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn create_asset(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<NewAsset>,
) -> DeskResult<(StatusCode, Json<Asset>)> {
    caller.require(&state, Action::Create, Resource::Assets).await?;
    if request.name.trim().is_empty() {
        return Err(DeskError::BadRequest("Name cannot be empty".to_string()));
    }
    match state.repository.get_branch(request.branch_id).await {
        Ok(_) => {}
        Err(DeskError::NotFound(msg)) => return Err(DeskError::BadRequest(msg)),
        Err(e) => return Err(e),
    }

    let asset = Asset::new(request);
    state.repository.create_asset(&asset).await?;
    tracing::info!(asset_id = %asset.id, branch_id = %asset.branch_id, "Asset created");
    Ok((StatusCode::CREATED, Json(asset)))
}

/// PUT /v1/assets/{id}
#[utoipa::path(
    put,
    path = "/v1/assets/{id}",
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = AssetUpdate,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn update_asset(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<AssetUpdate>,
) -> DeskResult<Json<Asset>> {
    caller.require(&state, Action::Edit, Resource::Assets).await?;
    if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(DeskError::BadRequest("Name cannot be empty".to_string()));
    }

    let mut asset = state.repository.get_asset(id).await?;
    request.apply(&mut asset);
    state.repository.save_asset(&asset).await?;
    tracing::info!(asset_id = %asset.id, status = %asset.status, "Asset updated");
    Ok(Json(asset))
}

/// DELETE /v1/assets/{id}
#[utoipa::path(
    delete,
    path = "/v1/assets/{id}",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<StatusCode> {
    caller.require(&state, Action::Delete, Resource::Assets).await?;
    state.repository.delete_asset(id).await?;
    tracing::info!(asset_id = %id, "Asset deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Spare parts ====================

/// GET /v1/spare-parts
#[utoipa::path(
    get,
    path = "/v1/spare-parts",
    params(SparePartsQuery),
    responses((status = 200, description = "Spare parts", body = SparePartListResponse)),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn list_spare_parts(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<SparePartsQuery>,
) -> DeskResult<Json<SparePartListResponse>> {
    caller.require(&state, Action::View, Resource::SpareParts).await?;
    let spare_parts = state.repository.list_spare_parts(query.low_stock).await?;
    Ok(Json(SparePartListResponse { spare_parts }))
}

/// POST /v1/spare-parts
#[utoipa::path(
    post,
    path = "/v1/spare-parts",
    request_body = NewSparePart,
    responses(
        (status = 201, description = "Spare part created", body = SparePart),
        (status = 400, description = "Invalid spare part"),
        (status = 409, description = "Part number already used")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn create_spare_part(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<NewSparePart>,
) -> DeskResult<(StatusCode, Json<SparePart>)> {
    caller.require(&state, Action::Create, Resource::SpareParts).await?;
    if request.name.trim().is_empty() {
        return Err(DeskError::BadRequest("Name cannot be empty".to_string()));
    }
    if request.quantity < 0 || request.min_quantity < 0 || request.unit_cost < 0.0 {
        return Err(DeskError::BadRequest(
            "Quantities and cost cannot be negative".to_string(),
        ));
    }

    let part = SparePart::new(request);
    state.repository.create_spare_part(&part).await?;
    tracing::info!(spare_part_id = %part.id, quantity = part.quantity, "Spare part created");
    Ok((StatusCode::CREATED, Json(part)))
}

/// Edit a part's catalogue fields. Stock moves through the adjust endpoint.
///
/// PUT /v1/spare-parts/{id}
#[utoipa::path(
    put,
    path = "/v1/spare-parts/{id}",
    params(("id" = Uuid, Path, description = "Spare part ID")),
    request_body = SparePartUpdate,
    responses(
        (status = 200, description = "Spare part updated", body = SparePart),
        (status = 404, description = "Spare part not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn update_spare_part(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<SparePartUpdate>,
) -> DeskResult<Json<SparePart>> {
    caller.require(&state, Action::Edit, Resource::SpareParts).await?;
    if request.min_quantity.is_some_and(|m| m < 0) || request.unit_cost.is_some_and(|c| c < 0.0) {
        return Err(DeskError::BadRequest(
            "Quantities and cost cannot be negative".to_string(),
        ));
    }

    let mut part = state.repository.get_spare_part(id).await?;
    request.apply(&mut part);
    state.repository.save_spare_part(&part).await?;
    tracing::info!(spare_part_id = %part.id, "Spare part updated");
    Ok(Json(part))
}

/// Add or remove stock.
///
/// POST /v1/spare-parts/{id}/adjust
#[utoipa::path(
    post,
    path = "/v1/spare-parts/{id}/adjust",
    params(("id" = Uuid, Path, description = "Spare part ID")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = SparePart),
        (status = 400, description = "Stock would go negative"),
        (status = 404, description = "Spare part not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<AdjustStockRequest>,
) -> DeskResult<Json<SparePart>> {
    caller.require(&state, Action::Edit, Resource::SpareParts).await?;
    let part = state.repository.adjust_stock(id, request.delta).await?;

    tracing::info!(
        spare_part_id = %part.id,
        delta = request.delta,
        quantity = part.quantity,
        reason = request.reason.as_deref().unwrap_or(""),
        actor_id = %caller.profile().id,
        "Stock adjusted"
    );
    if part.is_low_stock() {
        tracing::warn!(spare_part_id = %part.id, quantity = part.quantity, "Spare part below minimum");
    }
    Ok(Json(part))
}
