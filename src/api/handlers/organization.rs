//! Sectors, areas, brands and branches.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::extract::Caller;
use crate::api::types::{
    AreasQuery, BranchListResponse, BranchesQuery, CreateAreaRequest, NamedRequest,
};
use crate::domain::{Action, Area, Branch, BranchUpdate, Brand, NewBranch, Resource, Sector};
use crate::error::{DeskError, DeskResult};
use crate::AppState;

fn required_name(name: &str) -> DeskResult<()> {
    if name.trim().is_empty() {
        return Err(DeskError::BadRequest("Name cannot be empty".to_string()));
    }
    Ok(())
}

// ==================== Sectors ====================

#[utoipa::path(
    get,
    path = "/v1/sectors",
    responses((status = 200, description = "Sectors", body = Vec<Sector>)),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn list_sectors(
    State(state): State<AppState>,
    caller: Caller,
) -> DeskResult<Json<Vec<Sector>>> {
    caller.require(&state, Action::View, Resource::Organization).await?;
    Ok(Json(state.repository.list_sectors().await?))
}

#[utoipa::path(
    post,
    path = "/v1/sectors",
    request_body = NamedRequest,
    responses(
        (status = 201, description = "Sector created", body = Sector),
        (status = 409, description = "Name already used")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn create_sector(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<NamedRequest>,
) -> DeskResult<(StatusCode, Json<Sector>)> {
    caller.require(&state, Action::Create, Resource::Organization).await?;
    required_name(&request.name)?;

    let sector = Sector::new(request.name);
    state.repository.create_sector(&sector).await?;
    tracing::info!(sector_id = %sector.id, name = %sector.name, "Sector created");
    Ok((StatusCode::CREATED, Json(sector)))
}

#[utoipa::path(
    delete,
    path = "/v1/sectors/{id}",
    params(("id" = Uuid, Path, description = "Sector ID")),
    responses(
        (status = 204, description = "Sector deleted"),
        (status = 404, description = "Sector not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn delete_sector(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<StatusCode> {
    caller.require(&state, Action::Delete, Resource::Organization).await?;
    state.repository.delete_sector(id).await?;
    tracing::info!(sector_id = %id, "Sector deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Areas ====================

#[utoipa::path(
    get,
    path = "/v1/areas",
    params(AreasQuery),
    responses((status = 200, description = "Areas", body = Vec<Area>)),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn list_areas(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<AreasQuery>,
) -> DeskResult<Json<Vec<Area>>> {
    caller.require(&state, Action::View, Resource::Organization).await?;
    Ok(Json(state.repository.list_areas(query.sector_id).await?))
}

#[utoipa::path(
    post,
    path = "/v1/areas",
    request_body = CreateAreaRequest,
    responses(
        (status = 201, description = "Area created", body = Area),
        (status = 400, description = "Unknown sector")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn create_area(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateAreaRequest>,
) -> DeskResult<(StatusCode, Json<Area>)> {
    caller.require(&state, Action::Create, Resource::Organization).await?;
    required_name(&request.name)?;

    let area = Area::new(request.name, request.sector_id);
    state.repository.create_area(&area).await.map_err(|e| match e {
        DeskError::Conflict(_) => DeskError::BadRequest("Unknown sector".to_string()),
        other => other,
    })?;
    tracing::info!(area_id = %area.id, name = %area.name, "Area created");
    Ok((StatusCode::CREATED, Json(area)))
}

#[utoipa::path(
    delete,
    path = "/v1/areas/{id}",
    params(("id" = Uuid, Path, description = "Area ID")),
    responses(
        (status = 204, description = "Area deleted"),
        (status = 404, description = "Area not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn delete_area(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<StatusCode> {
    caller.require(&state, Action::Delete, Resource::Organization).await?;
    state.repository.delete_area(id).await?;
    tracing::info!(area_id = %id, "Area deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Brands ====================

#[utoipa::path(
    get,
    path = "/v1/brands",
    responses((status = 200, description = "Brands", body = Vec<Brand>)),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn list_brands(
    State(state): State<AppState>,
    caller: Caller,
) -> DeskResult<Json<Vec<Brand>>> {
    caller.require(&state, Action::View, Resource::Organization).await?;
    Ok(Json(state.repository.list_brands().await?))
}

#[utoipa::path(
    post,
    path = "/v1/brands",
    request_body = NamedRequest,
    responses(
        (status = 201, description = "Brand created", body = Brand),
        (status = 409, description = "Name already used")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<NamedRequest>,
) -> DeskResult<(StatusCode, Json<Brand>)> {
    caller.require(&state, Action::Create, Resource::Organization).await?;
    required_name(&request.name)?;

    let brand = Brand::new(request.name);
    state.repository.create_brand(&brand).await?;
    tracing::info!(brand_id = %brand.id, name = %brand.name, "Brand created");
    Ok((StatusCode::CREATED, Json(brand)))
}

#[utoipa::path(
    delete,
    path = "/v1/brands/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 204, description = "Brand deleted"),
        (status = 404, description = "Brand not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<StatusCode> {
    caller.require(&state, Action::Delete, Resource::Organization).await?;
    state.repository.delete_brand(id).await?;
    tracing::info!(brand_id = %id, "Brand deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Branches ====================

/// List branches.
///
/// GET /v1/branches
#[utoipa::path(
    get,
    path = "/v1/branches",
    params(BranchesQuery),
    responses((status = 200, description = "Branches by name", body = BranchListResponse)),
    security(("bearer_auth" = [])),
    tag = "branches"
)]
pub async fn list_branches(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<BranchesQuery>,
) -> DeskResult<Json<BranchListResponse>> {
    caller.require(&state, Action::View, Resource::Branches).await?;
    let branches = state
        .repository
        .list_branches(query.area_id, query.brand_id)
        .await?;
    Ok(Json(BranchListResponse { branches }))
}

/// Create a branch.
///
/// POST /v1/branches
#[utoipa::path(
    post,
    path = "/v1/branches",
    request_body = NewBranch,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 400, description = "Invalid branch")
    ),
    security(("bearer_auth" = [])),
    tag = "branches"
)]
pub async fn create_branch(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<NewBranch>,
) -> DeskResult<(StatusCode, Json<Branch>)> {
    caller.require(&state, Action::Create, Resource::Branches).await?;
    required_name(&request.name)?;

    let branch = Branch::new(request);
    state.repository.create_branch(&branch).await?;
    tracing::info!(branch_id = %branch.id, name = %branch.name, "Branch created");
    Ok((StatusCode::CREATED, Json(branch)))
}

/// GET /v1/branches/{id}
#[utoipa::path(
    get,
    path = "/v1/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    responses(
        (status = 200, description = "Branch", body = Branch),
        (status = 404, description = "Branch not found")
    ),
    security(("bearer_auth" = [])),
    tag = "branches"
)]
pub async fn get_branch(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<Json<Branch>> {
    caller.require(&state, Action::View, Resource::Branches).await?;
    Ok(Json(state.repository.get_branch(id).await?))
}

/// PUT /v1/branches/{id}
#[utoipa::path(
    put,
    path = "/v1/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    request_body = BranchUpdate,
    responses(
        (status = 200, description = "Branch updated", body = Branch),
        (status = 404, description = "Branch not found")
    ),
    security(("bearer_auth" = [])),
    tag = "branches"
)]
pub async fn update_branch(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<BranchUpdate>,
) -> DeskResult<Json<Branch>> {
    caller.require(&state, Action::Edit, Resource::Branches).await?;
    if let Some(name) = &request.name {
        required_name(name)?;
    }

    let mut branch = state.repository.get_branch(id).await?;
    request.apply(&mut branch);
    state.repository.save_branch(&branch).await?;
    tracing::info!(branch_id = %branch.id, "Branch updated");
    Ok(Json(branch))
}

/// Delete a branch and its assets. Branches with tickets are kept (409).
///
/// DELETE /v1/branches/{id}
#[utoipa::path(
    delete,
    path = "/v1/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    responses(
        (status = 204, description = "Branch deleted"),
        (status = 404, description = "Branch not found"),
        (status = 409, description = "Branch still has tickets")
    ),
    security(("bearer_auth" = [])),
    tag = "branches"
)]
pub async fn delete_branch(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<StatusCode> {
    caller.require(&state, Action::Delete, Resource::Branches).await?;
    state.repository.delete_branch(id).await?;
    tracing::info!(branch_id = %id, actor_id = %caller.profile().id, "Branch deleted");
    Ok(StatusCode::NO_CONTENT)
}
