//! Privileged user administration.
//!
//! The three admin operations answer `{ "data": ... }` on success and
//! 400/403/404 on failure. A duplicate email is reported as 400 here.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::api::extract::Caller;
use crate::api::types::{AdminDeleteResponse, AdminUserResponse, DeletedUser, ProfilesQuery};
use crate::domain::{Action, NewUser, Profile, ProfileUpdate, Resource};
use crate::error::{DeskError, DeskResult};
use crate::AppState;

fn conflict_as_bad_request(err: DeskError) -> DeskError {
    match err {
        DeskError::Conflict(msg) => DeskError::BadRequest(msg),
        other => other,
    }
}

/// Create an account and its profile.
///
/// POST /v1/admin/users
#[utoipa::path(
    post,
    path = "/v1/admin/users",
    request_body = NewUser,
    responses(
        (status = 200, description = "User created", body = AdminUserResponse),
        (status = 400, description = "Invalid input or email taken"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<NewUser>,
) -> DeskResult<Json<AdminUserResponse>> {
    let profile = state
        .users
        .create_user(caller.profile(), request)
        .await
        .map_err(conflict_as_bad_request)?;

    Ok(Json(AdminUserResponse { data: profile }))
}

/// Update another user's profile, email or password.
///
/// PUT /v1/admin/users/{id}
#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "User updated", body = AdminUserResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ProfileUpdate>,
) -> DeskResult<Json<AdminUserResponse>> {
    let profile = state
        .users
        .update_user(caller.profile(), id, request)
        .await
        .map_err(conflict_as_bad_request)?;

    Ok(Json(AdminUserResponse { data: profile }))
}

/// Delete a user account.
///
/// DELETE /v1/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "User deleted", body = AdminDeleteResponse),
        (status = 400, description = "Cannot delete yourself or the last admin"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<Json<AdminDeleteResponse>> {
    state.users.delete_user(caller.profile(), id).await?;

    Ok(Json(AdminDeleteResponse {
        data: DeletedUser { id, deleted: true },
    }))
}

/// List profiles, optionally by role.
///
/// GET /v1/profiles
#[utoipa::path(
    get,
    path = "/v1/profiles",
    params(ProfilesQuery),
    responses(
        (status = 200, description = "Profiles", body = Vec<Profile>),
        (status = 403, description = "Missing users:view")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_profiles(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ProfilesQuery>,
) -> DeskResult<Json<Vec<Profile>>> {
    caller.require(&state, Action::View, Resource::Users).await?;
    let profiles = state.repository.list_profiles(query.role).await?;
    Ok(Json(profiles))
}
