//! Health, sign-in and the caller's own profile.

use axum::{extract::State, Json};

use crate::api::extract::Caller;
use crate::api::types::{HealthResponse, LoginRequest, LoginResponse, MeResponse};
use crate::auth::verify_password;
use crate::error::{DeskError, DeskResult};
use crate::AppState;

/// Health check endpoint.
///
/// GET /v1/health
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_status = match sqlx::query("SELECT 1")
        .fetch_one(state.repository.pool())
        .await
    {
        Ok(_) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Sign in with email and password.
///
/// POST /v1/auth/login
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> DeskResult<Json<LoginResponse>> {
    let invalid = || {
        tracing::warn!(email = %request.email, "Failed login attempt");
        DeskError::Unauthorized("Invalid email or password".to_string())
    };

    let account = state
        .repository
        .get_account_by_email(&request.email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&request.password, &account.password_hash) {
        return Err(invalid());
    }

    let profile = state.sessions.resolve_id(account.id).await?;
    let token = state
        .jwt_manager
        .generate_token(profile.id, &profile.email, profile.role)?;

    tracing::info!(
        user_id = %profile.id,
        role = %profile.role,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token,
        profile,
        expires_in: state.jwt_manager.token_duration_hours() * 3600,
    }))
}

/// The caller's profile and effective permissions.
///
/// GET /v1/auth/me
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Account deactivated")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    caller: Caller,
) -> Json<MeResponse> {
    let permissions = state.permissions.effective(caller.role()).await;
    Json(MeResponse {
        profile: caller.0,
        permissions,
    })
}
