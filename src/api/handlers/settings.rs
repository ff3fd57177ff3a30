//! System settings, the permission matrix, notification templates and form
//! field configuration.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api::extract::Caller;
use crate::api::types::{
    FormFieldsQuery, PermissionsResponse, UpdatePermissionsRequest, UpdateTemplateRequest,
};
use crate::domain::{
    Action, FormFieldConfig, NotificationTemplate, Resource, SettingsUpdate, SystemSettings,
    TICKET_CONFIGURABLE_FIELDS,
};
use crate::error::{DeskError, DeskResult};
use crate::AppState;

/// GET /v1/settings
#[utoipa::path(
    get,
    path = "/v1/settings",
    responses((status = 200, description = "Current settings", body = SystemSettings)),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    caller: Caller,
) -> DeskResult<Json<SystemSettings>> {
    caller.require(&state, Action::View, Resource::Settings).await?;
    Ok(Json(state.repository.get_settings().await?))
}

/// PUT /v1/settings
#[utoipa::path(
    put,
    path = "/v1/settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Settings updated", body = SystemSettings),
        (status = 400, description = "Invalid settings")
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<SettingsUpdate>,
) -> DeskResult<Json<SystemSettings>> {
    caller.require(&state, Action::Edit, Resource::Settings).await?;
    request.validate().map_err(DeskError::BadRequest)?;

    let mut settings = state.repository.get_settings().await?;
    request.apply(&mut settings);
    state.repository.save_settings(&settings).await?;

    tracing::info!(actor_id = %caller.profile().id, "System settings updated");
    Ok(Json(settings))
}

/// The permission matrix: effective values and stored overrides.
///
/// GET /v1/settings/permissions
#[utoipa::path(
    get,
    path = "/v1/settings/permissions",
    responses((status = 200, description = "Permission matrix", body = PermissionsResponse)),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn get_permissions(
    State(state): State<AppState>,
    caller: Caller,
) -> DeskResult<Json<PermissionsResponse>> {
    caller.require(&state, Action::View, Resource::Settings).await?;
    let overrides = state.repository.load_permission_overrides().await?;
    Ok(Json(PermissionsResponse {
        effective: state.permissions.snapshot().await,
        overrides,
    }))
}

/// Replace every stored override and reload the in-memory matrix.
///
/// PUT /v1/settings/permissions
#[utoipa::path(
    put,
    path = "/v1/settings/permissions",
    request_body = UpdatePermissionsRequest,
    responses(
        (status = 200, description = "Permissions replaced", body = PermissionsResponse),
        (status = 403, description = "Missing settings:edit")
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn update_permissions(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<UpdatePermissionsRequest>,
) -> DeskResult<Json<PermissionsResponse>> {
    caller.require(&state, Action::Edit, Resource::Settings).await?;
    state.permissions.replace_overrides(&request.overrides).await?;

    tracing::info!(
        actor_id = %caller.profile().id,
        roles = request.overrides.len(),
        "Permission overrides replaced"
    );

    let overrides = state.repository.load_permission_overrides().await?;
    Ok(Json(PermissionsResponse {
        effective: state.permissions.snapshot().await,
        overrides,
    }))
}

/// GET /v1/notification-templates
#[utoipa::path(
    get,
    path = "/v1/notification-templates",
    responses((status = 200, description = "Templates", body = Vec<NotificationTemplate>)),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn list_templates(
    State(state): State<AppState>,
    caller: Caller,
) -> DeskResult<Json<Vec<NotificationTemplate>>> {
    caller.require(&state, Action::View, Resource::Settings).await?;
    Ok(Json(state.repository.list_templates().await?))
}

/// Edit a template. Only the seeded event keys exist.
///
/// PUT /v1/notification-templates/{key}
#[utoipa::path(
    put,
    path = "/v1/notification-templates/{key}",
    params(("key" = String, Path, description = "Template key")),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = NotificationTemplate),
        (status = 400, description = "Empty title or body"),
        (status = 404, description = "Unknown template")
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn update_template(
    State(state): State<AppState>,
    caller: Caller,
    Path(key): Path<String>,
    Json(request): Json<UpdateTemplateRequest>,
) -> DeskResult<Json<NotificationTemplate>> {
    caller.require(&state, Action::Edit, Resource::Settings).await?;
    if request.title.trim().is_empty() || request.body.trim().is_empty() {
        return Err(DeskError::BadRequest(
            "Template title and body cannot be empty".to_string(),
        ));
    }

    let existing = state
        .repository
        .find_template(&key)
        .await?
        .ok_or_else(|| DeskError::NotFound(format!("Template '{}' not found", key)))?;

    let template = NotificationTemplate::new(&existing.key, &request.title, &request.body);
    state.repository.upsert_template(&template).await?;

    tracing::info!(key = %template.key, actor_id = %caller.profile().id, "Notification template updated");
    Ok(Json(template))
}

/// GET /v1/form-fields
#[utoipa::path(
    get,
    path = "/v1/form-fields",
    params(FormFieldsQuery),
    responses((status = 200, description = "Field configs", body = Vec<FormFieldConfig>)),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn list_form_fields(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<FormFieldsQuery>,
) -> DeskResult<Json<Vec<FormFieldConfig>>> {
    caller.require(&state, Action::View, Resource::Settings).await?;
    let fields = state.repository.list_form_fields(query.form.as_deref()).await?;
    Ok(Json(fields))
}

/// PUT /v1/form-fields
#[utoipa::path(
    put,
    path = "/v1/form-fields",
    request_body = FormFieldConfig,
    responses(
        (status = 200, description = "Field config saved", body = FormFieldConfig),
        (status = 400, description = "Unknown field or hidden required field")
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn upsert_form_field(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<FormFieldConfig>,
) -> DeskResult<Json<FormFieldConfig>> {
    caller.require(&state, Action::Edit, Resource::Settings).await?;

    if request.form.trim().is_empty() || request.field.trim().is_empty() {
        return Err(DeskError::BadRequest("Form and field are required".to_string()));
    }
    if request.form == "ticket" && !TICKET_CONFIGURABLE_FIELDS.contains(&request.field.as_str()) {
        return Err(DeskError::BadRequest(format!(
            "Field '{}' is not configurable on the ticket form. Use one of: {}",
            request.field,
            TICKET_CONFIGURABLE_FIELDS.join(", ")
        )));
    }
    if request.required && !request.visible {
        return Err(DeskError::BadRequest(
            "A required field must be visible".to_string(),
        ));
    }

    state.repository.upsert_form_field(&request).await?;
    tracing::info!(form = %request.form, field = %request.field, required = request.required, "Form field updated");
    Ok(Json(request))
}
