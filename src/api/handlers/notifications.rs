//! The caller's in-app notifications.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::extract::Caller;
use crate::api::types::{NotificationView, NotificationsQuery};
use crate::error::DeskResult;
use crate::AppState;

/// Notifications addressed to the caller, newest first.
///
/// GET /v1/notifications
#[utoipa::path(
    get,
    path = "/v1/notifications",
    params(NotificationsQuery),
    responses((status = 200, description = "Notifications", body = Vec<NotificationView>)),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<NotificationsQuery>,
) -> DeskResult<Json<Vec<NotificationView>>> {
    let notifications = state
        .repository
        .list_notifications(caller.profile().id, query.unread_only)
        .await?;
    Ok(Json(notifications.into_iter().map(NotificationView::from).collect()))
}

/// POST /v1/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> DeskResult<StatusCode> {
    state
        .repository
        .mark_notification_read(id, caller.profile().id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
