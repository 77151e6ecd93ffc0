/// Notification endpoints
///
/// # Endpoints
///
/// - `GET /api/notifications` - List the caller's notifications, newest first
/// - `PUT /api/notifications/mark-as-read` - Mark all unread as read

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_shared::models::notification::Notification;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{app::AppState, error::ApiResult, middleware::auth::CurrentUser};

/// Notification representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    /// Notification ID
    pub id: Uuid,

    /// Message text
    pub message: String,

    /// Whether it has been read
    pub is_read: bool,

    /// When it was created
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            message: notification.message,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

/// Mark-as-read response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkReadResponse {
    /// How many notifications were marked
    pub marked: u64,

    /// Human-readable summary
    pub message: String,
}

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    responses(
        (status = 200, description = "The caller's notifications", body = [NotificationResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<NotificationResponse>>> {
    let notifications = Notification::list_by_user(&state.db, user.id).await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Mark all of the caller's unread notifications as read
#[utoipa::path(
    put,
    path = "/api/notifications/mark-as-read",
    tag = "notifications",
    responses(
        (status = 200, description = "Unread notifications marked", body = MarkReadResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_notifications_read(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<MarkReadResponse>> {
    let marked = Notification::mark_all_read(&state.db, user.id).await?;

    Ok(Json(MarkReadResponse {
        marked,
        message: format!("{} notifications marked as read", marked),
    }))
}
