/// Group task endpoints
///
/// # Endpoints
///
/// - `POST   /api/group-tasks` - Create a group task (admin)
/// - `GET    /api/group-tasks/{group_id}` - List a group's tasks
/// - `PUT    /api/group-tasks/{group_task_id}` - Update a task (admin)
/// - `DELETE /api/group-tasks/{group_task_id}` - Soft-delete a task (admin)
/// - `PATCH  /api/group-tasks/{group_task_id}/status` - Update status (assignee)
///
/// Listing splits by role: admins see every task in the group (optionally
/// filtered by member), members see only the tasks assigned to them. The
/// status endpoint is the single mutation open to non-admins, and only for
/// the task's assignee.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::policy::{authorize, GroupAction},
    models::{
        group_task::{CreateGroupTask, GroupTask, UpdateGroupTask},
        membership::{GroupRole, Membership},
    },
};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
};

/// Create group task request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupTaskRequest {
    /// Group the task belongs to
    pub group_id: Uuid,

    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    /// Task description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Member responsible for the task
    pub assigned_to: Uuid,
}

/// Admin update request for a group task
///
/// The task's group must be named explicitly so the role check has its
/// scope; status is not updatable here.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupTaskRequest {
    /// Group the task belongs to
    pub group_id: Uuid,

    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Admin delete request for a group task
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteGroupTaskRequest {
    /// Group the task belongs to
    pub group_id: Uuid,
}

/// Assignee status update request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New completion flag
    pub status: bool,
}

/// Assignee filter for the admin listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct GroupTaskListQuery {
    /// Return only tasks assigned to this member (admins only)
    pub member_id: Option<Uuid>,
}

/// Group task representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupTaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Group the task belongs to
    pub group_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Due date
    pub due_date: Option<DateTime<Utc>>,

    /// Member responsible for the task
    pub assigned_to: Uuid,

    /// Admin who created the task
    pub created_by: Uuid,

    /// Completion flag
    pub status: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<GroupTask> for GroupTaskResponse {
    fn from(task: GroupTask) -> Self {
        Self {
            id: task.id,
            group_id: task.group_id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            assigned_to: task.assigned_to,
            created_by: task.created_by,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Create a group task (admin only)
///
/// The assignee must be an active member of the group.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or the assignee is not a member
/// - `403 Forbidden`: caller is not an admin of the group
#[utoipa::path(
    post,
    path = "/api/group-tasks",
    tag = "group-tasks",
    request_body = CreateGroupTaskRequest,
    responses(
        (status = 201, description = "Group task created", body = GroupTaskResponse),
        (status = 400, description = "Validation failed or assignee not a member"),
        (status = 403, description = "Not an admin of this group")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_group_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateGroupTaskRequest>,
) -> ApiResult<(StatusCode, Json<GroupTaskResponse>)> {
    req.validate()?;

    authorize(&state.db, GroupAction::CreateGroupTask, req.group_id, user.id).await?;

    // Membership check and insert are separate statements; the race with a
    // concurrent removal is accepted.
    let assignee_is_member =
        Membership::is_active_member(&state.db, req.group_id, req.assigned_to).await?;
    if !assignee_is_member {
        return Err(ApiError::BadRequest(
            "Assigned user is not a member of this group".to_string(),
        ));
    }

    let task = GroupTask::create(
        &state.db,
        CreateGroupTask {
            group_id: req.group_id,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            created_by: user.id,
        },
    )
    .await?;

    tracing::info!(admin_id = %user.id, group_id = %req.group_id, task_id = %task.id, "Group task created");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// List a group's tasks
///
/// Admins see every task in the group and may filter with `?member_id=`.
/// Members see only the tasks assigned to them; their `member_id` filter is
/// ignored.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not a member of the group
#[utoipa::path(
    get,
    path = "/api/group-tasks/{group_id}",
    tag = "group-tasks",
    params(
        ("group_id" = Uuid, Path, description = "Group ID"),
        GroupTaskListQuery
    ),
    responses(
        (status = 200, description = "The group's tasks", body = [GroupTaskResponse]),
        (status = 403, description = "Not a member of this group")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_group_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<GroupTaskListQuery>,
) -> ApiResult<Json<Vec<GroupTaskResponse>>> {
    let role = authorize(&state.db, GroupAction::ListGroupTasks, group_id, user.id).await?;

    let assigned_to = match role {
        GroupRole::Admin => query.member_id,
        GroupRole::Member => Some(user.id),
    };

    let tasks = GroupTask::list_for_group(&state.db, group_id, assigned_to).await?;

    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}

/// Update a group task's title, description, or due date (admin only)
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or empty update
/// - `403 Forbidden`: caller is not an admin of the group
/// - `404 Not Found`: no such task in the group
#[utoipa::path(
    put,
    path = "/api/group-tasks/{group_task_id}",
    tag = "group-tasks",
    params(("group_task_id" = Uuid, Path, description = "Group task ID")),
    request_body = UpdateGroupTaskRequest,
    responses(
        (status = 200, description = "Updated group task", body = GroupTaskResponse),
        (status = 400, description = "Validation failed or empty update"),
        (status = 403, description = "Not an admin of this group"),
        (status = 404, description = "Group task not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_group_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_task_id): Path<Uuid>,
    Json(req): Json<UpdateGroupTaskRequest>,
) -> ApiResult<Json<GroupTaskResponse>> {
    req.validate()?;

    authorize(&state.db, GroupAction::UpdateGroupTask, req.group_id, user.id).await?;

    let update = UpdateGroupTask {
        title: req.title,
        description: req.description,
        due_date: req.due_date,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest("No valid fields to update".to_string()));
    }

    let task = GroupTask::update(&state.db, group_task_id, req.group_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group task not found".to_string()))?;

    tracing::info!(admin_id = %user.id, task_id = %task.id, "Group task updated");

    Ok(Json(task.into()))
}

/// Soft-delete a group task (admin only)
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin of the group
/// - `404 Not Found`: no such task in the group
#[utoipa::path(
    delete,
    path = "/api/group-tasks/{group_task_id}",
    tag = "group-tasks",
    params(("group_task_id" = Uuid, Path, description = "Group task ID")),
    request_body = DeleteGroupTaskRequest,
    responses(
        (status = 200, description = "Deleted group task", body = GroupTaskResponse),
        (status = 403, description = "Not an admin of this group"),
        (status = 404, description = "Group task not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_group_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_task_id): Path<Uuid>,
    Json(req): Json<DeleteGroupTaskRequest>,
) -> ApiResult<Json<GroupTaskResponse>> {
    authorize(&state.db, GroupAction::DeleteGroupTask, req.group_id, user.id).await?;

    let task = GroupTask::soft_delete(&state.db, group_task_id, req.group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group task not found".to_string()))?;

    tracing::info!(admin_id = %user.id, task_id = %task.id, "Group task deleted");

    Ok(Json(task.into()))
}

/// Update a group task's completion status (assignee only)
///
/// The membership check uses the task's own group; the update itself only
/// matches if the caller is the assignee, so anyone else gets a 404 even if
/// they are an admin.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not a member of the task's group
/// - `404 Not Found`: no such task, or the caller is not its assignee
#[utoipa::path(
    patch,
    path = "/api/group-tasks/{group_task_id}/status",
    tag = "group-tasks",
    params(("group_task_id" = Uuid, Path, description = "Group task ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated group task", body = GroupTaskResponse),
        (status = 403, description = "Not a member of this group"),
        (status = 404, description = "Group task not found or not assigned to caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_group_task_status(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_task_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<GroupTaskResponse>> {
    let existing = GroupTask::find_active(&state.db, group_task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group task not found".to_string()))?;

    authorize(
        &state.db,
        GroupAction::UpdateGroupTaskStatus,
        existing.group_id,
        user.id,
    )
    .await?;

    let task = GroupTask::update_status(&state.db, group_task_id, user.id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group task not found".to_string()))?;

    tracing::info!(user_id = %user.id, task_id = %task.id, status = task.status, "Group task status updated");

    Ok(Json(task.into()))
}
