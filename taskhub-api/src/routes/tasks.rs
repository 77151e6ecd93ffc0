/// Personal task endpoints
///
/// # Endpoints
///
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks` - List the caller's tasks (optional status filter)
/// - `PUT    /api/tasks/{task_id}` - Partially update a task
/// - `DELETE /api/tasks/{task_id}` - Soft-delete a task
///
/// All endpoints require authentication and operate only on the caller's
/// own tasks; a task owned by someone else is reported as 404.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_shared::models::{
    category::Category,
    task::{CreateTask, Task, UpdateTask},
};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
};

/// Create task request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    /// Task description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Completion flag (defaults to pending)
    #[serde(default)]
    pub status: bool,

    /// Optional category; must be owned by the caller
    pub category_id: Option<Uuid>,
}

/// Partial task update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,

    /// New completion flag
    pub status: Option<bool>,

    /// New category; must be owned by the caller
    pub category_id: Option<Uuid>,
}

/// Status filter for task listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct TaskListQuery {
    /// Return only tasks with this completion flag
    pub status: Option<bool>,
}

/// Task representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Due date
    pub due_date: Option<DateTime<Utc>>,

    /// Completion flag
    pub status: bool,

    /// Category, if any
    pub category_id: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            status: task.status,
            category_id: task.category_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Verifies that a category referenced by a task belongs to the caller
async fn check_category_owned(
    state: &AppState,
    category_id: Uuid,
    user_id: Uuid,
) -> ApiResult<()> {
    Category::find_owned(&state.db, category_id, user_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid category".to_string()))?;
    Ok(())
}

/// Create a personal task
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or the category does not exist
///   or belongs to another user
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Validation failed or invalid category")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;

    if let Some(category_id) = req.category_id {
        check_category_owned(&state, category_id, user.id).await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: user.id,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            status: req.status,
            category_id: req.category_id,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// List the caller's tasks
///
/// Soft-deleted tasks are never returned. Pass `?status=true` or
/// `?status=false` to filter by completion.
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "The caller's tasks", body = [TaskResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list_by_user(&state.db, user.id, query.status).await?;

    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}

/// Partially update a task
///
/// The request body is filtered against the allow-list {title, description,
/// due_date, status, category_id}; an update carrying none of those fields
/// is rejected rather than silently doing nothing.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, empty update, or invalid category
/// - `404 Not Found`: no such task owned by the caller
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = Uuid, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Validation failed or empty update"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    if let Some(category_id) = req.category_id {
        check_category_owned(&state, category_id, user.id).await?;
    }

    let update = UpdateTask {
        title: req.title,
        description: req.description,
        due_date: req.due_date,
        status: req.status,
        category_id: req.category_id,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest("No valid fields to update".to_string()));
    }

    let task = Task::update(&state.db, task_id, user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(user_id = %user.id, task_id = %task.id, "Task updated");

    Ok(Json(task.into()))
}

/// Soft-delete a task
///
/// The task disappears from all subsequent reads but stays in storage.
///
/// # Errors
///
/// - `404 Not Found`: no such task owned by the caller
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Deleted task", body = TaskResponse),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::soft_delete(&state.db, task_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(user_id = %user.id, task_id = %task.id, "Task deleted");

    Ok(Json(task.into()))
}
