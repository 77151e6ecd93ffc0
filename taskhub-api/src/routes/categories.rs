/// Category endpoints
///
/// # Endpoints
///
/// - `POST   /api/categories` - Create a category
/// - `GET    /api/categories` - List the caller's categories
/// - `GET    /api/categories/{category_id}/tasks` - Tasks in a category
/// - `PUT    /api/categories/{category_id}` - Rename a category
/// - `DELETE /api/categories/{category_id}` - Delete a category and its tasks
///
/// Categories are strictly per-user; a category owned by someone else is
/// reported as 404. Deleting a category removes every task that references
/// it in the same transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_shared::models::{
    category::{Category, CreateCategory},
    task::Task,
};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
    routes::tasks::TaskResponse,
};

/// Create/rename category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    /// Category name
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
}

/// Category representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    /// Category ID
    pub id: Uuid,

    /// Category name
    pub name: String,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    req.validate()?;

    let category = Category::create(
        &state.db,
        CreateCategory {
            user_id: user.id,
            name: req.name,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, category_id = %category.id, "Category created");

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// List the caller's categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "The caller's categories", body = [CategoryResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = Category::list_by_user(&state.db, user.id).await?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// List the tasks in one of the caller's categories
///
/// # Errors
///
/// - `404 Not Found`: no such category owned by the caller
#[utoipa::path(
    get,
    path = "/api/categories/{category_id}/tasks",
    tag = "categories",
    params(("category_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Tasks in the category", body = [TaskResponse]),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_category_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    Category::find_owned(&state.db, category_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let tasks = Task::list_by_category(&state.db, category_id).await?;

    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}

/// Rename a category
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `404 Not Found`: no such category owned by the caller
#[utoipa::path(
    put,
    path = "/api/categories/{category_id}",
    tag = "categories",
    params(("category_id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(category_id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    req.validate()?;

    let category = Category::update_name(&state.db, category_id, user.id, req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    tracing::info!(user_id = %user.id, category_id = %category.id, "Category updated");

    Ok(Json(category.into()))
}

/// Delete a category and all tasks referencing it
///
/// The category and its tasks are removed together in one transaction.
///
/// # Errors
///
/// - `404 Not Found`: no such category owned by the caller
#[utoipa::path(
    delete,
    path = "/api/categories/{category_id}",
    tag = "categories",
    params(("category_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted category", body = CategoryResponse),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = Category::delete_with_tasks(&state.db, category_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    tracing::info!(user_id = %user.id, category_id = %category.id, "Category deleted with its tasks");

    Ok(Json(category.into()))
}
