/// Personal task model and database operations
///
/// Personal tasks belong to exactly one user and may optionally sit in one
/// of that user's categories. Tasks are soft-deleted; all normal reads
/// filter on `is_deleted = FALSE`. Ownership is enforced in the queries
/// themselves: every mutation is keyed on `(id, user_id)`, so a task owned
/// by somebody else behaves exactly like a missing task.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     due_date TIMESTAMPTZ,
///     status BOOLEAN NOT NULL DEFAULT FALSE,
///     category_id UUID REFERENCES categories(id) ON DELETE CASCADE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, user_id, title, description, due_date, status, category_id, \
                            is_deleted, created_at, updated_at";

/// Personal task owned by a single user
///
/// `status` is false while the task is pending and true once done.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Completion flag (false = pending, true = done)
    pub status: bool,

    /// Optional category; must belong to the same user
    pub category_id: Option<Uuid>,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new personal task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning user
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Completion flag (defaults to pending)
    pub status: bool,

    /// Optional category; the caller must verify ownership first
    pub category_id: Option<Uuid>,
}

/// Input for updating an existing personal task
///
/// This struct is the update allow-list: only these fields can ever be
/// written through a partial update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,

    /// New completion flag
    pub status: Option<bool>,

    /// New category; the caller must verify ownership first
    pub category_id: Option<Uuid>,
}

impl UpdateTask {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.category_id.is_none()
    }
}

impl Task {
    /// Creates a new personal task
    ///
    /// Category ownership is the caller's responsibility; see
    /// [`crate::models::category::Category::find_owned`].
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, status, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.status)
        .bind(data.category_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's non-deleted tasks, optionally filtered by status
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<bool>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = match status {
            Some(status) => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    SELECT {TASK_COLUMNS}
                    FROM tasks
                    WHERE user_id = $1 AND is_deleted = FALSE AND status = $2
                    ORDER BY created_at ASC
                    "#,
                ))
                .bind(user_id)
                .bind(status)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    SELECT {TASK_COLUMNS}
                    FROM tasks
                    WHERE user_id = $1 AND is_deleted = FALSE
                    ORDER BY created_at ASC
                    "#,
                ))
                .bind(user_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(tasks)
    }

    /// Lists the non-deleted tasks in a category
    ///
    /// Category ownership is checked by the caller; this query only scopes
    /// by category.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE category_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC
            "#,
        ))
        .bind(category_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Finds a non-deleted task owned by the given user
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates a task owned by the given user
    ///
    /// Only non-None fields in `data` are written; `updated_at` is bumped.
    ///
    /// # Returns
    ///
    /// The updated task, or None if it does not exist, is deleted, or is
    /// owned by somebody else
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.category_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category_id = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(user_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(category_id) = data.category_id {
            q = q.bind(category_id);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Soft-deletes a task owned by the given user
    ///
    /// # Returns
    ///
    /// The deleted task, or None if it does not exist, was already deleted,
    /// or is owned by somebody else
    pub async fn soft_delete(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_task_default_is_empty() {
        let update = UpdateTask::default();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_task_with_status_is_not_empty() {
        let update = UpdateTask {
            status: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_create_task_struct() {
        let data = CreateTask {
            user_id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: "Quarterly status report".to_string(),
            due_date: None,
            status: false,
            category_id: None,
        };

        assert!(!data.status);
        assert!(data.category_id.is_none());
    }

    // Integration tests for database operations are in taskhub-api/tests/
}
