/// Group task model and database operations
///
/// Group tasks belong to a group, are created by an admin, and are assigned
/// to one member. Two ownership rules are wired into the queries here:
/// admin-only mutations are keyed on `(id, group_id)` after the policy check,
/// and the status update is keyed on `assigned_to` so only the assignee can
/// flip it. Group tasks are soft-deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE group_tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     due_date TIMESTAMPTZ,
///     assigned_to UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     status BOOLEAN NOT NULL DEFAULT FALSE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const GROUP_TASK_COLUMNS: &str = "id, group_id, title, description, due_date, assigned_to, \
                                  created_by, status, is_deleted, created_at, updated_at";

/// Task scoped to a group and assigned to one of its members
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupTask {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning group
    pub group_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Member responsible for the task
    pub assigned_to: Uuid,

    /// Admin who created the task
    pub created_by: Uuid,

    /// Completion flag (false = pending, true = done)
    pub status: bool,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new group task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupTask {
    /// Owning group
    pub group_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Member responsible for the task; must be an active group member
    pub assigned_to: Uuid,

    /// Admin creating the task
    pub created_by: Uuid,
}

/// Input for an admin update of a group task
///
/// This struct is the admin update allow-list. Status is deliberately not
/// here: it changes only through the assignee's status endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGroupTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateGroupTask {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.due_date.is_none()
    }
}

impl GroupTask {
    /// Creates a new group task
    ///
    /// The caller verifies the admin role and the assignee's membership
    /// first. The membership-check-then-insert pair is not atomic; a member
    /// removed in between still ends up assigned, which is accepted.
    pub async fn create(pool: &PgPool, data: CreateGroupTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, GroupTask>(&format!(
            r#"
            INSERT INTO group_tasks (group_id, title, description, due_date, assigned_to, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {GROUP_TASK_COLUMNS}
            "#,
        ))
        .bind(data.group_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists a group's non-deleted tasks, optionally filtered by assignee
    ///
    /// This is the admin view: every task in the group, or just one member's
    /// tasks when `assigned_to` is given.
    pub async fn list_for_group(
        pool: &PgPool,
        group_id: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = match assigned_to {
            Some(member_id) => {
                sqlx::query_as::<_, GroupTask>(&format!(
                    r#"
                    SELECT {GROUP_TASK_COLUMNS}
                    FROM group_tasks
                    WHERE group_id = $1 AND assigned_to = $2 AND is_deleted = FALSE
                    ORDER BY created_at ASC
                    "#,
                ))
                .bind(group_id)
                .bind(member_id)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, GroupTask>(&format!(
                    r#"
                    SELECT {GROUP_TASK_COLUMNS}
                    FROM group_tasks
                    WHERE group_id = $1 AND is_deleted = FALSE
                    ORDER BY created_at ASC
                    "#,
                ))
                .bind(group_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(tasks)
    }

    /// Updates a group task's title/description/due date
    ///
    /// Admin-only; the role check happens before this call. Only non-None
    /// fields in `data` are written.
    ///
    /// # Returns
    ///
    /// The updated task, or None if it does not exist in this group or is
    /// deleted
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        group_id: Uuid,
        data: UpdateGroupTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE group_tasks SET updated_at = NOW()");
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

        query.push_str(&format!(
            " WHERE id = $1 AND group_id = $2 AND is_deleted = FALSE RETURNING {GROUP_TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, GroupTask>(&query).bind(id).bind(group_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Updates a task's completion status
    ///
    /// Keyed on `assigned_to`: only the assignee's call matches a row, so
    /// anyone else sees the task as absent.
    ///
    /// # Returns
    ///
    /// The updated task, or None if it does not exist, is deleted, or is not
    /// assigned to `user_id`
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        status: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, GroupTask>(&format!(
            r#"
            UPDATE group_tasks
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND assigned_to = $2 AND is_deleted = FALSE
            RETURNING {GROUP_TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Soft-deletes a group task
    ///
    /// Admin-only; the role check happens before this call.
    ///
    /// # Returns
    ///
    /// The deleted task, or None if it does not exist in this group or was
    /// already deleted
    pub async fn soft_delete(
        pool: &PgPool,
        id: Uuid,
        group_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, GroupTask>(&format!(
            r#"
            UPDATE group_tasks
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND group_id = $2 AND is_deleted = FALSE
            RETURNING {GROUP_TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(group_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a non-deleted group task by ID
    ///
    /// Used by the status endpoint to recover the group for the membership
    /// check before the assignee-keyed update runs.
    pub async fn find_active(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, GroupTask>(&format!(
            r#"
            SELECT {GROUP_TASK_COLUMNS}
            FROM group_tasks
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_group_task_default_is_empty() {
        let update = UpdateGroupTask::default();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_group_task_with_title_is_not_empty() {
        let update = UpdateGroupTask {
            title: Some("Ship release".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    // Integration tests for database operations are in taskhub-api/tests/
}
