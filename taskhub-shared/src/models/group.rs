/// Group model and database operations
///
/// Groups are shared workspaces: members are tracked in the `user_groups`
/// relation (see [`crate::models::membership`]) and tasks in `group_tasks`.
/// Groups are soft-deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE groups (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::membership::GroupRole;

const GROUP_COLUMNS: &str = "id, name, description, is_deleted, created_at, updated_at";

/// Group model representing a shared workspace
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    /// Unique group ID (UUID v4)
    pub id: Uuid,

    /// Group name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the group was created
    pub created_at: DateTime<Utc>,

    /// When the group was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    /// Group name
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Input for updating group metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGroup {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

impl UpdateGroup {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

impl Group {
    /// Creates a new group with its creator as the first admin
    ///
    /// The group row and the admin membership are inserted in one
    /// transaction so a group can never exist without an admin.
    pub async fn create_with_admin(
        pool: &PgPool,
        data: CreateGroup,
        creator_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let group = sqlx::query_as::<_, Group>(&format!(
            r#"
            INSERT INTO groups (name, description)
            VALUES ($1, $2)
            RETURNING {GROUP_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.description)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(creator_id)
        .bind(group.id)
        .bind(GroupRole::Admin)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(group)
    }

    /// Finds a non-deleted group by ID
    pub async fn find_active(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let group = sqlx::query_as::<_, Group>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM groups
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(group)
    }

    /// Updates a group's name and/or description
    ///
    /// Only non-None fields in `data` are written. Role checks happen before
    /// this call via the authorization policy.
    ///
    /// # Returns
    ///
    /// The updated group, or None if it does not exist or is deleted
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateGroup,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE groups SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND is_deleted = FALSE RETURNING {GROUP_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Group>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let group = q.fetch_optional(pool).await?;

        Ok(group)
    }

    /// Soft-deletes a group
    ///
    /// # Returns
    ///
    /// True if an active group was marked deleted, false otherwise
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_group_default_is_empty() {
        let update = UpdateGroup::default();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_group_with_name_is_not_empty() {
        let update = UpdateGroup {
            name: Some("Platform Team".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    // Integration tests for database operations are in taskhub-api/tests/
}
