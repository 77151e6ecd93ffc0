/// Category model and database operations
///
/// Categories are owned exclusively by one user and group that user's
/// personal tasks. Deleting a category also deletes every task referencing
/// it; both deletes run in a single transaction so the cascade is one
/// logical operation.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Category model representing a user-owned task category
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Category name
    pub name: String,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Owning user
    pub user_id: Uuid,

    /// Category name
    pub name: String,
}

impl Category {
    /// Creates a new category for a user
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories owned by a user, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM categories
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Finds a category by ID, but only if it is owned by the given user
    ///
    /// Returns None both for absent categories and for categories owned by
    /// somebody else; callers cannot distinguish the two.
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM categories
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Renames a category owned by the given user
    ///
    /// # Returns
    ///
    /// The updated category, or None if it does not exist or is not owned
    /// by `user_id`
    pub async fn update_name(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        name: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Deletes a category and every task referencing it
    ///
    /// Both deletes run in one transaction: either the category and all of
    /// its tasks disappear together, or nothing changes.
    ///
    /// # Returns
    ///
    /// The deleted category, or None if it does not exist or is not owned
    /// by `user_id`
    pub async fn delete_with_tasks(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM categories
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(category) = category else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM tasks WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_category_struct() {
        let data = CreateCategory {
            user_id: Uuid::new_v4(),
            name: "Work".to_string(),
        };

        assert_eq!(data.name, "Work");
    }

    // Integration tests for database operations are in taskhub-api/tests/
}
