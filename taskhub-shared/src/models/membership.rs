/// Membership model and database operations
///
/// This module provides the Membership model for user-group relationships.
/// It implements a many-to-many relationship between users and groups with
/// two roles, admin and member. Memberships are soft-deleted; a removed user
/// who is invited again gets the same row reactivated.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE group_role AS ENUM ('admin', 'member');
///
/// CREATE TABLE user_groups (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
///     role group_role NOT NULL DEFAULT 'member',
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, group_id)
/// );
/// ```
///
/// # Roles
///
/// - **admin**: manages group metadata, membership, and group tasks
/// - **member**: sees and works on the tasks assigned to them
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::membership::{Membership, GroupRole};
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let group_id = Uuid::new_v4();
/// let user_id = Uuid::new_v4();
///
/// // Add a user to a group as a member
/// let membership = Membership::add(&pool, group_id, user_id, GroupRole::Member).await?;
///
/// // Look up the user's role
/// let role = Membership::get_role(&pool, group_id, user_id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role of a user within one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    /// Manages group metadata, membership, and group tasks
    Admin,

    /// Works on assigned tasks; read-only on everything else
    Member,
}

impl GroupRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Admin => "admin",
            GroupRole::Member => "member",
        }
    }
}

/// Membership model representing a user-group relationship with a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// User ID
    pub user_id: Uuid,

    /// Group ID
    pub group_id: Uuid,

    /// Role within the group
    pub role: GroupRole,

    /// Soft-delete flag; a removed member keeps the row with this set
    pub is_deleted: bool,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Adds a user to a group
    ///
    /// If the user was previously removed from this group, the existing row
    /// is reactivated with the new role. If the user is already an active
    /// member, nothing is written and None is returned.
    ///
    /// # Returns
    ///
    /// The created or reactivated membership, or None if the user is already
    /// an active member
    ///
    /// # Errors
    ///
    /// Returns an error if the group or user does not exist (foreign key
    /// violation) or the database connection fails
    pub async fn add(
        pool: &PgPool,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO user_groups (user_id, group_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, group_id)
            DO UPDATE SET role = EXCLUDED.role, is_deleted = FALSE
            WHERE user_groups.is_deleted = TRUE
            RETURNING user_id, group_id, role, is_deleted, created_at
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Finds a user's active membership in a group
    pub async fn find_active(
        pool: &PgPool,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT user_id, group_id, role, is_deleted, created_at
            FROM user_groups
            WHERE group_id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Gets a user's role in a group, if they are an active member
    pub async fn get_role(
        pool: &PgPool,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupRole>, sqlx::Error> {
        let role: Option<GroupRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM user_groups
            WHERE group_id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Checks if a user is an active member of a group (any role)
    pub async fn is_active_member(
        pool: &PgPool,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_groups
                WHERE group_id = $1 AND user_id = $2 AND is_deleted = FALSE
            )
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Counts the active admins of a group
    ///
    /// Used to enforce the last-admin invariant: a group must retain at
    /// least one active admin at all times.
    pub async fn count_active_admins(pool: &PgPool, group_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM user_groups
            WHERE group_id = $1 AND role = 'admin' AND is_deleted = FALSE
            "#,
        )
        .bind(group_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Removes a user from a group (soft delete)
    ///
    /// The last-admin invariant is checked by the caller before removal;
    /// this query only flips the flag.
    ///
    /// # Returns
    ///
    /// True if an active membership was removed, false otherwise
    pub async fn remove(pool: &PgPool, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE user_groups
            SET is_deleted = TRUE
            WHERE group_id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_role_as_str() {
        assert_eq!(GroupRole::Admin.as_str(), "admin");
        assert_eq!(GroupRole::Member.as_str(), "member");
    }

    #[test]
    fn test_group_role_serde_lowercase() {
        let json = serde_json::to_string(&GroupRole::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let role: GroupRole = serde_json::from_str("\"member\"").unwrap();
        assert_eq!(role, GroupRole::Member);
    }

    // Integration tests for database operations are in taskhub-api/tests/
}
