/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts. Users own categories and personal tasks and join groups via the
/// Membership model. Accounts are soft-deleted, never removed: every normal
/// read filters on `is_deleted = false`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(100) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     address VARCHAR(255),
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::user::{User, CreateUser};
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "jdoe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     address: Some("123 Main St".to_string()),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, address, is_deleted, created_at, updated_at";

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name chosen at registration
    pub username: String,

    /// Email address
    ///
    /// Must be unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional postal address
    pub address: Option<String>,

    /// Soft-delete flag; deleted accounts are invisible to all normal reads
    pub is_deleted: bool,

    /// When the user account was created
    pub created_at: DateTime<Utc>,

    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password!)
    pub password_hash: String,

    /// Optional postal address
    pub address: Option<String>,
}

/// Input for updating an existing user
///
/// All fields are optional; only non-None fields are written. The set of
/// updatable columns is exactly this struct; anything else in a request
/// body is discarded by the controller before it gets here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub username: Option<String>,

    /// New postal address
    pub address: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,
}

impl UpdateUser {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.address.is_none() && self.password_hash.is_none()
    }
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, address)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.address)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds an active (non-deleted) user by ID
    ///
    /// Soft-deleted accounts are treated as absent.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds an active (non-deleted) user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether an active user with this email already exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE email = $1 AND is_deleted = FALSE
            )
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Updates an existing user's profile
    ///
    /// Only non-None fields in `data` are written. The `updated_at` timestamp
    /// is set to the current time. Soft-deleted accounts cannot be updated.
    ///
    /// # Returns
    ///
    /// The updated user if found and active, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the email unique constraint is violated or the
    /// database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND is_deleted = FALSE RETURNING {USER_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Soft-deletes a user account
    ///
    /// The row stays in place with `is_deleted = TRUE`; every read in this
    /// module filters it out from then on, which also invalidates any
    /// outstanding bearer tokens for the account.
    ///
    /// # Returns
    ///
    /// True if an active user was marked deleted, false otherwise
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
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
    fn test_create_user_struct() {
        let create_user = CreateUser {
            username: "tester".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            address: None,
        };

        assert_eq!(create_user.email, "test@example.com");
        assert_eq!(create_user.password_hash, "hash");
    }

    #[test]
    fn test_update_user_default_is_empty() {
        let update = UpdateUser::default();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_user_with_field_is_not_empty() {
        let update = UpdateUser {
            address: Some("456 Elm St".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    // Integration tests for database operations are in taskhub-api/tests/
}
