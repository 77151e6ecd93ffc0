/// Notification model and database operations
///
/// Notifications are a per-user feed of plain-text messages, currently
/// produced when a user is added to a group. They carry a read flag and are
/// never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Notification delivered to a single user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID (UUID v4)
    pub id: Uuid,

    /// Recipient
    pub user_id: Uuid,

    /// Message text
    pub message: String,

    /// Whether the recipient has read the notification
    pub is_read: bool,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a notification for a user
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        message: &str,
    ) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message)
            VALUES ($1, $2)
            RETURNING id, user_id, message, is_read, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// Lists a user's notifications, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    /// Marks all of a user's unread notifications as read
    ///
    /// # Returns
    ///
    /// The number of notifications that were marked
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE user_id = $1 AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
