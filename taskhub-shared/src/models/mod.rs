/// Database models for Taskhub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `category`: Per-user task categories
/// - `task`: Personal tasks
/// - `group`: Shared groups
/// - `membership`: User-group relationships with roles
/// - `group_task`: Tasks scoped to a group and assigned to a member
/// - `notification`: Per-user notification feed
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
/// let new_user = CreateUser {
///     username: "jdoe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     address: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod category;
pub mod group;
pub mod group_task;
pub mod membership;
pub mod notification;
pub mod task;
pub mod user;
