/// Authentication and authorization utilities
///
/// This module provides the security primitives for Taskhub:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
/// - [`policy`]: declarative group-role authorization policy
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with configurable expiration
/// - **Constant-time Comparison**: password verification uses constant-time operations
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::password::{hash_password, verify_password};
/// use taskhub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // JWT token generation
/// let claims = Claims::new(Uuid::new_v4(), Duration::hours(24));
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod policy;
