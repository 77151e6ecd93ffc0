//! # Taskhub Client
//!
//! A typed HTTP client for the Taskhub REST API. The client is configured
//! once with a fixed base URL and an optional bearer token, and exposes one
//! method per endpoint.
//!
//! ## Example
//!
//! ```no_run
//! use taskhub_client::TaskhubClient;
//!
//! # async fn example() -> Result<(), taskhub_client::ClientError> {
//! let client = TaskhubClient::new("http://localhost:5001");
//!
//! let session = client
//!     .login("user@example.com", "Password123!")
//!     .await?;
//!
//! let client = client.with_token(session.token);
//! let tasks = client.list_tasks(None).await?;
//! println!("{} open tasks", tasks.iter().filter(|t| !t.status).count());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod types;

pub use client::{ClientError, TaskhubClient};
