/// The Taskhub API client
///
/// One `reqwest::Client` behind a fixed base URL. Authenticated calls send
/// the bearer token handed over via [`TaskhubClient::with_token`]; calls
/// made without one fail server-side with 401, never silently.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::types::*;

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connection, TLS, decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
    },
}

/// Typed client for the Taskhub REST API
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TaskhubClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl TaskhubClient {
    /// Creates a client for the given base URL (e.g. `http://localhost:5001`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            base_url,
            http: reqwest::Client::new(),
            token: None,
        }
    }

    /// Returns a client that authenticates with the given bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Builds a full URL for an API path
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T, ClientError> {
        let mut request = self.http.request(method, self.endpoint(path));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::GET, path, None::<&()>).await
    }

    // --- health ---

    /// `GET /health`
    pub async fn health(&self) -> Result<Health, ClientError> {
        self.get("/health").await
    }

    // --- auth ---

    /// `POST /api/auth/register`
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        address: Option<&str>,
    ) -> Result<AuthResponse, ClientError> {
        self.send(
            Method::POST,
            "/api/auth/register",
            Some(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
                "address": address,
            })),
        )
        .await
    }

    /// `POST /api/auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        self.send(
            Method::POST,
            "/api/auth/login",
            Some(&serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// `GET /api/auth/profile`
    pub async fn profile(&self) -> Result<ProfileResponse, ClientError> {
        self.get("/api/auth/profile").await
    }

    /// `PUT /api/auth/profile`
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<ProfileResponse, ClientError> {
        self.send(Method::PUT, "/api/auth/profile", Some(patch)).await
    }

    // --- personal tasks ---

    /// `POST /api/tasks`
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        self.send(Method::POST, "/api/tasks", Some(task)).await
    }

    /// `GET /api/tasks`, optionally filtered by completion status
    pub async fn list_tasks(&self, status: Option<bool>) -> Result<Vec<Task>, ClientError> {
        let path = match status {
            Some(status) => format!("/api/tasks?status={}", status),
            None => "/api/tasks".to_string(),
        };
        self.get(&path).await
    }

    /// `PUT /api/tasks/{task_id}`
    pub async fn update_task(&self, task_id: Uuid, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.send(Method::PUT, &format!("/api/tasks/{}", task_id), Some(patch))
            .await
    }

    /// `DELETE /api/tasks/{task_id}`
    pub async fn delete_task(&self, task_id: Uuid) -> Result<Task, ClientError> {
        self.send(
            Method::DELETE,
            &format!("/api/tasks/{}", task_id),
            None::<&()>,
        )
        .await
    }

    // --- categories ---

    /// `POST /api/categories`
    pub async fn create_category(&self, name: &str) -> Result<Category, ClientError> {
        self.send(
            Method::POST,
            "/api/categories",
            Some(&serde_json::json!({ "name": name })),
        )
        .await
    }

    /// `GET /api/categories`
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get("/api/categories").await
    }

    /// `GET /api/categories/{category_id}/tasks`
    pub async fn list_category_tasks(&self, category_id: Uuid) -> Result<Vec<Task>, ClientError> {
        self.get(&format!("/api/categories/{}/tasks", category_id))
            .await
    }

    /// `PUT /api/categories/{category_id}`
    pub async fn rename_category(
        &self,
        category_id: Uuid,
        name: &str,
    ) -> Result<Category, ClientError> {
        self.send(
            Method::PUT,
            &format!("/api/categories/{}", category_id),
            Some(&serde_json::json!({ "name": name })),
        )
        .await
    }

    /// `DELETE /api/categories/{category_id}` - also deletes the category's tasks
    pub async fn delete_category(&self, category_id: Uuid) -> Result<Category, ClientError> {
        self.send(
            Method::DELETE,
            &format!("/api/categories/{}", category_id),
            None::<&()>,
        )
        .await
    }

    // --- groups ---

    /// `POST /api/groups`
    pub async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Group, ClientError> {
        self.send(
            Method::POST,
            "/api/groups",
            Some(&serde_json::json!({ "name": name, "description": description })),
        )
        .await
    }

    /// `PUT /api/groups/{group_id}` (admin)
    pub async fn update_group(&self, group_id: Uuid, patch: &GroupPatch) -> Result<Group, ClientError> {
        self.send(
            Method::PUT,
            &format!("/api/groups/{}", group_id),
            Some(patch),
        )
        .await
    }

    /// `DELETE /api/groups/{group_id}` (admin)
    pub async fn delete_group(&self, group_id: Uuid) -> Result<serde_json::Value, ClientError> {
        self.send(
            Method::DELETE,
            &format!("/api/groups/{}", group_id),
            None::<&()>,
        )
        .await
    }

    /// `POST /api/groups/{group_id}/members` (admin)
    pub async fn add_member(
        &self,
        group_id: Uuid,
        member_id: Uuid,
    ) -> Result<MemberResponse, ClientError> {
        self.send(
            Method::POST,
            &format!("/api/groups/{}/members", group_id),
            Some(&serde_json::json!({ "member_id": member_id })),
        )
        .await
    }

    /// `DELETE /api/groups/{group_id}/members` (admin)
    pub async fn remove_member(
        &self,
        group_id: Uuid,
        member_id: Uuid,
    ) -> Result<MemberResponse, ClientError> {
        self.send(
            Method::DELETE,
            &format!("/api/groups/{}/members", group_id),
            Some(&serde_json::json!({ "member_id": member_id })),
        )
        .await
    }

    // --- group tasks ---

    /// `POST /api/group-tasks` (admin)
    pub async fn create_group_task(&self, task: &NewGroupTask) -> Result<GroupTask, ClientError> {
        self.send(Method::POST, "/api/group-tasks", Some(task)).await
    }

    /// `GET /api/group-tasks/{group_id}`
    ///
    /// Admins may filter by member; members always get their own tasks.
    pub async fn list_group_tasks(
        &self,
        group_id: Uuid,
        member_id: Option<Uuid>,
    ) -> Result<Vec<GroupTask>, ClientError> {
        let path = match member_id {
            Some(member_id) => format!("/api/group-tasks/{}?member_id={}", group_id, member_id),
            None => format!("/api/group-tasks/{}", group_id),
        };
        self.get(&path).await
    }

    /// `PUT /api/group-tasks/{group_task_id}` (admin)
    pub async fn update_group_task(
        &self,
        group_task_id: Uuid,
        patch: &GroupTaskPatch,
    ) -> Result<GroupTask, ClientError> {
        self.send(
            Method::PUT,
            &format!("/api/group-tasks/{}", group_task_id),
            Some(patch),
        )
        .await
    }

    /// `DELETE /api/group-tasks/{group_task_id}` (admin)
    pub async fn delete_group_task(
        &self,
        group_task_id: Uuid,
        group_id: Uuid,
    ) -> Result<GroupTask, ClientError> {
        self.send(
            Method::DELETE,
            &format!("/api/group-tasks/{}", group_task_id),
            Some(&serde_json::json!({ "group_id": group_id })),
        )
        .await
    }

    /// `PATCH /api/group-tasks/{group_task_id}/status` (assignee)
    pub async fn set_group_task_status(
        &self,
        group_task_id: Uuid,
        status: bool,
    ) -> Result<GroupTask, ClientError> {
        self.send(
            Method::PATCH,
            &format!("/api/group-tasks/{}/status", group_task_id),
            Some(&serde_json::json!({ "status": status })),
        )
        .await
    }

    // --- notifications ---

    /// `GET /api/notifications`
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.get("/api/notifications").await
    }

    /// `PUT /api/notifications/mark-as-read`
    pub async fn mark_notifications_read(&self) -> Result<MarkReadResponse, ClientError> {
        self.send(Method::PUT, "/api/notifications/mark-as-read", None::<&()>)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = TaskhubClient::new("http://localhost:5001///");
        assert_eq!(client.endpoint("/api/tasks"), "http://localhost:5001/api/tasks");
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = TaskhubClient::new("http://localhost:5001");
        assert_eq!(client.endpoint("/health"), "http://localhost:5001/health");
    }

    #[test]
    fn test_with_token_sets_token() {
        let client = TaskhubClient::new("http://localhost:5001").with_token("abc");
        assert_eq!(client.token.as_deref(), Some("abc"));
    }
}
