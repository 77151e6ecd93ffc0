/// Wire types for the Taskhub REST API
///
/// Request and response bodies as the server speaks them. Field sets match
/// the server's typed responses; everything here is plain serde data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user, as returned by auth and profile endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Token plus the user it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Profile wrapper returned by the profile endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// Profile update payload; only present fields are sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// A personal task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: bool,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a personal task
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

/// Partial update for a personal task; only present fields are sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

/// A task category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for group metadata
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Result of a membership change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    pub group_id: Uuid,
    pub member_id: Uuid,
    pub message: String,
}

/// A group task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTask {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a group task
#[derive(Debug, Clone, Serialize)]
pub struct NewGroupTask {
    pub group_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Uuid,
}

/// Partial admin update for a group task
#[derive(Debug, Clone, Serialize)]
pub struct GroupTaskPatch {
    pub group_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// A notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of marking notifications as read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub marked: u64,
    pub message: String,
}

/// Service health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Error body the server sends with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = TaskPatch {
            status: Some(true),
            ..Default::default()
        };

        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"status":true}"#);
    }

    #[test]
    fn test_new_task_serializes_required_fields() {
        let task = NewTask {
            title: "T".to_string(),
            description: "d".to_string(),
            due_date: None,
            status: false,
            category_id: None,
        };

        let json: serde_json::Value = serde_json::to_value(&task).unwrap();
        assert_eq!(json["title"], "T");
        assert_eq!(json["status"], false);
        assert!(json.get("due_date").is_none());
    }
}
