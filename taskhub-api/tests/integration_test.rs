/// Integration tests for the Taskhub API
///
/// These tests drive the full router in-process against a real PostgreSQL
/// database (DATABASE_URL). They cover the system's core guarantees:
/// - registration/login/profile round trip
/// - soft-deleted rows disappearing from reads
/// - category deletion cascading to its tasks
/// - group role policy, the last-admin invariant, and non-member rejection
/// - assignee-only status updates on group tasks
/// - empty partial updates being rejected

mod common;

use axum::http::StatusCode;
use common::{TestContext, TEST_PASSWORD};
use serde_json::json;
use taskhub_shared::models::membership::{GroupRole, Membership};
use taskhub_shared::models::user::User;
use uuid::Uuid;

#[tokio::test]
async fn test_register_login_profile_roundtrip() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("roundtrip-{}@example.com", Uuid::new_v4());
    let (status, body) = ctx
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "roundtrip",
                "email": email,
                "password": TEST_PASSWORD,
                "address": "123 Main St"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], email);

    let (status, body) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request("GET", "/api/auth/profile", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["user"]["username"], "roundtrip");
    assert_eq!(body["user"]["address"], "123 Main St");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let ctx = TestContext::new().await.unwrap();
    let (user, _) = ctx.register_user("wrongpw").await.unwrap();

    let (status, _) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "not-the-password" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    for (method, uri) in [
        ("GET", "/api/tasks"),
        ("GET", "/api/categories"),
        ("GET", "/api/notifications"),
        ("GET", "/api/auth/profile"),
    ] {
        let (status, _) = ctx.request(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_token_of_soft_deleted_user_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let (user, token) = ctx.register_user("ghost").await.unwrap();

    let (status, _) = ctx.request("GET", "/api/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    User::soft_delete(&ctx.db, user.id).await.unwrap();

    let (status, _) = ctx.request("GET", "/api/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_soft_deleted_task_disappears_from_reads() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.register_user("softdelete").await.unwrap();

    let (status, task) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": "T1", "description": "first" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", task);
    let task_id = task["id"].as_str().unwrap().to_string();

    let (_, tasks) = ctx.request("GET", "/api/tasks", Some(&token), None).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let (status, _) = ctx
        .request("DELETE", &format!("/api/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, tasks) = ctx.request("GET", "/api/tasks", Some(&token), None).await;
    assert!(tasks.as_array().unwrap().is_empty());

    // Deleting again reports not found, not a silent no-op
    let (status, _) = ctx
        .request("DELETE", &format!("/api/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_status_filter() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.register_user("filter").await.unwrap();

    for (title, status) in [("open", false), ("done", true)] {
        let (code, body) = ctx
            .request(
                "POST",
                "/api/tasks",
                Some(&token),
                Some(json!({ "title": title, "description": title, "status": status })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "{}", body);
    }

    let (_, done) = ctx
        .request("GET", "/api/tasks?status=true", Some(&token), None)
        .await;
    assert_eq!(done.as_array().unwrap().len(), 1);
    assert_eq!(done[0]["title"], "done");

    let (_, open) = ctx
        .request("GET", "/api/tasks?status=false", Some(&token), None)
        .await;
    assert_eq!(open.as_array().unwrap().len(), 1);
    assert_eq!(open[0]["title"], "open");
}

#[tokio::test]
async fn test_empty_task_update_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.register_user("emptyupdate").await.unwrap();

    let (_, task) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": "T", "description": "d" })),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request(
            "PUT",
            &format!("/api/tasks/{}", task_id),
            Some(&token),
            Some(json!({})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn test_task_with_foreign_category_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let (_, alice_token) = ctx.register_user("alice-cat").await.unwrap();
    let (_, bob_token) = ctx.register_user("bob-cat").await.unwrap();

    let (_, category) = ctx
        .request(
            "POST",
            "/api/categories",
            Some(&alice_token),
            Some(json!({ "name": "Alice's" })),
        )
        .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    // Bob cannot hang a task on Alice's category
    let (status, _) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&bob_token),
            Some(json!({ "title": "T", "description": "d", "category_id": category_id })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_delete_cascades_to_tasks() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.register_user("cascade").await.unwrap();

    let (_, category) = ctx
        .request(
            "POST",
            "/api/categories",
            Some(&token),
            Some(json!({ "name": "Work" })),
        )
        .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": "T1", "description": "in Work", "category_id": category_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/api/categories/{}", category_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // T1 went down with its category
    let (_, tasks) = ctx.request("GET", "/api/tasks", Some(&token), None).await;
    assert!(tasks.as_array().unwrap().is_empty());

    let (_, categories) = ctx
        .request("GET", "/api/categories", Some(&token), None)
        .await;
    assert!(categories.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_foreign_category_reads_are_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let (_, alice_token) = ctx.register_user("alice-404").await.unwrap();
    let (_, bob_token) = ctx.register_user("bob-404").await.unwrap();

    let (_, category) = ctx
        .request(
            "POST",
            "/api/categories",
            Some(&alice_token),
            Some(json!({ "name": "Private" })),
        )
        .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request(
            "GET",
            &format!("/api/categories/{}/tasks", category_id),
            Some(&bob_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/api/categories/{}", category_id),
            Some(&bob_token),
            Some(json!({ "name": "Taken" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_member_is_rejected_from_group_endpoints() {
    let ctx = TestContext::new().await.unwrap();
    let (_, admin_token) = ctx.register_user("admin-nm").await.unwrap();
    let (outsider, outsider_token) = ctx.register_user("outsider").await.unwrap();

    let (_, group) = ctx
        .request(
            "POST",
            "/api/groups",
            Some(&admin_token),
            Some(json!({ "name": "G", "description": "group" })),
        )
        .await;
    let group_id = group["id"].as_str().unwrap().to_string();

    let checks = [
        (
            "PUT",
            format!("/api/groups/{}", group_id),
            Some(json!({ "name": "New" })),
        ),
        ("DELETE", format!("/api/groups/{}", group_id), None),
        (
            "POST",
            format!("/api/groups/{}/members", group_id),
            Some(json!({ "member_id": outsider.id })),
        ),
        (
            "DELETE",
            format!("/api/groups/{}/members", group_id),
            Some(json!({ "member_id": outsider.id })),
        ),
        (
            "POST",
            "/api/group-tasks".to_string(),
            Some(json!({
                "group_id": group_id,
                "title": "T",
                "description": "d",
                "assigned_to": outsider.id
            })),
        ),
        ("GET", format!("/api/group-tasks/{}", group_id), None),
    ];

    for (method, uri, body) in checks {
        let (status, response) = ctx
            .request(method, &uri, Some(&outsider_token), body)
            .await;
        assert_eq!(
            status,
            StatusCode::FORBIDDEN,
            "{} {} -> {}",
            method,
            uri,
            response
        );
    }
}

#[tokio::test]
async fn test_last_admin_removal_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let (admin, admin_token) = ctx.register_user("lastadmin").await.unwrap();
    let (member, _) = ctx.register_user("justmember").await.unwrap();

    let (_, group) = ctx
        .request(
            "POST",
            "/api/groups",
            Some(&admin_token),
            Some(json!({ "name": "G" })),
        )
        .await;
    let group_id = group["id"].as_str().unwrap().to_string();
    let group_uuid: Uuid = group_id.parse().unwrap();

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/api/groups/{}/members", group_id),
            Some(&admin_token),
            Some(json!({ "member_id": member.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The creator is the only admin; removing them must fail
    let (status, body) = ctx
        .request(
            "DELETE",
            &format!("/api/groups/{}/members", group_id),
            Some(&admin_token),
            Some(json!({ "member_id": admin.id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    // With a second admin in place the same removal succeeds
    let (second_admin, _) = ctx.register_user("secondadmin").await.unwrap();
    Membership::add(&ctx.db, group_uuid, second_admin.id, GroupRole::Admin)
        .await
        .unwrap();

    let (status, body) = ctx
        .request(
            "DELETE",
            &format!("/api/groups/{}/members", group_id),
            Some(&admin_token),
            Some(json!({ "member_id": admin.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
}

#[tokio::test]
async fn test_duplicate_member_add_is_rejected_and_notified_once() {
    let ctx = TestContext::new().await.unwrap();
    let (_, admin_token) = ctx.register_user("notify-admin").await.unwrap();
    let (member, member_token) = ctx.register_user("notify-member").await.unwrap();

    let (_, group) = ctx
        .request(
            "POST",
            "/api/groups",
            Some(&admin_token),
            Some(json!({ "name": "Notified" })),
        )
        .await;
    let group_id = group["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/api/groups/{}/members", group_id),
            Some(&admin_token),
            Some(json!({ "member_id": member.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/api/groups/{}/members", group_id),
            Some(&admin_token),
            Some(json!({ "member_id": member.id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Exactly one invite notification reached the member
    let (_, notifications) = ctx
        .request("GET", "/api/notifications", Some(&member_token), None)
        .await;
    let items = notifications.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["is_read"], false);
    assert!(items[0]["message"]
        .as_str()
        .unwrap()
        .contains("Notified"));

    let (status, marked) = ctx
        .request(
            "PUT",
            "/api/notifications/mark-as-read",
            Some(&member_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marked["marked"], 1);

    let (_, notifications) = ctx
        .request("GET", "/api/notifications", Some(&member_token), None)
        .await;
    assert_eq!(notifications[0]["is_read"], true);
}

#[tokio::test]
async fn test_group_task_status_is_assignee_only() {
    let ctx = TestContext::new().await.unwrap();
    let (_, admin_token) = ctx.register_user("gt-admin").await.unwrap();
    let (member, member_token) = ctx.register_user("gt-member").await.unwrap();

    let (_, group) = ctx
        .request(
            "POST",
            "/api/groups",
            Some(&admin_token),
            Some(json!({ "name": "GT" })),
        )
        .await;
    let group_id = group["id"].as_str().unwrap().to_string();

    ctx.request(
        "POST",
        &format!("/api/groups/{}/members", group_id),
        Some(&admin_token),
        Some(json!({ "member_id": member.id })),
    )
    .await;

    // Admin assigns task X to the member
    let (status, task) = ctx
        .request(
            "POST",
            "/api/group-tasks",
            Some(&admin_token),
            Some(json!({
                "group_id": group_id,
                "title": "X",
                "description": "do it",
                "assigned_to": member.id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", task);
    let task_id = task["id"].as_str().unwrap().to_string();

    // The assignee updates the status - succeeds
    let (status, updated) = ctx
        .request(
            "PATCH",
            &format!("/api/group-tasks/{}/status", task_id),
            Some(&member_token),
            Some(json!({ "status": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["status"], true);

    // The assignee tries to update the title - rejected (admin-only)
    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/api/group-tasks/{}", task_id),
            Some(&member_token),
            Some(json!({ "group_id": group_id, "title": "renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The admin is not the assignee: the status endpoint sees no row
    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/api/group-tasks/{}/status", task_id),
            Some(&admin_token),
            Some(json!({ "status": false })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_task_listing_splits_by_role() {
    let ctx = TestContext::new().await.unwrap();
    let (_, admin_token) = ctx.register_user("list-admin").await.unwrap();
    let (member_a, token_a) = ctx.register_user("list-a").await.unwrap();
    let (member_b, _) = ctx.register_user("list-b").await.unwrap();

    let (_, group) = ctx
        .request(
            "POST",
            "/api/groups",
            Some(&admin_token),
            Some(json!({ "name": "Listing" })),
        )
        .await;
    let group_id = group["id"].as_str().unwrap().to_string();

    for member in [&member_a, &member_b] {
        ctx.request(
            "POST",
            &format!("/api/groups/{}/members", group_id),
            Some(&admin_token),
            Some(json!({ "member_id": member.id })),
        )
        .await;
    }

    for (title, assignee) in [("for-a", member_a.id), ("for-b", member_b.id)] {
        let (status, _) = ctx
            .request(
                "POST",
                "/api/group-tasks",
                Some(&admin_token),
                Some(json!({
                    "group_id": group_id,
                    "title": title,
                    "description": "d",
                    "assigned_to": assignee
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Admin sees both tasks
    let (_, all) = ctx
        .request(
            "GET",
            &format!("/api/group-tasks/{}", group_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    // Admin can filter by member
    let (_, filtered) = ctx
        .request(
            "GET",
            &format!("/api/group-tasks/{}?member_id={}", group_id, member_b.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["title"], "for-b");

    // A member sees only their own assignments, filter or not
    let (_, own) = ctx
        .request(
            "GET",
            &format!("/api/group-tasks/{}?member_id={}", group_id, member_b.id),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(own.as_array().unwrap().len(), 1);
    assert_eq!(own[0]["title"], "for-a");
}

#[tokio::test]
async fn test_soft_deleted_group_is_gone() {
    let ctx = TestContext::new().await.unwrap();
    let (_, admin_token) = ctx.register_user("del-group").await.unwrap();

    let (_, group) = ctx
        .request(
            "POST",
            "/api/groups",
            Some(&admin_token),
            Some(json!({ "name": "Doomed" })),
        )
        .await;
    let group_id = group["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/api/groups/{}", group_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Metadata updates on the deleted group find nothing
    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/api/groups/{}", group_id),
            Some(&admin_token),
            Some(json!({ "name": "Back" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoint_is_public() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .request("GET", "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/tasks"].is_object());
}
