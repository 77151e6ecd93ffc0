/// Machine-readable API description
///
/// Assembles the OpenAPI document from the `#[utoipa::path]` annotations on
/// the route handlers. The document is served at
/// `/api-docs/openapi.json` with an interactive Swagger UI mounted next to
/// it; see [`crate::app::build_router`].

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::routes;

/// The OpenAPI document for the whole REST surface
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskhub API",
        description = "Multi-user task management: personal tasks, categories, groups, group tasks, and notifications."
    ),
    paths(
        routes::health::health_check,
        routes::auth::register,
        routes::auth::login,
        routes::auth::get_profile,
        routes::auth::update_profile,
        routes::tasks::create_task,
        routes::tasks::list_tasks,
        routes::tasks::update_task,
        routes::tasks::delete_task,
        routes::categories::create_category,
        routes::categories::list_categories,
        routes::categories::list_category_tasks,
        routes::categories::update_category,
        routes::categories::delete_category,
        routes::groups::create_group,
        routes::groups::update_group,
        routes::groups::delete_group,
        routes::groups::add_member,
        routes::groups::remove_member,
        routes::group_tasks::create_group_task,
        routes::group_tasks::list_group_tasks,
        routes::group_tasks::update_group_task,
        routes::group_tasks::delete_group_task,
        routes::group_tasks::update_group_task_status,
        routes::notifications::list_notifications,
        routes::notifications::mark_notifications_read,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::auth::RegisterRequest,
        routes::auth::LoginRequest,
        routes::auth::UpdateProfileRequest,
        routes::auth::UserResponse,
        routes::auth::AuthResponse,
        routes::auth::ProfileResponse,
        routes::tasks::CreateTaskRequest,
        routes::tasks::UpdateTaskRequest,
        routes::tasks::TaskResponse,
        routes::categories::CategoryRequest,
        routes::categories::CategoryResponse,
        routes::groups::CreateGroupRequest,
        routes::groups::UpdateGroupRequest,
        routes::groups::MemberRequest,
        routes::groups::GroupResponse,
        routes::groups::MemberResponse,
        routes::group_tasks::CreateGroupTaskRequest,
        routes::group_tasks::UpdateGroupTaskRequest,
        routes::group_tasks::DeleteGroupTaskRequest,
        routes::group_tasks::UpdateStatusRequest,
        routes::group_tasks::GroupTaskResponse,
        routes::notifications::NotificationResponse,
        routes::notifications::MarkReadResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration, login, and profiles"),
        (name = "tasks", description = "Personal tasks"),
        (name = "categories", description = "Task categories"),
        (name = "groups", description = "Groups and membership"),
        (name = "group-tasks", description = "Group tasks"),
        (name = "notifications", description = "Notifications"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer-token security scheme referenced by the handlers
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("Document should serialize");
        assert!(json.contains("/api/tasks"));
        assert!(json.contains("/api/group-tasks"));
        assert!(json.contains("bearer_auth"));
    }
}
