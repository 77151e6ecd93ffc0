/// Group and membership endpoints
///
/// # Endpoints
///
/// - `POST   /api/groups` - Create a group (creator becomes its admin)
/// - `PUT    /api/groups/{group_id}` - Update group metadata (admin)
/// - `DELETE /api/groups/{group_id}` - Soft-delete a group (admin)
/// - `POST   /api/groups/{group_id}/members` - Add a member (admin)
/// - `DELETE /api/groups/{group_id}/members` - Remove a member (admin)
///
/// Role requirements come from the authorization policy table; see
/// [`taskhub_shared::auth::policy`]. Removing the last admin of a group is
/// rejected so every group always has at least one.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::policy::{authorize, GroupAction},
    models::{
        group::{CreateGroup, Group, UpdateGroup},
        membership::{GroupRole, Membership},
        notification::Notification,
        user::User,
    },
};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
};

/// Create group request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupRequest {
    /// Group name
    #[validate(length(min = 1, max = 100, message = "Group name is required"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Group metadata update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupRequest {
    /// New name
    #[validate(length(min = 1, max = 100, message = "Group name must not be empty"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Membership change request (add or remove)
#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberRequest {
    /// The user being added or removed
    pub member_id: Uuid,
}

/// Group representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupResponse {
    /// Group ID
    pub id: Uuid,

    /// Group name
    pub name: String,

    /// Description
    pub description: Option<String>,

    /// When the group was created
    pub created_at: DateTime<Utc>,

    /// When the group was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

/// Membership change response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    /// Group ID
    pub group_id: Uuid,

    /// The affected user
    pub member_id: Uuid,

    /// What happened
    pub message: String,
}

/// Create a group
///
/// The caller becomes the group's first (and only) admin.
#[utoipa::path(
    post,
    path = "/api/groups",
    tag = "groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_group(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<GroupResponse>)> {
    req.validate()?;

    let group = Group::create_with_admin(
        &state.db,
        CreateGroup {
            name: req.name,
            description: req.description,
        },
        user.id,
    )
    .await?;

    tracing::info!(user_id = %user.id, group_id = %group.id, "Group created");

    Ok((StatusCode::CREATED, Json(group.into())))
}

/// Update a group's metadata (admin only)
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or empty update
/// - `403 Forbidden`: caller is not an admin of the group
/// - `404 Not Found`: group does not exist or is deleted
#[utoipa::path(
    put,
    path = "/api/groups/{group_id}",
    tag = "groups",
    params(("group_id" = Uuid, Path, description = "Group ID")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Updated group", body = GroupResponse),
        (status = 403, description = "Not an admin of this group"),
        (status = 404, description = "Group not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_group(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<UpdateGroupRequest>,
) -> ApiResult<Json<GroupResponse>> {
    req.validate()?;

    authorize(&state.db, GroupAction::UpdateGroup, group_id, user.id).await?;

    let update = UpdateGroup {
        name: req.name,
        description: req.description,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest("No valid fields to update".to_string()));
    }

    let group = Group::update(&state.db, group_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    tracing::info!(user_id = %user.id, group_id = %group.id, "Group updated");

    Ok(Json(group.into()))
}

/// Soft-delete a group (admin only)
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin of the group
/// - `404 Not Found`: group does not exist or was already deleted
#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}",
    tag = "groups",
    params(("group_id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group deleted"),
        (status = 403, description = "Not an admin of this group"),
        (status = 404, description = "Group not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorize(&state.db, GroupAction::DeleteGroup, group_id, user.id).await?;

    let deleted = Group::soft_delete(&state.db, group_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }

    tracing::info!(user_id = %user.id, %group_id, "Group deleted");

    Ok(Json(
        serde_json::json!({ "message": "Group deleted successfully" }),
    ))
}

/// Add a member to a group (admin only)
///
/// The new member gets a notification about the invitation.
///
/// # Errors
///
/// - `400 Bad Request`: user is already an active member
/// - `403 Forbidden`: caller is not an admin of the group
/// - `404 Not Found`: the invited user does not exist
#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members",
    tag = "groups",
    params(("group_id" = Uuid, Path, description = "Group ID")),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member added", body = MemberResponse),
        (status = 400, description = "Already a member"),
        (status = 403, description = "Not an admin of this group"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    authorize(&state.db, GroupAction::AddMember, group_id, user.id).await?;

    // The invitee must be a real, active account
    let invitee = User::find_by_id(&state.db, req.member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let group = Group::find_active(&state.db, group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let added = Membership::add(&state.db, group_id, invitee.id, GroupRole::Member).await?;
    if added.is_none() {
        return Err(ApiError::BadRequest(
            "User is already a member of this group".to_string(),
        ));
    }

    let message = format!("You have been added to the group \"{}\"", group.name);
    Notification::create(&state.db, invitee.id, &message).await?;

    tracing::info!(admin_id = %user.id, member_id = %invitee.id, %group_id, "Member added");

    Ok(Json(MemberResponse {
        group_id,
        member_id: invitee.id,
        message: "Member added successfully".to_string(),
    }))
}

/// Remove a member from a group (admin only)
///
/// A group must retain at least one admin at all times; removing the last
/// admin is rejected.
///
/// # Errors
///
/// - `400 Bad Request`: removal would leave the group without an admin
/// - `403 Forbidden`: caller is not an admin of the group
/// - `404 Not Found`: the user is not an active member of the group
#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}/members",
    tag = "groups",
    params(("group_id" = Uuid, Path, description = "Group ID")),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member removed", body = MemberResponse),
        (status = 400, description = "Cannot remove the last admin"),
        (status = 403, description = "Not an admin of this group"),
        (status = 404, description = "Membership not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    authorize(&state.db, GroupAction::RemoveMember, group_id, user.id).await?;

    let membership = Membership::find_active(&state.db, group_id, req.member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    if membership.role == GroupRole::Admin {
        let admins = Membership::count_active_admins(&state.db, group_id).await?;
        if admins <= 1 {
            return Err(ApiError::BadRequest(
                "Cannot remove the last admin of the group".to_string(),
            ));
        }
    }

    Membership::remove(&state.db, group_id, req.member_id).await?;

    tracing::info!(admin_id = %user.id, member_id = %req.member_id, %group_id, "Member removed");

    Ok(Json(MemberResponse {
        group_id,
        member_id: req.member_id,
        message: "Member removed successfully".to_string(),
    }))
}
