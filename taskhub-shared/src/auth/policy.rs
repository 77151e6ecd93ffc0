/// Declarative group authorization policy
///
/// Every group-scoped endpoint maps to one [`GroupAction`], and this module
/// owns the single table saying which roles may perform which action. The
/// [`authorize`] function evaluates the table uniformly: load the caller's
/// active membership role in the group, then check it against the allowed
/// set. There is no role hierarchy, only the two roles admin and member.
///
/// The assignee-only rule for group-task status updates is deliberately not
/// in this table: it is ownership of a row, not a role, and lives with the
/// group-task model.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::policy::{authorize, GroupAction};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, group_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Fails with PolicyError::RoleNotAllowed unless the caller is an admin
/// let role = authorize(&pool, GroupAction::UpdateGroup, group_id, user_id).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::membership::{GroupRole, Membership};

/// Group-scoped actions subject to role policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    /// Change a group's name or description
    UpdateGroup,

    /// Soft-delete a group
    DeleteGroup,

    /// Add a member to a group
    AddMember,

    /// Remove a member from a group
    RemoveMember,

    /// Create a group task
    CreateGroupTask,

    /// Change a group task's title, description, or due date
    UpdateGroupTask,

    /// Soft-delete a group task
    DeleteGroupTask,

    /// List a group's tasks
    ListGroupTasks,

    /// Change a group task's completion status (plus the assignee check)
    UpdateGroupTaskStatus,
}

/// The policy table: one row per action, listing the roles allowed to
/// perform it
const POLICY: &[(GroupAction, &[GroupRole])] = &[
    (GroupAction::UpdateGroup, &[GroupRole::Admin]),
    (GroupAction::DeleteGroup, &[GroupRole::Admin]),
    (GroupAction::AddMember, &[GroupRole::Admin]),
    (GroupAction::RemoveMember, &[GroupRole::Admin]),
    (GroupAction::CreateGroupTask, &[GroupRole::Admin]),
    (GroupAction::UpdateGroupTask, &[GroupRole::Admin]),
    (GroupAction::DeleteGroupTask, &[GroupRole::Admin]),
    (
        GroupAction::ListGroupTasks,
        &[GroupRole::Admin, GroupRole::Member],
    ),
    (
        GroupAction::UpdateGroupTaskStatus,
        &[GroupRole::Admin, GroupRole::Member],
    ),
];

/// Error type for policy evaluation
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Caller has no active membership in the group
    #[error("Not a member of group {0}")]
    NotMember(Uuid),

    /// Caller is a member but their role is not in the allowed set
    #[error("Role {role:?} is not allowed to perform {action:?}")]
    RoleNotAllowed {
        action: GroupAction,
        role: GroupRole,
    },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Returns the roles allowed to perform an action
pub fn allowed_roles(action: GroupAction) -> &'static [GroupRole] {
    POLICY
        .iter()
        .find(|(a, _)| *a == action)
        .map(|(_, roles)| *roles)
        .unwrap_or(&[])
}

/// Authorizes a group-scoped action for a caller
///
/// Loads the caller's active membership role in the group and checks it
/// against the policy table.
///
/// # Returns
///
/// The caller's role on success, so handlers can branch on it (e.g. the
/// admin-vs-member task listing)
///
/// # Errors
///
/// - `PolicyError::NotMember` if the caller has no active membership
/// - `PolicyError::RoleNotAllowed` if their role is not in the allowed set
/// - `PolicyError::DatabaseError` if the role lookup fails
pub async fn authorize(
    pool: &PgPool,
    action: GroupAction,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<GroupRole, PolicyError> {
    let role = Membership::get_role(pool, group_id, user_id)
        .await?
        .ok_or(PolicyError::NotMember(group_id))?;

    if !allowed_roles(action).contains(&role) {
        return Err(PolicyError::RoleNotAllowed { action, role });
    }

    Ok(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_only_actions() {
        for action in [
            GroupAction::UpdateGroup,
            GroupAction::DeleteGroup,
            GroupAction::AddMember,
            GroupAction::RemoveMember,
            GroupAction::CreateGroupTask,
            GroupAction::UpdateGroupTask,
            GroupAction::DeleteGroupTask,
        ] {
            let roles = allowed_roles(action);
            assert!(roles.contains(&GroupRole::Admin), "{:?}", action);
            assert!(!roles.contains(&GroupRole::Member), "{:?}", action);
        }
    }

    #[test]
    fn test_member_visible_actions() {
        for action in [
            GroupAction::ListGroupTasks,
            GroupAction::UpdateGroupTaskStatus,
        ] {
            let roles = allowed_roles(action);
            assert!(roles.contains(&GroupRole::Admin), "{:?}", action);
            assert!(roles.contains(&GroupRole::Member), "{:?}", action);
        }
    }

    #[test]
    fn test_every_action_has_a_policy_row() {
        for action in [
            GroupAction::UpdateGroup,
            GroupAction::DeleteGroup,
            GroupAction::AddMember,
            GroupAction::RemoveMember,
            GroupAction::CreateGroupTask,
            GroupAction::UpdateGroupTask,
            GroupAction::DeleteGroupTask,
            GroupAction::ListGroupTasks,
            GroupAction::UpdateGroupTaskStatus,
        ] {
            assert!(!allowed_roles(action).is_empty(), "{:?}", action);
        }
    }
}
