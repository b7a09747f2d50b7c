/// Authorization helpers and permission checks
///
/// This module provides role-based access control for projects and the
/// creator/assignee rule for tasks.
///
/// # Permission Model
///
/// Authorization is layered:
///
/// 1. **Global role**: users with the global `admin` role bypass project
///    checks entirely
/// 2. **Project ownership**: a project's owner has every permission on it
/// 3. **Project membership**: members act according to their
///    [`MemberRole`] and the requested [`AccessAction`]
/// 4. **Task access**: a task is visible and mutable only to its creator
///    or its current assignee (project membership alone is not enough)
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{require_project_access, AccessAction};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn archive_project(
///     pool: &PgPool,
///     user_id: Uuid,
///     project_id: Uuid,
/// ) -> Result<(), String> {
///     require_project_access(pool, user_id, project_id, AccessAction::Write)
///         .await
///         .map_err(|e| e.to_string())?;
///
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::project_member::{MemberRole, ProjectMember};
use crate::models::task::Task;
use crate::models::user::User;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Project does not exist
    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    /// User is neither owner nor member of the project
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    /// Member's role does not cover the requested action
    #[error("Insufficient permissions: {action:?} requires more than {actual:?}")]
    InsufficientRole {
        action: AccessAction,
        actual: MemberRole,
    },

    /// User is neither creator nor assignee of the task
    #[error("Not authorized to access this task")]
    NotTaskParticipant,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// What a caller wants to do with a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAction {
    /// View the project and its contents (any member)
    Read,

    /// Create or modify contents (Member+)
    Write,

    /// Remove the project or its members (Admin+)
    Delete,
}

impl AccessAction {
    /// Whether a member with the given role may perform this action
    pub fn permits(&self, role: MemberRole) -> bool {
        match self {
            AccessAction::Read => true,
            AccessAction::Write => role.has_permission(&MemberRole::Member),
            AccessAction::Delete => role.has_permission(&MemberRole::Admin),
        }
    }
}

/// Checks whether a user may perform an action on a project
///
/// Grants access when the user owns the project, holds a membership role
/// that permits the action, or carries the global `admin` role.
///
/// # Errors
///
/// - [`AuthzError::ProjectNotFound`] if the project does not exist
/// - [`AuthzError::NotMember`] if the user has no relationship to it
/// - [`AuthzError::InsufficientRole`] if their role does not cover the action
pub async fn can_access_project(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    action: AccessAction,
) -> Result<bool, AuthzError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AuthzError::ProjectNotFound(project_id))?;

    if project.owner_id == user_id {
        return Ok(true);
    }

    // Global admins can reach every project, regardless of any membership
    // row they may also hold
    if let Some(role) = User::get_role(pool, user_id).await? {
        if role.is_admin() {
            return Ok(true);
        }
    }

    if let Some(role) = ProjectMember::get_role(pool, project_id, user_id).await? {
        return Ok(action.permits(role));
    }

    Ok(false)
}

/// Checks project access and converts denial into an error
pub async fn require_project_access(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    action: AccessAction,
) -> Result<(), AuthzError> {
    if can_access_project(pool, user_id, project_id, action).await? {
        return Ok(());
    }

    match ProjectMember::get_role(pool, project_id, user_id).await? {
        Some(actual) => Err(AuthzError::InsufficientRole { action, actual }),
        None => Err(AuthzError::NotMember(project_id)),
    }
}

/// Checks whether a user may view or modify a task
///
/// Only the task's creator and its current assignee have access. This is
/// deliberately narrower than project membership.
pub fn can_access_task(user_id: Uuid, task: &Task) -> bool {
    task.creator_id == user_id || task.assignee_id == Some(user_id)
}

/// Checks task access and converts denial into an error
pub fn require_task_access(user_id: Uuid, task: &Task) -> Result<(), AuthzError> {
    if can_access_task(user_id, task) {
        return Ok(());
    }

    Err(AuthzError::NotTaskParticipant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn sample_task(creator_id: Uuid, assignee_id: Option<Uuid>) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            creator_id,
            assignee_id,
            title: "Sample".to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_action_permits() {
        // Read is open to every member role
        assert!(AccessAction::Read.permits(MemberRole::Viewer));
        assert!(AccessAction::Read.permits(MemberRole::Member));

        // Write needs Member or better
        assert!(!AccessAction::Write.permits(MemberRole::Viewer));
        assert!(AccessAction::Write.permits(MemberRole::Member));
        assert!(AccessAction::Write.permits(MemberRole::Admin));
        assert!(AccessAction::Write.permits(MemberRole::Owner));

        // Delete needs Admin or better
        assert!(!AccessAction::Delete.permits(MemberRole::Viewer));
        assert!(!AccessAction::Delete.permits(MemberRole::Member));
        assert!(AccessAction::Delete.permits(MemberRole::Admin));
        assert!(AccessAction::Delete.permits(MemberRole::Owner));
    }

    #[test]
    fn test_task_access_creator() {
        let creator = Uuid::new_v4();
        let task = sample_task(creator, None);

        assert!(can_access_task(creator, &task));
        assert!(require_task_access(creator, &task).is_ok());
    }

    #[test]
    fn test_task_access_assignee() {
        let assignee = Uuid::new_v4();
        let task = sample_task(Uuid::new_v4(), Some(assignee));

        assert!(can_access_task(assignee, &task));
    }

    #[test]
    fn test_task_access_denied_for_others() {
        let task = sample_task(Uuid::new_v4(), Some(Uuid::new_v4()));
        let stranger = Uuid::new_v4();

        assert!(!can_access_task(stranger, &task));
        assert!(matches!(
            require_task_access(stranger, &task),
            Err(AuthzError::NotTaskParticipant)
        ));
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::NotMember(Uuid::new_v4());
        assert!(err.to_string().contains("Not a member"));

        let err = AuthzError::NotTaskParticipant;
        assert!(err.to_string().contains("Not authorized"));
    }
}
