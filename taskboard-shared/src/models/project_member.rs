/// Project membership model and database operations
///
/// Implements the many-to-many relationship between users and projects with
/// role-based access control. One row per (project, user); the project owner
/// is auto-added with the `owner` role at project creation.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('owner', 'admin', 'member', 'viewer');
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'member',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: full control, delete project
/// - **admin**: manage members and delete project
/// - **member**: create and edit tasks
/// - **viewer**: read-only access

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Per-project membership role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Full control over the project
    Owner,

    /// Can manage members and delete the project
    Admin,

    /// Can create and edit tasks
    Member,

    /// Read-only access
    Viewer,
}

impl MemberRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
            MemberRole::Viewer => "viewer",
        }
    }

    /// Checks if this role has the permission level of the required role
    ///
    /// Hierarchy: Owner > Admin > Member > Viewer
    pub fn has_permission(&self, required: &MemberRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    /// Returns numeric permission level for comparison
    fn permission_level(&self) -> u8 {
        match self {
            MemberRole::Owner => 4,
            MemberRole::Admin => 3,
            MemberRole::Member => 2,
            MemberRole::Viewer => 1,
        }
    }
}

/// Membership model representing a user-project relationship with role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: MemberRole,

    /// When the user joined the project
    pub joined_at: DateTime<Utc>,
}

/// Input for adding a user to a project
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default = "default_role")]
    pub role: MemberRole,
}

fn default_role() -> MemberRole {
    MemberRole::Member
}

/// Membership row joined with the member's identity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectMemberWithUser {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: MemberRole,

    /// When the user joined the project
    pub joined_at: DateTime<Utc>,

    /// Member display name
    pub full_name: String,

    /// Member email
    pub email: String,
}

impl ProjectMember {
    /// Adds a user to a project
    ///
    /// # Errors
    ///
    /// Returns an error if the membership already exists (unique constraint)
    /// or the project/user does not exist.
    pub async fn create(pool: &PgPool, data: CreateProjectMember) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING project_id, user_id, role, joined_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds a specific membership
    pub async fn find(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT project_id, user_id, role, joined_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Checks if a user is a member of a project (any role)
    pub async fn has_access(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Gets a user's role in a project
    pub async fn get_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MemberRole>, sqlx::Error> {
        let role: Option<MemberRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Lists members of a project with their identities, owners first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMemberWithUser>, sqlx::Error> {
        let members = sqlx::query_as::<_, ProjectMemberWithUser>(
            r#"
            SELECT pm.project_id, pm.user_id, pm.role, pm.joined_at,
                   u.full_name, u.email
            FROM project_members pm
            JOIN users u ON u.id = pm.user_id
            WHERE pm.project_id = $1
            ORDER BY pm.role, pm.joined_at
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Removes a user from a project
    pub async fn remove(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_as_str() {
        assert_eq!(MemberRole::Owner.as_str(), "owner");
        assert_eq!(MemberRole::Admin.as_str(), "admin");
        assert_eq!(MemberRole::Member.as_str(), "member");
        assert_eq!(MemberRole::Viewer.as_str(), "viewer");
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(MemberRole::Owner.has_permission(&MemberRole::Admin));
        assert!(MemberRole::Owner.has_permission(&MemberRole::Viewer));
        assert!(MemberRole::Admin.has_permission(&MemberRole::Member));
        assert!(MemberRole::Member.has_permission(&MemberRole::Viewer));

        assert!(!MemberRole::Viewer.has_permission(&MemberRole::Member));
        assert!(!MemberRole::Member.has_permission(&MemberRole::Admin));
        assert!(!MemberRole::Admin.has_permission(&MemberRole::Owner));
    }

    #[test]
    fn test_role_self_permission() {
        for role in [
            MemberRole::Owner,
            MemberRole::Admin,
            MemberRole::Member,
            MemberRole::Viewer,
        ] {
            assert!(role.has_permission(&role));
        }
    }

    #[test]
    fn test_default_role_is_member() {
        assert_eq!(default_role(), MemberRole::Member);
    }
}
