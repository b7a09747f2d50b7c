/// Project membership endpoints
///
/// # Endpoints
///
/// - `GET    /api/projects/:id/members` - List members with identities
/// - `POST   /api/projects/:id/members` - Add a member
/// - `DELETE /api/projects/:id/members/:user_id` - Remove a member

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::{
        authorization::{require_project_access, AccessAction},
        verifier::Principal,
    },
    models::{
        project::Project,
        project_member::{
            CreateProjectMember, MemberRole, ProjectMember, ProjectMemberWithUser,
        },
        user::User,
    },
};
use uuid::Uuid;

/// Member addition request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add
    pub user_id: Uuid,

    /// Role to assign (defaults to member)
    #[serde(default = "default_role")]
    pub role: MemberRole,
}

fn default_role() -> MemberRole {
    MemberRole::Member
}

/// Lists project members with their identities
pub async fn list_members(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<ProjectMemberWithUser>>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Read).await?;

    let members = ProjectMember::list_by_project(&state.db, id).await?;

    Ok(Json(ApiResponse::data(members)))
}

/// Adds a user to a project
///
/// Requires delete-level access (owner or admin); handing out the `owner`
/// role is reserved for the project owner themselves.
pub async fn add_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<ApiResponse<ProjectMember>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Delete).await?;

    if req.role == MemberRole::Owner {
        let project = Project::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

        if project.owner_id != principal.user_id {
            return Err(ApiError::Forbidden(
                "Only the project owner can grant the owner role".to_string(),
            ));
        }
    }

    // The user must exist before they can be added
    User::find_by_id(&state.db, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if ProjectMember::find(&state.db, id, req.user_id).await?.is_some() {
        return Err(ApiError::Conflict(
            "User is already a member of this project".to_string(),
        ));
    }

    let member = ProjectMember::create(
        &state.db,
        CreateProjectMember {
            project_id: id,
            user_id: req.user_id,
            role: req.role,
        },
    )
    .await?;

    Ok(Json(ApiResponse::with_message(member, "Member added")))
}

/// Removes a user from a project
///
/// The project owner cannot be removed; transfer or delete the project
/// instead.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Delete).await?;

    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if project.owner_id == user_id {
        return Err(ApiError::Forbidden(
            "The project owner cannot be removed".to_string(),
        ));
    }

    let removed = ProjectMember::remove(&state.db, id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Membership not found".to_string()));
    }

    Ok(Json(ApiResponse::message("Member removed")))
}
