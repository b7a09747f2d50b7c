/// Project endpoints
///
/// Projects are the unit of collaboration: they own tasks, labels, and file
/// attachments, and carry a membership list. Every mutation here is recorded
/// in the audit trail; a failed audit write never fails the request.
///
/// # Endpoints
///
/// - `GET    /api/projects` - List projects visible to the principal
/// - `POST   /api/projects` - Create a project (principal becomes owner)
/// - `GET    /api/projects/:id` - Fetch a project
/// - `PUT    /api/projects/:id` - Update name/description/status
/// - `DELETE /api/projects/:id` - Delete a project
/// - `GET    /api/projects/:id/progress` - Task-completion progress

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ApiResponse, PageQuery, Pagination},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    audit,
    auth::{
        authorization::{require_project_access, AccessAction},
        verifier::Principal,
    },
    models::{
        audit_log::{AuditAction, AuditEntity, RecordAuditLog},
        project::{CreateProject, Project, ProjectProgress, ProjectStatus, UpdateProject},
        project_member::{CreateProjectMember, MemberRole, ProjectMember},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,
}

/// Project update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    /// New status
    pub status: Option<ProjectStatus>,
}

/// Lists projects visible to the principal
///
/// Global admins see every project; everyone else sees projects they own or
/// belong to.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    page: PageQuery,
) -> ApiResult<Json<ApiResponse<Vec<Project>>>> {
    let (page_num, limit, offset) = page.normalize();

    let is_admin = User::get_role(&state.db, principal.user_id)
        .await?
        .map(|r| r.is_admin())
        .unwrap_or(false);

    let (projects, total) = if is_admin {
        (
            Project::list_all(&state.db, limit, offset).await?,
            Project::count_all(&state.db).await?,
        )
    } else {
        (
            Project::list_for_user(&state.db, principal.user_id, limit, offset).await?,
            Project::count_for_user(&state.db, principal.user_id).await?,
        )
    };

    Ok(Json(ApiResponse::paginated(
        projects,
        Pagination::new(page_num, limit, total),
    )))
}

/// Creates a project with the principal as owner
///
/// The owner is also added to `project_members` with role `owner`, so
/// membership listings include them.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<ApiResponse<Project>>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            owner_id: principal.user_id,
        },
    )
    .await?;

    ProjectMember::create(
        &state.db,
        CreateProjectMember {
            project_id: project.id,
            user_id: principal.user_id,
            role: MemberRole::Owner,
        },
    )
    .await?;

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Project,
            entity_id: project.id,
            action: AuditAction::Created,
            user_id: principal.user_id,
            old_values: None,
            new_values: serde_json::to_value(&project).ok(),
            changes: None,
        },
    )
    .await;

    Ok(Json(ApiResponse::with_message(project, "Project created")))
}

/// Fetches one project
pub async fn get_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Project>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Read).await?;

    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ApiResponse::data(project)))
}

/// Updates a project
pub async fn update_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ApiResponse<Project>>> {
    req.validate().map_err(ApiError::from_validation)?;

    require_project_access(&state.db, principal.user_id, id, AccessAction::Write).await?;

    let before = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let old_values = serde_json::to_value(&before).ok();
    let new_values = serde_json::to_value(&project).ok();
    let changes = match (&old_values, &new_values) {
        (Some(old), Some(new)) => audit::diff_values(old, new),
        _ => None,
    };

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Project,
            entity_id: project.id,
            action: AuditAction::Updated,
            user_id: principal.user_id,
            old_values,
            new_values,
            changes,
        },
    )
    .await;

    Ok(Json(ApiResponse::with_message(project, "Project updated")))
}

/// Deletes a project
///
/// Tasks, memberships, labels, and file records cascade. Audit rows remain.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Delete).await?;

    let before = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let deleted = Project::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Project,
            entity_id: id,
            action: AuditAction::Deleted,
            user_id: principal.user_id,
            old_values: serde_json::to_value(&before).ok(),
            new_values: None,
            changes: None,
        },
    )
    .await;

    Ok(Json(ApiResponse::message("Project deleted")))
}

/// Task-completion progress for a project
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<ProjectProgress>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Read).await?;

    let progress = Project::progress(&state.db, id).await?;

    Ok(Json(ApiResponse::data(progress)))
}
