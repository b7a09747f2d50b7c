/// Subtask endpoints
///
/// Subtasks are checklist items under a task; access follows the parent
/// task's creator/assignee rule.
///
/// # Endpoints
///
/// - `GET    /api/tasks/:id/subtasks` - List a task's subtasks
/// - `POST   /api/tasks/:id/subtasks` - Create a subtask
/// - `PUT    /api/tasks/:id/subtasks/:subtask_id` - Rename or toggle
/// - `DELETE /api/tasks/:id/subtasks/:subtask_id` - Delete a subtask

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
    auth::{authorization::require_task_access, verifier::Principal},
    models::{
        subtask::{CreateSubtask, Subtask, UpdateSubtask},
        task::Task,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Subtask creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubtaskRequest {
    /// Subtask title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
}

/// Subtask update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubtaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New completion state
    pub is_completed: Option<bool>,
}

/// Checks the principal may touch the parent task
async fn check_parent_task(state: &AppState, principal: &Principal, id: Uuid) -> ApiResult<()> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_access(principal.user_id, &task)?;

    Ok(())
}

/// Lists a task's subtasks in creation order
pub async fn list_subtasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<Subtask>>>> {
    check_parent_task(&state, &principal, id).await?;

    let subtasks = Subtask::list_by_task(&state.db, id).await?;

    Ok(Json(ApiResponse::data(subtasks)))
}

/// Creates a subtask under a task
pub async fn create_subtask(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateSubtaskRequest>,
) -> ApiResult<Json<ApiResponse<Subtask>>> {
    req.validate().map_err(ApiError::from_validation)?;

    check_parent_task(&state, &principal, id).await?;

    let subtask = Subtask::create(
        &state.db,
        CreateSubtask {
            task_id: id,
            title: req.title,
        },
    )
    .await?;

    Ok(Json(ApiResponse::with_message(subtask, "Subtask created")))
}

/// Updates a subtask
pub async fn update_subtask(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, subtask_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateSubtaskRequest>,
) -> ApiResult<Json<ApiResponse<Subtask>>> {
    req.validate().map_err(ApiError::from_validation)?;

    check_parent_task(&state, &principal, id).await?;

    // The subtask must belong to the task named in the path
    let existing = Subtask::find_by_id(&state.db, subtask_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subtask not found".to_string()))?;

    if existing.task_id != id {
        return Err(ApiError::NotFound("Subtask not found".to_string()));
    }

    let subtask = Subtask::update(
        &state.db,
        subtask_id,
        UpdateSubtask {
            title: req.title,
            is_completed: req.is_completed,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Subtask not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(subtask, "Subtask updated")))
}

/// Deletes a subtask
pub async fn delete_subtask(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, subtask_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    check_parent_task(&state, &principal, id).await?;

    let existing = Subtask::find_by_id(&state.db, subtask_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subtask not found".to_string()))?;

    if existing.task_id != id {
        return Err(ApiError::NotFound("Subtask not found".to_string()));
    }

    Subtask::delete(&state.db, subtask_id).await?;

    Ok(Json(ApiResponse::message("Subtask deleted")))
}
