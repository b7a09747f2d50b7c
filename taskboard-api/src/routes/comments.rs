/// Task comment endpoints
///
/// Comments follow the parent task's creator/assignee access rule. Authors
/// may delete their own comments; the task creator may delete any comment
/// on their task.
///
/// # Endpoints
///
/// - `GET    /api/tasks/:id/comments` - List comments oldest first
/// - `POST   /api/tasks/:id/comments` - Add a comment
/// - `DELETE /api/tasks/:id/comments/:comment_id` - Delete a comment

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
        comment::{Comment, CommentWithAuthor, CreateComment},
        task::Task,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Comment creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Comment body
    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,
}

/// Loads the parent task and checks access
async fn load_parent_task(state: &AppState, principal: &Principal, id: Uuid) -> ApiResult<Task> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_access(principal.user_id, &task)?;

    Ok(task)
}

/// Lists a task's comments with author identities, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<CommentWithAuthor>>>> {
    load_parent_task(&state, &principal, id).await?;

    let comments = Comment::list_by_task(&state.db, id).await?;

    Ok(Json(ApiResponse::data(comments)))
}

/// Adds a comment to a task
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<Json<ApiResponse<Comment>>> {
    req.validate().map_err(ApiError::from_validation)?;

    load_parent_task(&state, &principal, id).await?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_id: id,
            user_id: principal.user_id,
            content: req.content,
        },
    )
    .await?;

    Ok(Json(ApiResponse::with_message(comment, "Comment added")))
}

/// Deletes a comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let task = load_parent_task(&state, &principal, id).await?;

    let comment = Comment::find_by_id(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    if comment.task_id != id {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    // Authors delete their own comments; the task creator moderates the rest
    if comment.user_id != principal.user_id && task.creator_id != principal.user_id {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this comment".to_string(),
        ));
    }

    Comment::delete(&state.db, comment_id).await?;

    Ok(Json(ApiResponse::message("Comment deleted")))
}
