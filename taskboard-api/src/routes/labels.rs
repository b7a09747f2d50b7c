/// Project label endpoints
///
/// Labels belong to a project and are attached to tasks through the task
/// routes. Names are unique per project.
///
/// # Endpoints
///
/// - `GET    /api/projects/:id/labels` - List a project's labels
/// - `POST   /api/projects/:id/labels` - Create a label
/// - `DELETE /api/projects/:id/labels/:label_id` - Delete a label

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
    models::label::{CreateLabel, Label},
};
use uuid::Uuid;
use validator::Validate;

/// Label creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLabelRequest {
    /// Label name, unique within the project
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Hex color, e.g. "#ff7700" (defaults to grey)
    #[validate(length(min = 4, max = 7, message = "Color must be a hex value"))]
    pub color: Option<String>,
}

/// Lists a project's labels
pub async fn list_labels(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<Label>>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Read).await?;

    let labels = Label::list_by_project(&state.db, id).await?;

    Ok(Json(ApiResponse::data(labels)))
}

/// Creates a label in a project
pub async fn create_label(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateLabelRequest>,
) -> ApiResult<Json<ApiResponse<Label>>> {
    req.validate().map_err(ApiError::from_validation)?;

    require_project_access(&state.db, principal.user_id, id, AccessAction::Write).await?;

    let label = Label::create(
        &state.db,
        CreateLabel {
            project_id: id,
            name: req.name,
            color: req.color.unwrap_or_else(|| "#808080".to_string()),
        },
    )
    .await?;

    Ok(Json(ApiResponse::with_message(label, "Label created")))
}

/// Deletes a label
///
/// Attachments to tasks cascade away with the label.
pub async fn delete_label(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, label_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Write).await?;

    // The label must belong to the project named in the path
    let label = Label::find_by_id(&state.db, label_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Label not found".to_string()))?;

    if label.project_id != id {
        return Err(ApiError::NotFound("Label not found".to_string()));
    }

    Label::delete(&state.db, label_id).await?;

    Ok(Json(ApiResponse::message("Label deleted")))
}
