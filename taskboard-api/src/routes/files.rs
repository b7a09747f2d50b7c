/// Project file attachment endpoints
///
/// Attachment bytes live on local disk under the configured upload
/// directory; the database row records the metadata and storage path.
///
/// # Endpoints
///
/// - `GET    /api/projects/:id/files` - List attachments
/// - `POST   /api/projects/:id/files` - Upload an attachment (multipart)
/// - `DELETE /api/projects/:id/files/:file_id` - Delete an attachment

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use taskboard_shared::{
    auth::{
        authorization::{require_project_access, AccessAction},
        verifier::Principal,
    },
    models::project_file::{CreateProjectFile, ProjectFile},
};
use tracing::warn;
use uuid::Uuid;

/// Lists a project's attachments
pub async fn list_files(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<ProjectFile>>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Read).await?;

    let files = ProjectFile::list_by_project(&state.db, id).await?;

    Ok(Json(ApiResponse::data(files)))
}

/// Uploads an attachment to a project
///
/// Accepts a multipart form with a single `file` field. The bytes are
/// written to `{upload_dir}/{uuid}_{original_name}` before the metadata row
/// is inserted; a failed insert leaves no dangling row, only an orphaned
/// file that is cleaned up best-effort.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<ProjectFile>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Write).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
        .ok_or_else(|| ApiError::BadRequest("Expected a file field".to_string()))?;

    if field.name() != Some("file") {
        return Err(ApiError::BadRequest(
            "Expected a field named 'file'".to_string(),
        ));
    }

    let file_name = field
        .file_name()
        .map(sanitize_file_name)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing file name".to_string()))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

    if bytes.len() > state.config.upload.max_bytes {
        return Err(ApiError::BadRequest(format!(
            "File exceeds the {} byte limit",
            state.config.upload.max_bytes
        )));
    }

    let storage_path = format!(
        "{}/{}_{}",
        state.config.upload.dir,
        Uuid::new_v4(),
        file_name
    );

    tokio::fs::write(&storage_path, &bytes)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to store file: {}", e)))?;

    let record = ProjectFile::create(
        &state.db,
        CreateProjectFile {
            project_id: id,
            uploader_id: principal.user_id,
            file_name,
            content_type,
            size_bytes: bytes.len() as i64,
            storage_path: storage_path.clone(),
        },
    )
    .await;

    let file = match record {
        Ok(file) => file,
        Err(e) => {
            if let Err(fs_err) = tokio::fs::remove_file(&storage_path).await {
                warn!(path = %storage_path, error = %fs_err, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    Ok(Json(ApiResponse::with_message(file, "File uploaded")))
}

/// Deletes an attachment
///
/// Removes the metadata row first; the bytes are deleted best-effort.
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, file_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    require_project_access(&state.db, principal.user_id, id, AccessAction::Write).await?;

    let file = ProjectFile::find_by_id(&state.db, file_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    if file.project_id != id {
        return Err(ApiError::NotFound("File not found".to_string()));
    }

    ProjectFile::delete(&state.db, file_id).await?;

    if let Err(e) = tokio::fs::remove_file(&file.storage_path).await {
        warn!(path = %file.storage_path, error = %e, "Failed to remove stored file");
    }

    Ok(Json(ApiResponse::message("File deleted")))
}

/// Strips path components from an uploaded file name
fn sanitize_file_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("dir\\notes.txt"), "notes.txt");
        assert_eq!(sanitize_file_name(""), "");
    }
}
