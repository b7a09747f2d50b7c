/// Project file model: metadata for uploaded attachments.
///
/// Only metadata lives in the database; the bytes are written by the API
/// crate to the configured upload directory (the object-storage
/// collaborator), addressed by `storage_path`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Uploaded file metadata
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectFile {
    /// Unique file ID
    pub id: Uuid,

    /// Project the file belongs to
    pub project_id: Uuid,

    /// User who uploaded the file
    pub uploader_id: Uuid,

    /// Original file name
    pub file_name: String,

    /// MIME type as supplied by the client
    pub content_type: String,

    /// Size in bytes
    pub size_bytes: i64,

    /// Location in the storage backend
    pub storage_path: String,

    /// When the file was uploaded
    pub created_at: DateTime<Utc>,
}

/// Input for recording an uploaded file
#[derive(Debug, Clone)]
pub struct CreateProjectFile {
    /// Project the file belongs to
    pub project_id: Uuid,

    /// User who uploaded the file
    pub uploader_id: Uuid,

    /// Original file name
    pub file_name: String,

    /// MIME type
    pub content_type: String,

    /// Size in bytes
    pub size_bytes: i64,

    /// Location in the storage backend
    pub storage_path: String,
}

impl ProjectFile {
    /// Records an uploaded file
    pub async fn create(pool: &PgPool, data: CreateProjectFile) -> Result<Self, sqlx::Error> {
        let file = sqlx::query_as::<_, ProjectFile>(
            r#"
            INSERT INTO project_files (project_id, uploader_id, file_name, content_type,
                                       size_bytes, storage_path)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, project_id, uploader_id, file_name, content_type,
                      size_bytes, storage_path, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.uploader_id)
        .bind(data.file_name)
        .bind(data.content_type)
        .bind(data.size_bytes)
        .bind(data.storage_path)
        .fetch_one(pool)
        .await?;

        Ok(file)
    }

    /// Finds a file by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let file = sqlx::query_as::<_, ProjectFile>(
            r#"
            SELECT id, project_id, uploader_id, file_name, content_type,
                   size_bytes, storage_path, created_at
            FROM project_files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(file)
    }

    /// Lists files of a project, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let files = sqlx::query_as::<_, ProjectFile>(
            r#"
            SELECT id, project_id, uploader_id, file_name, content_type,
                   size_bytes, storage_path, created_at
            FROM project_files
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(files)
    }

    /// Deletes the metadata row
    ///
    /// Removing the stored bytes is the caller's responsibility.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
