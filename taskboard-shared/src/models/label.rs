/// Label model: per-project labels and task-label attachments.
///
/// Labels are scoped to a project; (project_id, name) is unique. Attaching is
/// idempotent via `ON CONFLICT DO NOTHING`.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Label model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    /// Unique label ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Label name, unique within the project
    pub name: String,

    /// Hex color, e.g. "#ff6600"
    pub color: String,
}

/// Input for creating a label
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLabel {
    /// Owning project
    pub project_id: Uuid,

    /// Label name
    pub name: String,

    /// Hex color (defaults to grey)
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "#808080".to_string()
}

impl Label {
    /// Creates a new label
    ///
    /// # Errors
    ///
    /// Returns an error if a label with this name already exists in the
    /// project (unique constraint).
    pub async fn create(pool: &PgPool, data: CreateLabel) -> Result<Self, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            r#"
            INSERT INTO labels (project_id, name, color)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, name, color
            "#,
        )
        .bind(data.project_id)
        .bind(data.name)
        .bind(data.color)
        .fetch_one(pool)
        .await?;

        Ok(label)
    }

    /// Finds a label by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            "SELECT id, project_id, name, color FROM labels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(label)
    }

    /// Lists labels of a project by name
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let labels = sqlx::query_as::<_, Label>(
            r#"
            SELECT id, project_id, name, color
            FROM labels
            WHERE project_id = $1
            ORDER BY name
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(labels)
    }

    /// Lists labels attached to a task
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let labels = sqlx::query_as::<_, Label>(
            r#"
            SELECT l.id, l.project_id, l.name, l.color
            FROM labels l
            JOIN task_labels tl ON tl.label_id = l.id
            WHERE tl.task_id = $1
            ORDER BY l.name
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(labels)
    }

    /// Attaches a label to a task (idempotent)
    pub async fn attach(pool: &PgPool, task_id: Uuid, label_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO task_labels (task_id, label_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(label_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Detaches a label from a task
    pub async fn detach(pool: &PgPool, task_id: Uuid, label_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_labels WHERE task_id = $1 AND label_id = $2")
            .bind(task_id)
            .bind(label_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a label (detaches from all tasks via cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_color() {
        assert_eq!(default_color(), "#808080");
    }
}
