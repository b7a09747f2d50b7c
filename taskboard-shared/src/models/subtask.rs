/// Subtask model: checklist items belonging to a task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Subtask model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subtask {
    /// Unique subtask ID
    pub id: Uuid,

    /// Parent task
    pub task_id: Uuid,

    /// Subtask title
    pub title: String,

    /// Whether the item is checked off
    pub is_completed: bool,

    /// When the subtask was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a subtask
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubtask {
    /// Parent task
    pub task_id: Uuid,

    /// Subtask title
    pub title: String,
}

/// Input for updating a subtask
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubtask {
    /// New title
    pub title: Option<String>,

    /// New completion state
    pub is_completed: Option<bool>,
}

impl Subtask {
    /// Creates a new unchecked subtask
    pub async fn create(pool: &PgPool, data: CreateSubtask) -> Result<Self, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            INSERT INTO subtasks (task_id, title)
            VALUES ($1, $2)
            RETURNING id, task_id, title, is_completed, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.title)
        .fetch_one(pool)
        .await?;

        Ok(subtask)
    }

    /// Finds a subtask by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            "SELECT id, task_id, title, is_completed, created_at FROM subtasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(subtask)
    }

    /// Lists subtasks of a task in creation order
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let subtasks = sqlx::query_as::<_, Subtask>(
            r#"
            SELECT id, task_id, title, is_completed, created_at
            FROM subtasks
            WHERE task_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(subtasks)
    }

    /// Updates a subtask, returning the updated row
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateSubtask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subtask = sqlx::query_as::<_, Subtask>(
            r#"
            UPDATE subtasks
            SET title = COALESCE($2, title),
                is_completed = COALESCE($3, is_completed)
            WHERE id = $1
            RETURNING id, task_id, title, is_completed, created_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.is_completed)
        .fetch_optional(pool)
        .await?;

        Ok(subtask)
    }

    /// Deletes a subtask
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
