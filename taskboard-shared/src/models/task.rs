/// Task model and database operations
///
/// Tasks are the core work items of the system. Every task belongs to a
/// project, has a creator, and optionally a single assignee.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     creator_id UUID NOT NULL REFERENCES users(id),
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     due_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{Task, CreateTask, TaskPriority};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     title: "Write release notes".to_string(),
///     description: None,
///     priority: TaskPriority::High,
///     creator_id: user_id,
///     assignee_id: None,
///     due_date: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to string for database storage and display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority
    Low,

    /// Default priority
    Medium,

    /// High priority
    High,
}

impl TaskPriority {
    /// Converts priority to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// User who created the task
    pub creator_id: Uuid,

    /// Assigned user, if any
    pub assignee_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    /// Project ID
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority (defaults to Medium)
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    /// Creating user
    pub creator_id: Uuid,

    /// Optional initial assignee
    pub assignee_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for updating a task
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Filters for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Restrict to one project
    pub project_id: Option<Uuid>,

    /// Restrict to one status
    pub status: Option<TaskStatus>,

    /// Restrict to one priority
    pub priority: Option<TaskPriority>,

    /// Restrict to one assignee
    pub assignee_id: Option<Uuid>,

    /// Restrict to tasks the user created or is assigned to
    pub participant_id: Option<Uuid>,
}

/// Per-status task counts for dashboard aggregation
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStatusCounts {
    /// Tasks in `todo`
    pub todo: i64,

    /// Tasks in `in_progress`
    pub in_progress: i64,

    /// Tasks in `done`
    pub done: i64,
}

impl Task {
    /// Creates a new task in `todo` state
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, priority, creator_id,
                               assignee_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, project_id, title, description, status, priority,
                      creator_id, assignee_id, due_date, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.creator_id)
        .bind(data.assignee_id)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority,
                   creator_id, assignee_id, due_date, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates mutable task fields, returning the updated row
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                due_date = COALESCE($5, due_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, title, description, status, priority,
                      creator_id, assignee_id, due_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Sets the workflow status
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, title, description, status, priority,
                      creator_id, assignee_id, due_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Sets or clears the assignee
    pub async fn set_assignee(
        pool: &PgPool,
        id: Uuid,
        assignee_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET assignee_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, title, description, status, priority,
                      creator_id, assignee_id, due_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(assignee_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Subtasks, comments, and label attachments cascade. Audit rows remain.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks matching a filter with pagination, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority,
                   creator_id, assignee_id, due_date, created_at, updated_at
            FROM tasks
            WHERE ($1::uuid IS NULL OR project_id = $1)
              AND ($2::task_status IS NULL OR status = $2)
              AND ($3::task_priority IS NULL OR priority = $3)
              AND ($4::uuid IS NULL OR assignee_id = $4)
              AND ($5::uuid IS NULL OR creator_id = $5 OR assignee_id = $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.project_id)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(filter.assignee_id)
        .bind(filter.participant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks matching a filter
    pub async fn count(pool: &PgPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM tasks
            WHERE ($1::uuid IS NULL OR project_id = $1)
              AND ($2::task_status IS NULL OR status = $2)
              AND ($3::task_priority IS NULL OR priority = $3)
              AND ($4::uuid IS NULL OR assignee_id = $4)
              AND ($5::uuid IS NULL OR creator_id = $5 OR assignee_id = $5)
            "#,
        )
        .bind(filter.project_id)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(filter.assignee_id)
        .bind(filter.participant_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Per-status counts over tasks the user created or is assigned to
    pub async fn status_counts_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<TaskStatusCounts, sqlx::Error> {
        let (todo, in_progress, done): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'todo'),
                   COUNT(*) FILTER (WHERE status = 'in_progress'),
                   COUNT(*) FILTER (WHERE status = 'done')
            FROM tasks
            WHERE creator_id = $1 OR assignee_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(TaskStatusCounts {
            todo,
            in_progress,
            done,
        })
    }

    /// Counts unfinished tasks past their due date for a user
    pub async fn count_overdue_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM tasks
            WHERE (creator_id = $1 OR assignee_id = $1)
              AND status <> 'done'
              AND due_date IS NOT NULL
              AND due_date < NOW()
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_task_priority_as_str() {
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Medium.as_str(), "medium");
        assert_eq!(TaskPriority::High.as_str(), "high");
    }

    #[test]
    fn test_status_serde_round_trip() {
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            let json = serde_json::to_string(&status).unwrap();
            let back: TaskStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
        }

        let status: TaskStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn test_default_priority() {
        assert_eq!(default_priority(), TaskPriority::Medium);
    }

    #[test]
    fn test_empty_filter() {
        let filter = TaskFilter::default();
        assert!(filter.project_id.is_none());
        assert!(filter.status.is_none());
        assert!(filter.priority.is_none());
        assert!(filter.assignee_id.is_none());
        assert!(filter.participant_id.is_none());
    }
}
