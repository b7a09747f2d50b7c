/// Task endpoints
///
/// Creating a task requires write access to its project; once created, a
/// task is visible and mutable only to its creator and current assignee.
/// Every mutation is recorded in the audit trail; a failed audit write never
/// fails the request.
///
/// # Endpoints
///
/// - `GET    /api/tasks` - List tasks with filters and pagination
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks/:id` - Fetch a task
/// - `PUT    /api/tasks/:id` - Update title/description/priority/due date
/// - `DELETE /api/tasks/:id` - Delete a task
/// - `PUT    /api/tasks/:id/status` - Change workflow status
/// - `PUT    /api/tasks/:id/assign` - Assign a user
/// - `PUT    /api/tasks/:id/unassign` - Clear the assignee
/// - `PUT    /api/tasks/:id/labels/:label_id` - Attach a label
/// - `DELETE /api/tasks/:id/labels/:label_id` - Detach a label

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ApiResponse, PageParams, Pagination},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use taskboard_shared::{
    audit,
    auth::{
        authorization::{require_project_access, require_task_access, AccessAction},
        verifier::Principal,
    },
    models::{
        audit_log::{AuditAction, AuditEntity, RecordAuditLog},
        label::Label,
        task::{CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Project the task belongs to
    pub project_id: Uuid,

    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    /// Priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Optional initial assignee
    pub assignee_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Task update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// Target status
    pub status: TaskStatus,
}

/// Assignment request
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// User to assign
    pub assignee_id: Uuid,
}

/// Query parameters for task listing
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    /// Restrict to one project
    pub project_id: Option<Uuid>,

    /// Restrict to one status
    pub status: Option<TaskStatus>,

    /// Restrict to one priority
    pub priority: Option<TaskPriority>,

    /// Restrict to one assignee
    pub assignee_id: Option<Uuid>,

    /// Page number, 1-based
    pub page: Option<i64>,

    /// Page size
    pub limit: Option<i64>,
}

/// Loads a task and checks the principal may touch it
///
/// A task the principal cannot access reads as absent, so outsiders cannot
/// probe for task IDs.
async fn load_accessible_task(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> ApiResult<Task> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_access(principal.user_id, &task)?;

    Ok(task)
}

/// Lists tasks with filters and pagination
///
/// Results are scoped to tasks the principal created or is assigned to;
/// global admins see everything. Filtering by project additionally requires
/// read access to that project.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Task>>>> {
    if let Some(project_id) = query.project_id {
        require_project_access(&state.db, principal.user_id, project_id, AccessAction::Read)
            .await?;
    }

    let is_admin = User::get_role(&state.db, principal.user_id)
        .await?
        .map(|r| r.is_admin())
        .unwrap_or(false);

    let filter = TaskFilter {
        project_id: query.project_id,
        status: query.status,
        priority: query.priority,
        assignee_id: query.assignee_id,
        participant_id: if is_admin {
            None
        } else {
            Some(principal.user_id)
        },
    };

    let page = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let (page_num, limit, offset) = page.normalize();

    let tasks = Task::list(&state.db, &filter, limit, offset).await?;
    let total = Task::count(&state.db, &filter).await?;

    Ok(Json(ApiResponse::paginated(
        tasks,
        Pagination::new(page_num, limit, total),
    )))
}

/// Creates a task
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    req.validate().map_err(ApiError::from_validation)?;

    require_project_access(
        &state.db,
        principal.user_id,
        req.project_id,
        AccessAction::Write,
    )
    .await?;

    if let Some(assignee_id) = req.assignee_id {
        User::find_by_id(&state.db, assignee_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Assignee not found".to_string()))?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            creator_id: principal.user_id,
            assignee_id: req.assignee_id,
            due_date: req.due_date,
        },
    )
    .await?;

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Task,
            entity_id: task.id,
            action: AuditAction::Created,
            user_id: principal.user_id,
            old_values: None,
            new_values: serde_json::to_value(&task).ok(),
            changes: None,
        },
    )
    .await;

    Ok(Json(ApiResponse::with_message(task, "Task created")))
}

/// Fetches one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let task = load_accessible_task(&state, &principal, id).await?;

    Ok(Json(ApiResponse::data(task)))
}

/// Updates a task's mutable fields
///
/// Status and assignee have dedicated endpoints so those transitions get
/// their own audit actions.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    req.validate().map_err(ApiError::from_validation)?;

    let before = load_accessible_task(&state, &principal, id).await?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let old_values = serde_json::to_value(&before).ok();
    let new_values = serde_json::to_value(&task).ok();
    let changes = match (&old_values, &new_values) {
        (Some(old), Some(new)) => audit::diff_values(old, new),
        _ => None,
    };

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Task,
            entity_id: task.id,
            action: AuditAction::Updated,
            user_id: principal.user_id,
            old_values,
            new_values,
            changes,
        },
    )
    .await;

    Ok(Json(ApiResponse::with_message(task, "Task updated")))
}

/// Deletes a task
///
/// Subtasks, comments, and label attachments cascade. Audit rows remain.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let before = load_accessible_task(&state, &principal, id).await?;

    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Task,
            entity_id: id,
            action: AuditAction::Deleted,
            user_id: principal.user_id,
            old_values: serde_json::to_value(&before).ok(),
            new_values: None,
            changes: None,
        },
    )
    .await;

    Ok(Json(ApiResponse::message("Task deleted")))
}

/// Changes a task's workflow status
pub async fn set_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let before = load_accessible_task(&state, &principal, id).await?;

    let task = Task::set_status(&state.db, id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Task,
            entity_id: task.id,
            action: AuditAction::StatusChanged,
            user_id: principal.user_id,
            old_values: None,
            new_values: None,
            changes: Some(json!({
                "status": { "from": before.status.as_str(), "to": task.status.as_str() }
            })),
        },
    )
    .await;

    Ok(Json(ApiResponse::with_message(task, "Status updated")))
}

/// Assigns a user to a task
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let before = load_accessible_task(&state, &principal, id).await?;

    User::find_by_id(&state.db, req.assignee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignee not found".to_string()))?;

    let task = Task::set_assignee(&state.db, id, Some(req.assignee_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Task,
            entity_id: task.id,
            action: AuditAction::Assigned,
            user_id: principal.user_id,
            old_values: None,
            new_values: None,
            changes: Some(json!({
                "assignee_id": { "from": before.assignee_id, "to": task.assignee_id }
            })),
        },
    )
    .await;

    Ok(Json(ApiResponse::with_message(task, "Task assigned")))
}

/// Clears a task's assignee
pub async fn unassign_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let before = load_accessible_task(&state, &principal, id).await?;

    let task = Task::set_assignee(&state.db, id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    audit::record(
        &state.db,
        RecordAuditLog {
            entity_type: AuditEntity::Task,
            entity_id: task.id,
            action: AuditAction::Unassigned,
            user_id: principal.user_id,
            old_values: None,
            new_values: None,
            changes: Some(json!({
                "assignee_id": { "from": before.assignee_id, "to": null }
            })),
        },
    )
    .await;

    Ok(Json(ApiResponse::with_message(task, "Task unassigned")))
}

/// Attaches a label to a task
///
/// The label must belong to the task's project. Attaching an already
/// attached label is a no-op.
pub async fn attach_label(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, label_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<Vec<Label>>>> {
    let task = load_accessible_task(&state, &principal, id).await?;

    let label = Label::find_by_id(&state.db, label_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Label not found".to_string()))?;

    if label.project_id != task.project_id {
        return Err(ApiError::BadRequest(
            "Label belongs to a different project".to_string(),
        ));
    }

    Label::attach(&state.db, id, label_id).await?;

    let labels = Label::list_by_task(&state.db, id).await?;

    Ok(Json(ApiResponse::with_message(labels, "Label attached")))
}

/// Detaches a label from a task
pub async fn detach_label(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, label_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<Vec<Label>>>> {
    load_accessible_task(&state, &principal, id).await?;

    let detached = Label::detach(&state.db, id, label_id).await?;
    if !detached {
        return Err(ApiError::NotFound("Label is not attached".to_string()));
    }

    let labels = Label::list_by_task(&state.db, id).await?;

    Ok(Json(ApiResponse::with_message(labels, "Label detached")))
}
