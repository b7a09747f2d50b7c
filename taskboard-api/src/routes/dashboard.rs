/// Dashboard endpoint
///
/// Aggregates scoped to the authenticated principal: their project count,
/// task counts by status, overdue count, and completion rate.
///
/// # Endpoint
///
/// ```text
/// GET /api/dashboard/summary
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "project_count": 4,
///     "task_counts": { "todo": 7, "in_progress": 3, "done": 12 },
///     "overdue_count": 2,
///     "completion_rate": 54.5
///   }
/// }
/// ```

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use taskboard_shared::{
    auth::verifier::Principal,
    models::{
        project::Project,
        task::{Task, TaskStatusCounts},
    },
};

/// Principal-scoped dashboard aggregates
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// Projects the principal owns or belongs to
    pub project_count: i64,

    /// Their tasks by status (created or assigned)
    pub task_counts: TaskStatusCounts,

    /// Unfinished tasks past their due date
    pub overdue_count: i64,

    /// Percentage of their tasks that are done, 0.0 with no tasks
    pub completion_rate: f64,
}

/// Builds the dashboard summary for the principal
pub async fn summary(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<ApiResponse<DashboardSummary>>> {
    let project_count = Project::count_for_user(&state.db, principal.user_id).await?;
    let task_counts = Task::status_counts_for_user(&state.db, principal.user_id).await?;
    let overdue_count = Task::count_overdue_for_user(&state.db, principal.user_id).await?;

    let total = task_counts.todo + task_counts.in_progress + task_counts.done;
    let completion_rate = if total == 0 {
        0.0
    } else {
        (task_counts.done as f64 / total as f64) * 100.0
    };

    Ok(Json(ApiResponse::data(DashboardSummary {
        project_count,
        task_counts,
        overdue_count,
        completion_rate,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate_shape() {
        let summary = DashboardSummary {
            project_count: 2,
            task_counts: TaskStatusCounts {
                todo: 3,
                in_progress: 1,
                done: 4,
            },
            overdue_count: 1,
            completion_rate: 50.0,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["task_counts"]["done"], 4);
        assert_eq!(json["completion_rate"], 50.0);
    }
}
