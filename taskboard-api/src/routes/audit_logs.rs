/// Audit trail reader endpoint
///
/// Reads the append-only audit trail with optional entity filters. Because
/// `entity_id` is polymorphic across tasks and projects, it only narrows
/// results together with `entity_type`.
///
/// # Endpoint
///
/// ```text
/// GET /api/audit-logs?entity_type=task&entity_id=<uuid>&limit=50
/// ```
///
/// `limit` caps at [`MAX_HISTORY_LIMIT`] rows per request; larger values are
/// rejected rather than silently truncated.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::verifier::Principal,
    models::{
        audit_log::{AuditEntity, AuditFilter, AuditLog, AuditLogWithActor, DEFAULT_HISTORY_LIMIT},
        user::User,
    },
};
use uuid::Uuid;

/// Largest number of audit rows a single request may ask for
pub const MAX_HISTORY_LIMIT: i64 = 1000;

/// Query parameters for the audit reader
#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    /// Restrict to one entity kind
    pub entity_type: Option<AuditEntity>,

    /// Restrict to one entity (requires `entity_type`)
    pub entity_id: Option<Uuid>,

    /// Maximum rows to return (default 50, at most [`MAX_HISTORY_LIMIT`])
    pub limit: Option<i64>,
}

/// Lists audit rows, newest first (global admin only)
///
/// The trail exposes actor identities and entity diffs across every project,
/// so it is reserved for global admins.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<ApiResponse<Vec<AuditLogWithActor>>>> {
    let role = User::get_role(&state.db, principal.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;

    if !role.is_admin() {
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }

    if query.entity_id.is_some() && query.entity_type.is_none() {
        return Err(ApiError::BadRequest(
            "entity_id requires entity_type".to_string(),
        ));
    }

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}"
        )));
    }

    let filter = AuditFilter {
        entity_type: query.entity_type,
        entity_id: query.entity_id,
    };

    let logs = AuditLog::history(&state.db, &filter, limit).await?;

    Ok(Json(ApiResponse::data(logs)))
}
