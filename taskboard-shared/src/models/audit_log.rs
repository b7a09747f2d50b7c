/// Audit log model and database operations
///
/// Audit rows form an append-only trail of every mutation to a task or
/// project. Rows are never updated or deleted. `entity_id` is polymorphic:
/// it refers to a task or a project depending on `entity_type` and carries no
/// foreign key, so every reader filters by `entity_type` before matching
/// `entity_id` — task and project identifiers must never collide in a result
/// set.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE audit_entity AS ENUM ('task', 'project');
/// CREATE TYPE audit_action AS ENUM (
///     'created', 'updated', 'deleted', 'status_changed', 'assigned', 'unassigned'
/// );
///
/// CREATE TABLE audit_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     entity_type audit_entity NOT NULL,
///     entity_id UUID NOT NULL,
///     action audit_action NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id),
///     old_values JSONB,
///     new_values JSONB,
///     changes JSONB,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Kind of entity an audit row refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_entity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditEntity {
    /// A task row
    Task,

    /// A project row
    Project,
}

impl AuditEntity {
    /// Converts entity kind to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntity::Task => "task",
            AuditEntity::Project => "project",
        }
    }
}

/// Recorded mutation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Entity was created
    Created,

    /// Fields were updated
    Updated,

    /// Entity was deleted
    Deleted,

    /// Task status changed
    StatusChanged,

    /// Task assignee set
    Assigned,

    /// Task assignee cleared
    Unassigned,
}

impl AuditAction {
    /// Converts action to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::Deleted => "deleted",
            AuditAction::StatusChanged => "status_changed",
            AuditAction::Assigned => "assigned",
            AuditAction::Unassigned => "unassigned",
        }
    }
}

/// Audit log row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLog {
    /// Unique row ID
    pub id: Uuid,

    /// Kind of entity the row refers to
    pub entity_type: AuditEntity,

    /// Task or project ID, depending on `entity_type`
    pub entity_id: Uuid,

    /// What happened
    pub action: AuditAction,

    /// Acting user
    pub user_id: Uuid,

    /// Entity state before the mutation, if captured
    pub old_values: Option<JsonValue>,

    /// Entity state after the mutation, if captured
    pub new_values: Option<JsonValue>,

    /// Field-level diff, if computed
    pub changes: Option<JsonValue>,

    /// When the row was written
    pub created_at: DateTime<Utc>,
}

/// Input for writing one audit row
#[derive(Debug, Clone)]
pub struct RecordAuditLog {
    /// Kind of entity
    pub entity_type: AuditEntity,

    /// Task or project ID
    pub entity_id: Uuid,

    /// What happened
    pub action: AuditAction,

    /// Acting user
    pub user_id: Uuid,

    /// Entity state before the mutation
    pub old_values: Option<JsonValue>,

    /// Entity state after the mutation
    pub new_values: Option<JsonValue>,

    /// Field-level diff
    pub changes: Option<JsonValue>,
}

/// Audit row joined with the actor's identity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditLogWithActor {
    /// Unique row ID
    pub id: Uuid,

    /// Kind of entity the row refers to
    pub entity_type: AuditEntity,

    /// Task or project ID, depending on `entity_type`
    pub entity_id: Uuid,

    /// What happened
    pub action: AuditAction,

    /// Acting user
    pub user_id: Uuid,

    /// Entity state before the mutation, if captured
    pub old_values: Option<JsonValue>,

    /// Entity state after the mutation, if captured
    pub new_values: Option<JsonValue>,

    /// Field-level diff, if computed
    pub changes: Option<JsonValue>,

    /// When the row was written
    pub created_at: DateTime<Utc>,

    /// Actor display name
    pub actor_name: String,

    /// Actor email
    pub actor_email: String,
}

/// Filters for reading the audit trail
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Restrict to one entity kind
    pub entity_type: Option<AuditEntity>,

    /// Restrict to one entity; only meaningful together with `entity_type`
    pub entity_id: Option<Uuid>,
}

/// Default bound on audit history reads
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

impl AuditLog {
    /// Appends one audit row
    ///
    /// There is no uniqueness constraint: N inserts for the same entity yield
    /// N rows. Callers that must not fail on audit errors go through
    /// [`crate::audit::record`] instead, which swallows failures.
    pub async fn insert(pool: &PgPool, data: RecordAuditLog) -> Result<Self, sqlx::Error> {
        let entry = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (entity_type, entity_id, action, user_id,
                                    old_values, new_values, changes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, entity_type, entity_id, action, user_id,
                      old_values, new_values, changes, created_at
            "#,
        )
        .bind(data.entity_type)
        .bind(data.entity_id)
        .bind(data.action)
        .bind(data.user_id)
        .bind(data.old_values)
        .bind(data.new_values)
        .bind(data.changes)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    /// Reads audit history: filtered, actor-joined, newest first, bounded
    ///
    /// When `entity_id` is supplied without `entity_type` the id predicate is
    /// still applied per entity kind boundary: rows only match when both
    /// predicates (where present) hold. A limit of `K` never returns more
    /// than `K` rows no matter how many exist.
    pub async fn history(
        pool: &PgPool,
        filter: &AuditFilter,
        limit: i64,
    ) -> Result<Vec<AuditLogWithActor>, sqlx::Error> {
        let entries = sqlx::query_as::<_, AuditLogWithActor>(
            r#"
            SELECT a.id, a.entity_type, a.entity_id, a.action, a.user_id,
                   a.old_values, a.new_values, a.changes, a.created_at,
                   u.full_name AS actor_name, u.email AS actor_email
            FROM audit_logs a
            JOIN users u ON u.id = a.user_id
            WHERE ($1::audit_entity IS NULL OR a.entity_type = $1)
              AND ($2::uuid IS NULL OR a.entity_id = $2)
            ORDER BY a.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(filter.entity_type)
        .bind(filter.entity_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Counts audit rows for one entity
    pub async fn count_for_entity(
        pool: &PgPool,
        entity_type: AuditEntity,
        entity_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM audit_logs WHERE entity_type = $1 AND entity_id = $2",
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_entity_as_str() {
        assert_eq!(AuditEntity::Task.as_str(), "task");
        assert_eq!(AuditEntity::Project.as_str(), "project");
    }

    #[test]
    fn test_audit_action_as_str() {
        assert_eq!(AuditAction::Created.as_str(), "created");
        assert_eq!(AuditAction::Updated.as_str(), "updated");
        assert_eq!(AuditAction::Deleted.as_str(), "deleted");
        assert_eq!(AuditAction::StatusChanged.as_str(), "status_changed");
        assert_eq!(AuditAction::Assigned.as_str(), "assigned");
        assert_eq!(AuditAction::Unassigned.as_str(), "unassigned");
    }

    #[test]
    fn test_audit_action_serde() {
        let json = serde_json::to_string(&AuditAction::StatusChanged).unwrap();
        assert_eq!(json, "\"status_changed\"");

        let action: AuditAction = serde_json::from_str("\"unassigned\"").unwrap();
        assert_eq!(action, AuditAction::Unassigned);
    }

    #[test]
    fn test_default_history_limit() {
        assert_eq!(DEFAULT_HISTORY_LIMIT, 50);
    }
}
