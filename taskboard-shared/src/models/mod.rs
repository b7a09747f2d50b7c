/// Database models
///
/// This module contains all database models organized by entity:
///
/// - `user`: User accounts and global roles
/// - `project`: Projects owned by users
/// - `project_member`: Project membership with per-project roles
/// - `task`: Tasks inside projects
/// - `subtask`: Checklist items inside tasks
/// - `comment`: Task comments
/// - `label`: Project labels and task-label attachments
/// - `audit_log`: Append-only audit trail
/// - `project_file`: Uploaded file attachments

pub mod audit_log;
pub mod comment;
pub mod label;
pub mod project;
pub mod project_file;
pub mod project_member;
pub mod subtask;
pub mod task;
pub mod user;
