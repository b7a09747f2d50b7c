/// API route handlers
///
/// Each submodule owns one resource of the HTTP surface:
///
/// - `health`: liveness and database connectivity
/// - `auth`: registration, login, token refresh, current principal
/// - `users`: user listing and profile updates
/// - `projects`: project CRUD and progress
/// - `members`: project membership management
/// - `labels`: per-project label management
/// - `files`: project file attachments
/// - `tasks`: task CRUD, status, assignment, label attachment
/// - `subtasks`: checklist items under a task
/// - `comments`: discussion under a task
/// - `dashboard`: principal-scoped aggregates
/// - `audit_logs`: audit trail reader

pub mod audit_logs;
pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod files;
pub mod health;
pub mod labels;
pub mod members;
pub mod projects;
pub mod subtasks;
pub mod tasks;
pub mod users;
