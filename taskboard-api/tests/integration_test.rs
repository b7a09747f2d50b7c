/// Integration tests for the Taskboard API
///
/// These tests verify the full system works end-to-end:
/// - Registration and login
/// - Project CRUD with membership-based authorization
/// - Task lifecycle (create → status change → assignment)
/// - Audit trail written alongside mutations
/// - Access denial for non-participants
///
/// They require a running Postgres reachable through `DATABASE_URL` and are
/// ignored by default:
///
/// ```bash
/// cargo test -p taskboard-api -- --ignored
/// ```

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use taskboard_shared::models::audit_log::{AuditEntity, AuditLog};
use tower::Service as _;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Register then login with the same credentials
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_register_and_login() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("newuser-{}@example.com", uuid::Uuid::new_v4());

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "full_name": "New User",
                "email": email,
                "password": "Sup3rSecret"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": email,
                "password": "Sup3rSecret"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["access_token"].is_string());

    ctx.cleanup().await.unwrap();
}

/// Requests without a token are rejected
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/projects")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");

    ctx.cleanup().await.unwrap();
}

/// A non-Bearer Authorization header is rejected as unauthorized, not as a
/// malformed request
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_non_bearer_token_is_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/projects")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");

    ctx.cleanup().await.unwrap();
}

/// Creating a project writes an audit row and adds an owner membership
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_create_project_records_audit() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/projects")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Launch checklist",
                "description": "Everything before the release"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let project_id: uuid::Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    // Owner membership created alongside the project
    let members_request = Request::builder()
        .method("GET")
        .uri(format!("/api/projects/{}/members", project_id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(members_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["role"], "owner");

    // Audit trail has the creation row
    let count = AuditLog::count_for_entity(&ctx.db, AuditEntity::Project, project_id)
        .await
        .unwrap();
    assert_eq!(count, 1);

    ctx.cleanup().await.unwrap();
}

/// A user who is neither creator nor assignee cannot read a task
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_task_access_denied_for_outsider() {
    let ctx = TestContext::new().await.unwrap();

    let project = common::create_test_project(&ctx, "Private project")
        .await
        .unwrap();
    let task = common::create_test_task(&ctx, project.id, "Secret task")
        .await
        .unwrap();

    let (_other, other_token) = ctx.create_other_user().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/tasks/{}", task.id))
        .header("authorization", format!("Bearer {}", other_token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Status change and assignment produce dedicated audit actions
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_task_lifecycle_audit_trail() {
    let ctx = TestContext::new().await.unwrap();

    let project = common::create_test_project(&ctx, "Lifecycle project")
        .await
        .unwrap();
    let task = common::create_test_task(&ctx, project.id, "Lifecycle task")
        .await
        .unwrap();

    // Move to in_progress
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/tasks/{}/status", task.id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "status": "in_progress" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "in_progress");

    // Assign to self
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/tasks/{}/assign", task.id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "assignee_id": ctx.user.id }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Two audit rows for the task: status_changed and assigned
    let count = AuditLog::count_for_entity(&ctx.db, AuditEntity::Task, task.id)
        .await
        .unwrap();
    assert_eq!(count, 2);

    ctx.cleanup().await.unwrap();
}

/// The audit reader is reserved for global admins
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_audit_reader_requires_admin() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/audit-logs")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Promote and retry
    ctx.make_admin(ctx.user.id).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/audit-logs?entity_type=project&limit=5")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());

    ctx.cleanup().await.unwrap();
}

/// entity_id without entity_type is rejected by the audit reader
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_audit_reader_rejects_bare_entity_id() {
    let ctx = TestContext::new().await.unwrap();
    ctx.make_admin(ctx.user.id).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/audit-logs?entity_id={}", uuid::Uuid::new_v4()))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// The audit reader rejects limits above its ceiling instead of truncating
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_audit_reader_rejects_oversized_limit() {
    let ctx = TestContext::new().await.unwrap();
    ctx.make_admin(ctx.user.id).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/audit-logs?limit=5000")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// A global admin keeps full project access even when they also hold a
/// low-privilege membership row in the project
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_admin_access_survives_viewer_membership() {
    use taskboard_shared::auth::authorization::{can_access_project, AccessAction};
    use taskboard_shared::models::project_member::{
        CreateProjectMember, MemberRole, ProjectMember,
    };

    let ctx = TestContext::new().await.unwrap();
    let project = common::create_test_project(&ctx, "Admin-visible project")
        .await
        .unwrap();

    let (admin, _token) = ctx.create_other_user().await.unwrap();
    ctx.make_admin(admin.id).await.unwrap();

    assert!(
        can_access_project(&ctx.db, admin.id, project.id, AccessAction::Write)
            .await
            .unwrap()
    );

    // A viewer membership must not shadow the global role
    ProjectMember::create(
        &ctx.db,
        CreateProjectMember {
            project_id: project.id,
            user_id: admin.id,
            role: MemberRole::Viewer,
        },
    )
    .await
    .unwrap();

    assert!(
        can_access_project(&ctx.db, admin.id, project.id, AccessAction::Write)
            .await
            .unwrap()
    );
    assert!(
        can_access_project(&ctx.db, admin.id, project.id, AccessAction::Delete)
            .await
            .unwrap()
    );

    ctx.cleanup().await.unwrap();
}

/// Dashboard summary reflects the principal's tasks
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_dashboard_summary() {
    let ctx = TestContext::new().await.unwrap();

    let project = common::create_test_project(&ctx, "Dashboard project")
        .await
        .unwrap();
    common::create_test_task(&ctx, project.id, "Open task")
        .await
        .unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/dashboard/summary")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["project_count"], 1);
    assert_eq!(body["data"]["task_counts"]["todo"], 1);
    assert_eq!(body["data"]["completion_rate"], 0.0);

    ctx.cleanup().await.unwrap();
}
