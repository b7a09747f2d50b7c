/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup
/// - Test user creation
/// - JWT token generation
/// - API client helpers
///
/// The database-backed tests require a running Postgres reachable through
/// `DATABASE_URL`; they are marked `#[ignore]` accordingly.

use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims, TokenType};
use taskboard_shared::auth::password;
use taskboard_shared::models::project::{CreateProject, Project};
use taskboard_shared::models::project_member::{CreateProjectMember, MemberRole, ProjectMember};
use taskboard_shared::models::task::{CreateTask, Task, TaskPriority};
use taskboard_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "TestPassw0rd";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and one user
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../taskboard-shared/migrations").run(&db).await?;

        // Create test user
        let user = User::create(
            &db,
            CreateUser {
                full_name: "Test User".to_string(),
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password(TEST_PASSWORD)?,
                avatar_url: None,
            },
        )
        .await?;

        // Generate JWT token
        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates a second user with their own token
    pub async fn create_other_user(&self) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                full_name: "Other User".to_string(),
                email: format!("other-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password(TEST_PASSWORD)?,
                avatar_url: None,
            },
        )
        .await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, &self.config.jwt.secret)?;

        Ok((user, token))
    }

    /// Promotes a user to the global admin role
    pub async fn make_admin(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Cleans up test data
    ///
    /// Audit rows reference the user, so they go first.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM audit_logs WHERE user_id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM projects WHERE owner_id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Helper to create a project owned by the context user
pub async fn create_test_project(ctx: &TestContext, name: &str) -> anyhow::Result<Project> {
    let project = Project::create(
        &ctx.db,
        CreateProject {
            name: name.to_string(),
            description: None,
            owner_id: ctx.user.id,
        },
    )
    .await?;

    ProjectMember::create(
        &ctx.db,
        CreateProjectMember {
            project_id: project.id,
            user_id: ctx.user.id,
            role: MemberRole::Owner,
        },
    )
    .await?;

    Ok(project)
}

/// Helper to create a task created by the context user
pub async fn create_test_task(
    ctx: &TestContext,
    project_id: Uuid,
    title: &str,
) -> anyhow::Result<Task> {
    let task = Task::create(
        &ctx.db,
        CreateTask {
            project_id,
            title: title.to_string(),
            description: None,
            priority: TaskPriority::Medium,
            creator_id: ctx.user.id,
            assignee_id: None,
            due_date: None,
        },
    )
    .await?;

    Ok(task)
}
