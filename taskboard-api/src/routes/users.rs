/// User endpoints
///
/// # Endpoints
///
/// - `GET /api/users` - List users (global admin only)
/// - `GET /api/users/:id` - Fetch a user profile
/// - `PUT /api/users/:id` - Update a profile (self or global admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ApiResponse, PageQuery, Pagination},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::verifier::Principal,
    models::user::{UpdateUser, User, UserProfile},
};
use uuid::Uuid;
use validator::Validate;

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub full_name: Option<String>,

    /// New avatar URL
    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url: Option<String>,
}

/// Requires the principal to hold the global admin role
async fn require_global_admin(state: &AppState, principal: &Principal) -> ApiResult<()> {
    let role = User::get_role(&state.db, principal.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;

    if !role.is_admin() {
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }

    Ok(())
}

/// Lists users with pagination (global admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    page: PageQuery,
) -> ApiResult<Json<ApiResponse<Vec<UserProfile>>>> {
    require_global_admin(&state, &principal).await?;

    let (page_num, limit, offset) = page.normalize();

    let users = User::list(&state.db, limit, offset).await?;
    let total = User::count(&state.db).await?;

    let profiles: Vec<UserProfile> = users.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::paginated(
        profiles,
        Pagination::new(page_num, limit, total),
    )))
}

/// Fetches one user profile
pub async fn get_user(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::data(user.into())))
}

/// Updates profile fields of a user
///
/// Users may edit their own profile; global admins may edit anyone's.
/// Email, role, and credentials are not editable through this endpoint.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
    req.validate().map_err(ApiError::from_validation)?;

    if principal.user_id != id {
        require_global_admin(&state, &principal).await?;
    }

    let user = User::update_profile(
        &state.db,
        id,
        UpdateUser {
            full_name: req.full_name,
            avatar_url: req.avatar_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(
        user.into(),
        "Profile updated",
    )))
}
