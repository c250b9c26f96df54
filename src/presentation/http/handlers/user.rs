//! User and Follow-Graph Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{PaginationParams, UpdateUserRequest};
use crate::application::dto::response::{
    ApiResponse, FollowCountsResponse, Paginated, UserResponse,
};
use crate::application::services::{
    FollowError, FollowService, FollowServiceImpl, UpdateProfileDto, UserError, UserService,
    UserServiceImpl,
};
use crate::infrastructure::repositories::{PgFollowRepository, PgUserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn user_service(state: &AppState) -> UserServiceImpl<PgUserRepository> {
    UserServiceImpl::new(Arc::new(PgUserRepository::new(state.db.clone())))
}

fn follow_service(state: &AppState) -> FollowServiceImpl<PgFollowRepository, PgUserRepository> {
    FollowServiceImpl::new(
        Arc::new(PgFollowRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
    )
}

fn map_user_error(e: UserError) -> AppError {
    match e {
        UserError::NotFound => AppError::NotFound("User not found".into()),
        UserError::UsernameTaken => AppError::Conflict("Username already taken".into()),
        UserError::Internal(msg) => AppError::Internal(msg),
    }
}

fn map_follow_error(e: FollowError) -> AppError {
    match e {
        FollowError::SelfFollow => AppError::Conflict("Cannot follow yourself".into()),
        FollowError::AlreadyFollowing => AppError::Conflict("Already following".into()),
        FollowError::NotFollowing => AppError::NotFound("Not following".into()),
        FollowError::UserNotFound => AppError::NotFound("User not found".into()),
        FollowError::Internal(msg) => AppError::Internal(msg),
    }
}

fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()))
}

/// Get the authenticated user's own profile
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service(&state)
        .get_user(auth.user_id)
        .await
        .map_err(map_user_error)?;

    Ok(Json(ApiResponse::ok(
        "Current user",
        UserResponse::from_user(user, true),
    )))
}

/// Update the authenticated user's profile
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    body.validate().map_err(validation_error)?;

    let update = UpdateProfileDto {
        username: body.username,
        display_name: body.display_name,
        avatar_url: body.avatar_url,
        bio: body.bio,
    };

    let user = user_service(&state)
        .update_profile(auth.into(), update)
        .await
        .map_err(map_user_error)?;

    Ok(Json(ApiResponse::ok(
        "Profile updated",
        UserResponse::from_user(user, true),
    )))
}

/// Soft-delete the authenticated user's account
pub async fn delete_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user_service(&state)
        .delete_account(auth.into())
        .await
        .map_err(map_user_error)?;

    Ok(Json(ApiResponse::message("Account deleted")))
}

/// Get a public profile by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user_id = parse_user_id(&user_id)?;

    let user = user_service(&state)
        .get_user(user_id)
        .await
        .map_err(map_user_error)?;

    Ok(Json(ApiResponse::ok(
        "User",
        UserResponse::from_user(user, false),
    )))
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<UserResponse>>>, AppError> {
    let (users, total) = user_service(&state)
        .list_users(params.limit(), params.offset())
        .await
        .map_err(map_user_error)?;

    let items = users
        .into_iter()
        .map(|u| UserResponse::from_user(u, false))
        .collect();

    Ok(Json(ApiResponse::ok(
        "Users",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Follow a user
pub async fn follow_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    let user_id = parse_user_id(&user_id)?;

    follow_service(&state)
        .follow(auth.user_id, user_id)
        .await
        .map_err(map_follow_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::message("Following"))))
}

/// Unfollow a user
pub async fn unfollow_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user_id = parse_user_id(&user_id)?;

    follow_service(&state)
        .unfollow(auth.user_id, user_id)
        .await
        .map_err(map_follow_error)?;

    Ok(Json(ApiResponse::message("Unfollowed")))
}

/// Users following the given user
pub async fn get_followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<UserResponse>>>, AppError> {
    let user_id = parse_user_id(&user_id)?;

    let (users, total) = follow_service(&state)
        .followers(user_id, params.limit(), params.offset())
        .await
        .map_err(map_follow_error)?;

    let items = users
        .into_iter()
        .map(|u| UserResponse::from_user(u, false))
        .collect();

    Ok(Json(ApiResponse::ok(
        "Followers",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Users the given user follows
pub async fn get_following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<UserResponse>>>, AppError> {
    let user_id = parse_user_id(&user_id)?;

    let (users, total) = follow_service(&state)
        .following(user_id, params.limit(), params.offset())
        .await
        .map_err(map_follow_error)?;

    let items = users
        .into_iter()
        .map(|u| UserResponse::from_user(u, false))
        .collect();

    Ok(Json(ApiResponse::ok(
        "Following",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Users followed by both the given user and the other user
pub async fn get_mutual_follows(
    State(state): State<AppState>,
    Path((user_id, other_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    let user_id = parse_user_id(&user_id)?;
    let other_id = parse_user_id(&other_id)?;

    let users = follow_service(&state)
        .mutual_follows(user_id, other_id)
        .await
        .map_err(map_follow_error)?;

    let items = users
        .into_iter()
        .map(|u| UserResponse::from_user(u, false))
        .collect();

    Ok(Json(ApiResponse::ok("Mutual follows", items)))
}

/// Recompute the denormalized follow counters from the edge table.
/// Restricted to the user themselves or a super admin.
pub async fn recalculate_follow_counts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<FollowCountsResponse>>, AppError> {
    let user_id = parse_user_id(&user_id)?;

    if auth.user_id != user_id && !auth.is_super_admin {
        return Err(AppError::Forbidden("Permission denied".into()));
    }

    let counts = follow_service(&state)
        .recalculate_counts(user_id)
        .await
        .map_err(map_follow_error)?;

    Ok(Json(ApiResponse::ok(
        "Follow counts recalculated",
        FollowCountsResponse::from(counts),
    )))
}
