//! Post, Like, View and Tag Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{CreatePostRequest, PaginationParams, UpdatePostRequest};
use crate::application::dto::response::{ApiResponse, Paginated, PostResponse, TagResponse};
use crate::application::services::{
    CreatePostDto, PostError, PostService, PostServiceImpl, UpdatePostDto,
};
use crate::domain::TagRepository;
use crate::infrastructure::repositories::{
    PgLikeRepository, PgPostRepository, PgTagRepository, PgViewRepository,
};
use crate::presentation::http::extractors::MaybeAuthUser;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn post_service(
    state: &AppState,
) -> PostServiceImpl<PgPostRepository, PgLikeRepository, PgViewRepository, PgTagRepository> {
    PostServiceImpl::new(
        Arc::new(PgPostRepository::new(state.db.clone())),
        Arc::new(PgLikeRepository::new(state.db.clone())),
        Arc::new(PgViewRepository::new(state.db.clone())),
        Arc::new(PgTagRepository::new(state.db.clone())),
    )
}

fn map_post_error(e: PostError) -> AppError {
    match e {
        PostError::NotFound => AppError::NotFound("Post not found".into()),
        PostError::AlreadyLiked => AppError::Conflict("Post already liked".into()),
        PostError::NotLiked => AppError::NotFound("Post not liked".into()),
        PostError::EmptyTitle => AppError::Validation("Post title must not be empty".into()),
        PostError::Forbidden => AppError::Forbidden("Permission denied".into()),
        PostError::Internal(msg) => AppError::Internal(msg),
    }
}

fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()))
}

/// Create a post
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponse>>), AppError> {
    body.validate().map_err(validation_error)?;

    let request = CreatePostDto {
        title: body.title,
        content: body.content,
        image_url: body.image_url,
        tags: body.tags,
    };

    let post = post_service(&state)
        .create_post(auth.into(), request)
        .await
        .map_err(map_post_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Post created", PostResponse::from(post))),
    ))
}

/// Get a post; viewer flags are filled when a credential is present.
pub async fn get_post(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<PostResponse>>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let viewer = auth.map(|a| a.user_id);

    let post = post_service(&state)
        .get_post(post_id, viewer)
        .await
        .map_err(map_post_error)?;

    Ok(Json(ApiResponse::ok("Post", PostResponse::from(post))))
}

/// List live posts, newest first
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<PostResponse>>>, AppError> {
    let (posts, total) = post_service(&state)
        .list_posts(params.limit(), params.offset())
        .await
        .map_err(map_post_error)?;

    let items = posts.into_iter().map(PostResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Posts",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// List a user's posts
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<PostResponse>>>, AppError> {
    let author_id: Uuid = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()))?;

    let (posts, total) = post_service(&state)
        .list_by_author(author_id, params.limit(), params.offset())
        .await
        .map_err(map_post_error)?;

    let items = posts.into_iter().map(PostResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Posts",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Update a post
pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostResponse>>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    body.validate().map_err(validation_error)?;

    let update = UpdatePostDto {
        title: body.title,
        content: body.content,
        image_url: body.image_url,
        tags: body.tags,
    };

    let post = post_service(&state)
        .update_post(post_id, auth.into(), update)
        .await
        .map_err(map_post_error)?;

    Ok(Json(ApiResponse::ok(
        "Post updated",
        PostResponse::from(post),
    )))
}

/// Soft-delete a post
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let post_id = parse_post_id(&post_id)?;

    post_service(&state)
        .delete_post(post_id, auth.into())
        .await
        .map_err(map_post_error)?;

    Ok(Json(ApiResponse::message("Post deleted")))
}

/// Like a post
pub async fn like_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    let post_id = parse_post_id(&post_id)?;

    post_service(&state)
        .like(post_id, auth.into())
        .await
        .map_err(map_post_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::message("Liked"))))
}

/// Remove a like
pub async fn unlike_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let post_id = parse_post_id(&post_id)?;

    post_service(&state)
        .unlike(post_id, auth.into())
        .await
        .map_err(map_post_error)?;

    Ok(Json(ApiResponse::message("Unliked")))
}

/// View recording result
#[derive(Debug, Serialize)]
pub struct ViewRecorded {
    pub recorded: bool,
}

/// Record a view. Works with or without a credential: authenticated views
/// are idempotent per user, anonymous views keep IP and user agent.
pub async fn record_view(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    headers: HeaderMap,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<ViewRecorded>>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let viewer = auth.map(|a| a.user_id);

    let (ip_address, user_agent) = if viewer.is_none() {
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());
        let ua = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        (ip, ua)
    } else {
        (None, None)
    };

    let recorded = post_service(&state)
        .record_view(post_id, viewer, ip_address, user_agent)
        .await
        .map_err(map_post_error)?;

    Ok(Json(ApiResponse::ok(
        "View recorded",
        ViewRecorded { recorded },
    )))
}

/// List tags
pub async fn list_tags(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<TagResponse>>>, AppError> {
    let tag_repo = PgTagRepository::new(state.db.clone());

    let tags = tag_repo.list(params.limit(), params.offset()).await?;
    let total = tag_repo.count().await?;

    let items = tags.into_iter().map(TagResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Tags",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// List posts carrying a tag
pub async fn list_posts_by_tag(
    State(state): State<AppState>,
    Path(tag_name): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<PostResponse>>>, AppError> {
    let (posts, total) = post_service(&state)
        .list_by_tag(&tag_name, params.limit(), params.offset())
        .await
        .map_err(map_post_error)?;

    let items = posts.into_iter().map(PostResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Posts",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}
