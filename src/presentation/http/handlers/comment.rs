//! Comment Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{
    CreateCommentRequest, PaginationParams, UpdateCommentRequest,
};
use crate::application::dto::response::{ApiResponse, CommentResponse, Paginated};
use crate::application::services::{
    CommentError, CommentService, CommentServiceImpl,
};
use crate::infrastructure::repositories::{PgCommentRepository, PgPostRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn comment_service(
    state: &AppState,
) -> CommentServiceImpl<PgCommentRepository, PgPostRepository> {
    CommentServiceImpl::new(
        Arc::new(PgCommentRepository::new(state.db.clone())),
        Arc::new(PgPostRepository::new(state.db.clone())),
    )
}

fn map_comment_error(e: CommentError) -> AppError {
    match e {
        CommentError::NotFound => AppError::NotFound("Comment not found".into()),
        CommentError::PostNotFound => AppError::NotFound("Post not found".into()),
        CommentError::EmptyContent => AppError::Validation("Comment must not be empty".into()),
        CommentError::Forbidden => AppError::Forbidden("Permission denied".into()),
        CommentError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Comment on a post
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponse>>), AppError> {
    let post_id: Uuid = post_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()))?;
    body.validate().map_err(validation_error)?;

    let comment = comment_service(&state)
        .create_comment(post_id, auth.into(), body.content)
        .await
        .map_err(map_comment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Comment created",
            CommentResponse::from(comment),
        )),
    ))
}

/// List live comments of a post, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<CommentResponse>>>, AppError> {
    let post_id: Uuid = post_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()))?;

    let (comments, total) = comment_service(&state)
        .list_comments(post_id, params.limit(), params.offset())
        .await
        .map_err(map_comment_error)?;

    let items = comments.into_iter().map(CommentResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Comments",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Edit an own comment
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
    Json(body): Json<UpdateCommentRequest>,
) -> Result<Json<ApiResponse<CommentResponse>>, AppError> {
    let comment_id: Uuid = comment_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid comment ID".into()))?;
    body.validate().map_err(validation_error)?;

    let comment = comment_service(&state)
        .update_comment(comment_id, auth.into(), body.content)
        .await
        .map_err(map_comment_error)?;

    Ok(Json(ApiResponse::ok(
        "Comment updated",
        CommentResponse::from(comment),
    )))
}

/// Delete a comment (author or super admin)
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let comment_id: Uuid = comment_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid comment ID".into()))?;

    comment_service(&state)
        .delete_comment(comment_id, auth.into())
        .await
        .map_err(map_comment_error)?;

    Ok(Json(ApiResponse::message("Comment deleted")))
}
