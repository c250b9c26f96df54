//! Block Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{CreateBlockRequest, MoveBlockRequest, UpdateBlockRequest};
use crate::application::dto::response::{ApiResponse, BlockResponse};
use crate::application::services::{
    BlockError, BlockService, BlockServiceImpl, CreateBlockDto, MoveBlockDto, UpdateBlockDto,
};
use crate::infrastructure::repositories::{
    PgBlockRepository, PgMemberRepository, PgPageRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn block_service(
    state: &AppState,
) -> BlockServiceImpl<PgBlockRepository, PgPageRepository, PgMemberRepository> {
    BlockServiceImpl::new(
        Arc::new(PgBlockRepository::new(state.db.clone())),
        Arc::new(PgPageRepository::new(state.db.clone())),
        Arc::new(PgMemberRepository::new(state.db.clone())),
    )
}

pub(super) fn map_block_error(e: BlockError) -> AppError {
    match e {
        BlockError::NotFound => AppError::NotFound("Block not found".into()),
        BlockError::PageNotFound => AppError::NotFound("Page not found".into()),
        BlockError::Forbidden => AppError::Forbidden("Permission denied".into()),
        BlockError::Internal(msg) => AppError::Internal(msg),
    }
}

fn parse_block_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid block ID".into()))
}

/// Create a block, appended after the current last sibling
pub async fn create_block(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BlockResponse>>), AppError> {
    body.validate().map_err(validation_error)?;

    let request = CreateBlockDto {
        page_id: body.page_id,
        parent_id: body.parent_id,
        block_type: body.block_type,
        content: body.content,
    };

    let block = block_service(&state)
        .create_block(auth.into(), request)
        .await
        .map_err(map_block_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Block created", BlockResponse::from(block))),
    ))
}

/// Get a block by ID
pub async fn get_block(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(block_id): Path<String>,
) -> Result<Json<ApiResponse<BlockResponse>>, AppError> {
    let block_id = parse_block_id(&block_id)?;

    let block = block_service(&state)
        .get_block(block_id, auth.into())
        .await
        .map_err(map_block_error)?;

    Ok(Json(ApiResponse::ok("Block", BlockResponse::from(block))))
}

/// Update a block's type and content
pub async fn update_block(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(block_id): Path<String>,
    Json(body): Json<UpdateBlockRequest>,
) -> Result<Json<ApiResponse<BlockResponse>>, AppError> {
    let block_id = parse_block_id(&block_id)?;
    body.validate().map_err(validation_error)?;

    let update = UpdateBlockDto {
        block_type: body.block_type,
        content: body.content,
    };

    let block = block_service(&state)
        .update_block(block_id, auth.into(), update)
        .await
        .map_err(map_block_error)?;

    Ok(Json(ApiResponse::ok(
        "Block updated",
        BlockResponse::from(block),
    )))
}

/// Move a block between two siblings
pub async fn move_block(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(block_id): Path<String>,
    Json(body): Json<MoveBlockRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let block_id = parse_block_id(&block_id)?;

    let request = MoveBlockDto {
        after_id: body.after_id,
        before_id: body.before_id,
    };

    block_service(&state)
        .move_block(block_id, auth.into(), request)
        .await
        .map_err(map_block_error)?;

    Ok(Json(ApiResponse::message("Block moved")))
}

/// Soft-delete a block
pub async fn delete_block(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(block_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let block_id = parse_block_id(&block_id)?;

    block_service(&state)
        .delete_block(block_id, auth.into())
        .await
        .map_err(map_block_error)?;

    Ok(Json(ApiResponse::message("Block deleted")))
}

/// Direct children of a block
pub async fn get_block_children(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(block_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BlockResponse>>>, AppError> {
    let block_id = parse_block_id(&block_id)?;

    let children = block_service(&state)
        .children(block_id, auth.into())
        .await
        .map_err(map_block_error)?;

    let items = children.into_iter().map(BlockResponse::from).collect();

    Ok(Json(ApiResponse::ok("Child blocks", items)))
}
