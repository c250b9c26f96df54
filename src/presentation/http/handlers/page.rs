//! Page Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{CreatePageRequest, PaginationParams, UpdatePageRequest};
use crate::application::dto::response::{ApiResponse, BlockResponse, Paginated, PageResponse};
use crate::application::services::{
    BlockService, BlockServiceImpl, CreatePageDto, PageError, PageService, PageServiceImpl,
    UpdatePageDto,
};
use crate::infrastructure::repositories::{
    PgBlockRepository, PgMemberRepository, PgPageRepository, PgWorkspaceRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

use super::block::map_block_error;

fn page_service(
    state: &AppState,
) -> PageServiceImpl<PgPageRepository, PgWorkspaceRepository, PgMemberRepository> {
    PageServiceImpl::new(
        Arc::new(PgPageRepository::new(state.db.clone())),
        Arc::new(PgWorkspaceRepository::new(state.db.clone())),
        Arc::new(PgMemberRepository::new(state.db.clone())),
    )
}

fn block_service(
    state: &AppState,
) -> BlockServiceImpl<PgBlockRepository, PgPageRepository, PgMemberRepository> {
    BlockServiceImpl::new(
        Arc::new(PgBlockRepository::new(state.db.clone())),
        Arc::new(PgPageRepository::new(state.db.clone())),
        Arc::new(PgMemberRepository::new(state.db.clone())),
    )
}

pub(super) fn map_page_error(e: PageError) -> AppError {
    match e {
        PageError::NotFound => AppError::NotFound("Page not found".into()),
        PageError::WorkspaceNotFound => AppError::NotFound("Workspace not found".into()),
        PageError::EmptyTitle => AppError::Validation("Page title must not be empty".into()),
        PageError::Forbidden => AppError::Forbidden("Permission denied".into()),
        PageError::Internal(msg) => AppError::Internal(msg),
    }
}

fn parse_page_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid page ID".into()))
}

/// Create a page
pub async fn create_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreatePageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PageResponse>>), AppError> {
    body.validate().map_err(validation_error)?;

    let request = CreatePageDto {
        workspace_id: body.workspace_id,
        parent_id: body.parent_id,
        title: body.title,
        icon: body.icon,
    };

    let page = page_service(&state)
        .create_page(auth.into(), request)
        .await
        .map_err(map_page_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Page created", PageResponse::from(page))),
    ))
}

/// Get a page by ID
pub async fn get_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(page_id): Path<String>,
) -> Result<Json<ApiResponse<PageResponse>>, AppError> {
    let page_id = parse_page_id(&page_id)?;

    let page = page_service(&state)
        .get_page(page_id, auth.into())
        .await
        .map_err(map_page_error)?;

    Ok(Json(ApiResponse::ok("Page", PageResponse::from(page))))
}

/// Update a page; creator and creation time never change.
pub async fn update_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(page_id): Path<String>,
    Json(body): Json<UpdatePageRequest>,
) -> Result<Json<ApiResponse<PageResponse>>, AppError> {
    let page_id = parse_page_id(&page_id)?;
    body.validate().map_err(validation_error)?;

    let update = UpdatePageDto {
        title: body.title,
        icon: body.icon,
        parent_id: body.parent_id,
    };

    let page = page_service(&state)
        .update_page(page_id, auth.into(), update)
        .await
        .map_err(map_page_error)?;

    Ok(Json(ApiResponse::ok(
        "Page updated",
        PageResponse::from(page),
    )))
}

/// Soft-delete a page
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(page_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let page_id = parse_page_id(&page_id)?;

    page_service(&state)
        .delete_page(page_id, auth.into())
        .await
        .map_err(map_page_error)?;

    Ok(Json(ApiResponse::message("Page deleted")))
}

/// List live pages of a workspace
pub async fn list_workspace_pages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<PageResponse>>>, AppError> {
    let workspace_id: Uuid = workspace_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid workspace ID".into()))?;

    let (pages, total) = page_service(&state)
        .list_pages(workspace_id, auth.into(), params.limit(), params.offset())
        .await
        .map_err(map_page_error)?;

    let items = pages.into_iter().map(PageResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Pages",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Direct children of a page
pub async fn get_page_children(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(page_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<PageResponse>>>, AppError> {
    let page_id = parse_page_id(&page_id)?;

    let children = page_service(&state)
        .children(page_id, auth.into())
        .await
        .map_err(map_page_error)?;

    let items = children.into_iter().map(PageResponse::from).collect();

    Ok(Json(ApiResponse::ok("Child pages", items)))
}

/// Live blocks of a page in sibling order
pub async fn get_page_blocks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(page_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BlockResponse>>>, AppError> {
    let page_id = parse_page_id(&page_id)?;

    let blocks = block_service(&state)
        .page_blocks(page_id, auth.into())
        .await
        .map_err(map_block_error)?;

    let items = blocks.into_iter().map(BlockResponse::from).collect();

    Ok(Json(ApiResponse::ok("Blocks", items)))
}
