//! Workspace and Membership Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{
    AddMemberRequest, CreateWorkspaceRequest, PaginationParams, UpdateMemberRoleRequest,
    UpdateWorkspaceRequest,
};
use crate::application::dto::response::{
    ApiResponse, MemberResponse, MembershipResponse, Paginated, WorkspaceResponse,
};
use crate::application::services::{
    CreateWorkspaceDto, UpdateWorkspaceDto, WorkspaceError, WorkspaceService, WorkspaceServiceImpl,
};
use crate::domain::MemberRole;
use crate::infrastructure::repositories::{
    PgMemberRepository, PgUserRepository, PgWorkspaceRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn workspace_service(
    state: &AppState,
) -> WorkspaceServiceImpl<PgWorkspaceRepository, PgMemberRepository, PgUserRepository> {
    WorkspaceServiceImpl::new(
        Arc::new(PgWorkspaceRepository::new(state.db.clone())),
        Arc::new(PgMemberRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
    )
}

fn map_workspace_error(e: WorkspaceError) -> AppError {
    match e {
        WorkspaceError::NotFound => AppError::NotFound("Workspace not found".into()),
        WorkspaceError::MemberNotFound => AppError::NotFound("Member not found".into()),
        WorkspaceError::UserNotFound => AppError::NotFound("User not found".into()),
        WorkspaceError::DuplicateName => {
            AppError::Conflict("Workspace with this name already exists".into())
        }
        WorkspaceError::Forbidden => AppError::Forbidden("Permission denied".into()),
        WorkspaceError::CannotRemoveOwner => {
            AppError::Conflict("The workspace owner cannot be removed".into())
        }
        WorkspaceError::Internal(msg) => AppError::Internal(msg),
    }
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {what} ID")))
}

fn parse_role(raw: &str) -> Result<MemberRole, AppError> {
    MemberRole::parse(raw)
        .ok_or_else(|| AppError::Validation("Role must be admin, editor or viewer".into()))
}

/// Create a new workspace
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WorkspaceResponse>>), AppError> {
    body.validate().map_err(validation_error)?;

    let request = CreateWorkspaceDto {
        name: body.name,
        description: body.description,
        icon: body.icon,
    };

    let workspace = workspace_service(&state)
        .create_workspace(auth.into(), request)
        .await
        .map_err(map_workspace_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Workspace created",
            WorkspaceResponse::from(workspace),
        )),
    ))
}

/// Get a workspace by ID
pub async fn get_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
) -> Result<Json<ApiResponse<WorkspaceResponse>>, AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;

    let workspace = workspace_service(&state)
        .get_workspace(workspace_id, auth.into())
        .await
        .map_err(map_workspace_error)?;

    Ok(Json(ApiResponse::ok(
        "Workspace",
        WorkspaceResponse::from(workspace),
    )))
}

/// List workspaces the authenticated user belongs to
pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<WorkspaceResponse>>>, AppError> {
    let (workspaces, total) = workspace_service(&state)
        .list_workspaces(auth.into(), params.limit(), params.offset())
        .await
        .map_err(map_workspace_error)?;

    let items = workspaces.into_iter().map(WorkspaceResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Workspaces",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Update workspace settings
pub async fn update_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
    Json(body): Json<UpdateWorkspaceRequest>,
) -> Result<Json<ApiResponse<WorkspaceResponse>>, AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;
    body.validate().map_err(validation_error)?;

    let update = UpdateWorkspaceDto {
        name: body.name,
        description: body.description,
        icon: body.icon,
    };

    let workspace = workspace_service(&state)
        .update_workspace(workspace_id, auth.into(), update)
        .await
        .map_err(map_workspace_error)?;

    Ok(Json(ApiResponse::ok(
        "Workspace updated",
        WorkspaceResponse::from(workspace),
    )))
}

/// Soft-delete a workspace
pub async fn delete_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;

    workspace_service(&state)
        .delete_workspace(workspace_id, auth.into())
        .await
        .map_err(map_workspace_error)?;

    Ok(Json(ApiResponse::message("Workspace deleted")))
}

/// Hard-delete a workspace and its members
pub async fn purge_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;

    workspace_service(&state)
        .purge_workspace(workspace_id, auth.into())
        .await
        .map_err(map_workspace_error)?;

    Ok(Json(ApiResponse::message("Workspace purged")))
}

/// List workspace members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<MemberResponse>>>, AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;

    let (members, total) = workspace_service(&state)
        .list_members(workspace_id, auth.into(), params.limit(), params.offset())
        .await
        .map_err(map_workspace_error)?;

    let items = members.into_iter().map(MemberResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Members",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Add a member (idempotent upsert on the role)
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
    Json(body): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberResponse>>), AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;
    let role = parse_role(&body.role)?;

    let member = workspace_service(&state)
        .add_member(workspace_id, auth.into(), body.user_id, role)
        .await
        .map_err(map_workspace_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Member added", MemberResponse::from(member))),
    ))
}

/// Change a member's role
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((workspace_id, user_id)): Path<(String, String)>,
    Json(body): Json<UpdateMemberRoleRequest>,
) -> Result<Json<ApiResponse<MemberResponse>>, AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;
    let user_id = parse_id(&user_id, "user")?;
    let role = parse_role(&body.role)?;

    let member = workspace_service(&state)
        .update_member_role(workspace_id, auth.into(), user_id, role)
        .await
        .map_err(map_workspace_error)?;

    Ok(Json(ApiResponse::ok(
        "Member role updated",
        MemberResponse::from(member),
    )))
}

/// Remove a member
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((workspace_id, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;
    let user_id = parse_id(&user_id, "user")?;

    workspace_service(&state)
        .remove_member(workspace_id, auth.into(), user_id)
        .await
        .map_err(map_workspace_error)?;

    Ok(Json(ApiResponse::message("Member removed")))
}

/// Check a user's membership; absence is a normal answer, not an error.
pub async fn get_membership(
    State(state): State<AppState>,
    Path((workspace_id, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<MembershipResponse>>, AppError> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;
    let user_id = parse_id(&user_id, "user")?;

    let membership = workspace_service(&state)
        .membership(workspace_id, user_id)
        .await
        .map_err(map_workspace_error)?;

    Ok(Json(ApiResponse::ok(
        "Membership",
        MembershipResponse::from(membership),
    )))
}
