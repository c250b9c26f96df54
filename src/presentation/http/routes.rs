//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, optional_auth_middleware, track_metrics};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .nest("/auth", auth_routes())
        // Protected routes (require authentication)
        .nest("/users", user_routes(state.clone()))
        .nest("/workspaces", workspace_routes(state.clone()))
        .nest("/pages", page_routes(state.clone()))
        .nest("/blocks", block_routes(state.clone()))
        .nest("/posts", post_routes(state.clone()))
        .nest("/comments", comment_routes(state.clone()))
        .nest("/tags", tag_routes(state.clone()))
        .nest("/conversations", chat_routes(state.clone()))
        .nest("/uploads", upload_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout))
}

/// User and follow-graph routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/@me",
            get(handlers::user::get_current_user)
                .patch(handlers::user::update_current_user)
                .delete(handlers::user::delete_current_user),
        )
        .route("/", get(handlers::user::list_users))
        .route("/{user_id}", get(handlers::user::get_user))
        .route("/{user_id}/posts", get(handlers::post::list_user_posts))
        .route(
            "/{user_id}/follow",
            post(handlers::user::follow_user).delete(handlers::user::unfollow_user),
        )
        .route("/{user_id}/followers", get(handlers::user::get_followers))
        .route("/{user_id}/following", get(handlers::user::get_following))
        .route(
            "/{user_id}/mutuals/{other_id}",
            get(handlers::user::get_mutual_follows),
        )
        .route(
            "/{user_id}/follow-counts/recalculate",
            post(handlers::user::recalculate_follow_counts),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Workspace and membership routes (protected)
fn workspace_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::workspace::create_workspace).get(handlers::workspace::list_workspaces),
        )
        .route(
            "/{workspace_id}",
            get(handlers::workspace::get_workspace)
                .patch(handlers::workspace::update_workspace)
                .delete(handlers::workspace::delete_workspace),
        )
        .route(
            "/{workspace_id}/purge",
            delete(handlers::workspace::purge_workspace),
        )
        .route(
            "/{workspace_id}/members",
            get(handlers::workspace::list_members).post(handlers::workspace::add_member),
        )
        .route(
            "/{workspace_id}/members/{user_id}",
            get(handlers::workspace::get_membership)
                .patch(handlers::workspace::update_member_role)
                .delete(handlers::workspace::remove_member),
        )
        .route(
            "/{workspace_id}/pages",
            get(handlers::page::list_workspace_pages),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Page routes (protected)
fn page_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::page::create_page))
        .route(
            "/{page_id}",
            get(handlers::page::get_page)
                .patch(handlers::page::update_page)
                .delete(handlers::page::delete_page),
        )
        .route("/{page_id}/children", get(handlers::page::get_page_children))
        .route("/{page_id}/blocks", get(handlers::page::get_page_blocks))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Block routes (protected)
fn block_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::block::create_block))
        .route(
            "/{block_id}",
            get(handlers::block::get_block)
                .patch(handlers::block::update_block)
                .delete(handlers::block::delete_block),
        )
        .route("/{block_id}/position", patch(handlers::block::move_block))
        .route(
            "/{block_id}/children",
            get(handlers::block::get_block_children),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Post routes. View recording accepts anonymous traffic; everything else
/// requires authentication.
fn post_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/",
            post(handlers::post::create_post).get(handlers::post::list_posts),
        )
        .route(
            "/{post_id}",
            get(handlers::post::get_post)
                .patch(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
        .route(
            "/{post_id}/like",
            post(handlers::post::like_post).delete(handlers::post::unlike_post),
        )
        .route(
            "/{post_id}/comments",
            get(handlers::comment::list_comments).post(handlers::comment::create_comment),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let view = Router::new()
        .route("/{post_id}/view", post(handlers::post::record_view))
        .route_layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ));

    protected.merge(view)
}

/// Comment routes (protected)
fn comment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/{comment_id}",
            patch(handlers::comment::update_comment).delete(handlers::comment::delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Tag routes (protected)
fn tag_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::post::list_tags))
        .route("/{tag_name}/posts", get(handlers::post::list_posts_by_tag))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Chat routes (protected)
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::chat::create_conversation).get(handlers::chat::list_conversations),
        )
        .route("/{conversation_id}", get(handlers::chat::get_conversation))
        .route(
            "/{conversation_id}/messages",
            get(handlers::chat::list_messages).post(handlers::chat::send_message),
        )
        .route("/messages/{message_id}", delete(handlers::chat::delete_message))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Upload routes (protected)
fn upload_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::upload::upload_file))
        .route(
            "/{user_id}/{file}",
            get(handlers::upload::download_file).delete(handlers::upload::delete_file),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
