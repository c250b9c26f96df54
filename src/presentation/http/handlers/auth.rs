//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::application::dto::response::{ApiResponse, AuthResponse, TokenResponse, UserResponse};
use crate::application::services::{AuthError, AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::{PgSessionRepository, PgUserRepository};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository, PgSessionRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        state.settings.jwt.clone(),
    )
}

fn map_auth_error(e: AuthError) -> AppError {
    match e {
        AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
        AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
        AuthError::InvalidToken | AuthError::SessionNotFound => {
            AppError::Unauthorized("Invalid token".into())
        }
        AuthError::EmailExists => AppError::Conflict("Email already registered".into()),
        AuthError::UsernameExists => AppError::Conflict("Username already taken".into()),
        AuthError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    body.validate().map_err(validation_error)?;

    let (user, tokens) = auth_service(&state)
        .register(&body.username, &body.email, &body.password)
        .await
        .map_err(map_auth_error)?;

    let response = AuthResponse {
        user: UserResponse::from_user(user, true),
        tokens: TokenResponse::from(tokens),
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User registered", response)),
    ))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    body.validate().map_err(validation_error)?;

    let tokens = auth_service(&state)
        .authenticate(&body.email, &body.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(ApiResponse::ok(
        "Logged in",
        TokenResponse::from(tokens),
    )))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let tokens = auth_service(&state)
        .refresh_token(&body.refresh_token)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(ApiResponse::ok(
        "Token refreshed",
        TokenResponse::from(tokens),
    )))
}

/// Revoke a refresh token
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth_service(&state)
        .revoke_token(&body.refresh_token)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(ApiResponse::message("Logged out")))
}
