//! Chat Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{
    CreateConversationRequest, PaginationParams, SendMessageRequest,
};
use crate::application::dto::response::{
    ApiResponse, ConversationResponse, MessageResponse, Paginated,
};
use crate::application::services::{
    ChatError, ChatService, ChatServiceImpl, CreateConversationDto,
};
use crate::infrastructure::repositories::PgConversationRepository;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn chat_service(state: &AppState) -> ChatServiceImpl<PgConversationRepository> {
    ChatServiceImpl::new(Arc::new(PgConversationRepository::new(state.db.clone())))
}

fn map_chat_error(e: ChatError) -> AppError {
    match e {
        ChatError::NotFound => AppError::NotFound("Conversation not found".into()),
        ChatError::MessageNotFound => AppError::NotFound("Message not found".into()),
        ChatError::Forbidden => AppError::Forbidden("Not a participant".into()),
        ChatError::EmptyMessage => AppError::Validation("Message must not be empty".into()),
        ChatError::NoParticipants => {
            AppError::Validation("A conversation needs at least one other participant".into())
        }
        ChatError::ParticipantNotFound => AppError::NotFound("Participant user not found".into()),
        ChatError::Internal(msg) => AppError::Internal(msg),
    }
}

fn parse_conversation_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid conversation ID".into()))
}

/// Open a conversation
pub async fn create_conversation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ConversationResponse>>), AppError> {
    body.validate().map_err(validation_error)?;

    let request = CreateConversationDto {
        name: body.name,
        participant_ids: body.participant_ids,
    };

    let conversation = chat_service(&state)
        .create_conversation(auth.into(), request)
        .await
        .map_err(map_chat_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Conversation created",
            ConversationResponse::from(conversation),
        )),
    ))
}

/// List the authenticated user's conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<ConversationResponse>>>, AppError> {
    let (conversations, total) = chat_service(&state)
        .list_conversations(auth.into(), params.limit(), params.offset())
        .await
        .map_err(map_chat_error)?;

    let items = conversations
        .into_iter()
        .map(ConversationResponse::from)
        .collect();

    Ok(Json(ApiResponse::ok(
        "Conversations",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Get a conversation
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiResponse<ConversationResponse>>, AppError> {
    let conversation_id = parse_conversation_id(&conversation_id)?;

    let conversation = chat_service(&state)
        .get_conversation(conversation_id, auth.into())
        .await
        .map_err(map_chat_error)?;

    Ok(Json(ApiResponse::ok(
        "Conversation",
        ConversationResponse::from(conversation),
    )))
}

/// Send a message
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(conversation_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), AppError> {
    let conversation_id = parse_conversation_id(&conversation_id)?;
    body.validate().map_err(validation_error)?;

    let message = chat_service(&state)
        .send_message(conversation_id, auth.into(), body.content)
        .await
        .map_err(map_chat_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Message sent",
            MessageResponse::from(message),
        )),
    ))
}

/// Message history, newest first
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(conversation_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paginated<MessageResponse>>>, AppError> {
    let conversation_id = parse_conversation_id(&conversation_id)?;

    let (messages, total) = chat_service(&state)
        .messages(conversation_id, auth.into(), params.limit(), params.offset())
        .await
        .map_err(map_chat_error)?;

    let items = messages.into_iter().map(MessageResponse::from).collect();

    Ok(Json(ApiResponse::ok(
        "Messages",
        Paginated::new(items, total, params.page(), params.limit()),
    )))
}

/// Delete an own message
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let message_id: Uuid = message_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid message ID".into()))?;

    chat_service(&state)
        .delete_message(message_id, auth.into())
        .await
        .map_err(map_chat_error)?;

    Ok(Json(ApiResponse::message("Message deleted")))
}
