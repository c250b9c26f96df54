//! Chat conversation entities and repository trait.
//!
//! Maps to the `conversations`, `conversation_participants` and
//! `conversation_messages` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a chat conversation between two or more users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,

    /// Optional display name (group chats)
    pub name: Option<String>,

    /// Whether this is a group conversation
    pub is_group: bool,

    /// User who opened the conversation
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
}

/// Represents a message inside a conversation. Append-only with soft delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for conversation data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Insert the conversation row and its participant rows in one
    /// transaction.
    async fn create_with_participants(
        &self,
        conversation: &Conversation,
        participant_ids: &[Uuid],
    ) -> Result<Conversation, AppError>;

    /// Find a conversation by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, AppError>;

    /// Conversations the user participates in, newest first.
    async fn find_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>, AppError>;

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Whether the user participates in the conversation.
    async fn is_participant(&self, conversation_id: Uuid, user_id: Uuid)
        -> Result<bool, AppError>;

    /// Participant user IDs of a conversation.
    async fn participants(&self, conversation_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    /// Append a message.
    async fn insert_message(
        &self,
        message: &ConversationMessage,
    ) -> Result<ConversationMessage, AppError>;

    /// Live messages, newest first.
    async fn messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationMessage>, AppError>;

    async fn count_messages(&self, conversation_id: Uuid) -> Result<i64, AppError>;

    /// Tombstone a message; only the sender's own messages match.
    async fn soft_delete_message(&self, message_id: Uuid, sender_id: Uuid)
        -> Result<(), AppError>;
}
