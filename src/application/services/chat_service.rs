//! Chat Service
//!
//! Conversations and their message history. Every read and write is gated
//! on participation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{Conversation, ConversationMessage, ConversationRepository};
use crate::shared::error::AppError;

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Open a conversation; the creator always participates.
    async fn create_conversation(
        &self,
        actor: Actor,
        request: CreateConversationDto,
    ) -> Result<Conversation, ChatError>;

    /// Get a conversation (participants only).
    async fn get_conversation(
        &self,
        conversation_id: Uuid,
        actor: Actor,
    ) -> Result<Conversation, ChatError>;

    /// Conversations the actor participates in.
    async fn list_conversations(
        &self,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Conversation>, i64), ChatError>;

    /// Send a message into a conversation.
    async fn send_message(
        &self,
        conversation_id: Uuid,
        actor: Actor,
        content: String,
    ) -> Result<ConversationMessage, ChatError>;

    /// Message history, newest first (participants only).
    async fn messages(
        &self,
        conversation_id: Uuid,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ConversationMessage>, i64), ChatError>;

    /// Delete an own message.
    async fn delete_message(&self, message_id: Uuid, actor: Actor) -> Result<(), ChatError>;
}

/// Create conversation request
#[derive(Debug, Clone)]
pub struct CreateConversationDto {
    pub name: Option<String>,
    pub participant_ids: Vec<Uuid>,
}

/// Chat service errors
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Conversation not found")]
    NotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Not a participant")]
    Forbidden,

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("A conversation needs at least one other participant")]
    NoParticipants,

    #[error("Participant user not found")]
    ParticipantNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// ChatService implementation
pub struct ChatServiceImpl<C>
where
    C: ConversationRepository,
{
    conversation_repo: Arc<C>,
}

impl<C> ChatServiceImpl<C>
where
    C: ConversationRepository,
{
    pub fn new(conversation_repo: Arc<C>) -> Self {
        Self { conversation_repo }
    }

    async fn require_participant(
        &self,
        conversation_id: Uuid,
        actor: Actor,
    ) -> Result<(), ChatError> {
        let is_participant = self
            .conversation_repo
            .is_participant(conversation_id, actor.id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        if !is_participant {
            return Err(ChatError::Forbidden);
        }
        Ok(())
    }
}

#[async_trait]
impl<C> ChatService for ChatServiceImpl<C>
where
    C: ConversationRepository + 'static,
{
    async fn create_conversation(
        &self,
        actor: Actor,
        request: CreateConversationDto,
    ) -> Result<Conversation, ChatError> {
        // The creator always participates; dedupe while keeping order.
        let mut participants = vec![actor.id];
        for id in request.participant_ids {
            if !participants.contains(&id) {
                participants.push(id);
            }
        }

        if participants.len() < 2 {
            return Err(ChatError::NoParticipants);
        }

        let conversation = Conversation {
            id: Uuid::now_v7(),
            name: request.name,
            is_group: participants.len() > 2,
            created_by: actor.id,
            created_at: Utc::now(),
        };

        self.conversation_repo
            .create_with_participants(&conversation, &participants)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => ChatError::ParticipantNotFound,
                e => ChatError::Internal(e.to_string()),
            })
    }

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
        actor: Actor,
    ) -> Result<Conversation, ChatError> {
        let conversation = self
            .conversation_repo
            .find_by_id(conversation_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?
            .ok_or(ChatError::NotFound)?;

        self.require_participant(conversation_id, actor).await?;
        Ok(conversation)
    }

    async fn list_conversations(
        &self,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Conversation>, i64), ChatError> {
        let conversations = self
            .conversation_repo
            .find_for_user(actor.id, limit, offset)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        let total = self
            .conversation_repo
            .count_for_user(actor.id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        Ok((conversations, total))
    }

    async fn send_message(
        &self,
        conversation_id: Uuid,
        actor: Actor,
        content: String,
    ) -> Result<ConversationMessage, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let conversation = self
            .conversation_repo
            .find_by_id(conversation_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        if conversation.is_none() {
            return Err(ChatError::NotFound);
        }

        self.require_participant(conversation_id, actor).await?;

        let message = ConversationMessage {
            id: Uuid::now_v7(),
            conversation_id,
            sender_id: actor.id,
            content,
            is_deleted: false,
            created_at: Utc::now(),
        };

        self.conversation_repo
            .insert_message(&message)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }

    async fn messages(
        &self,
        conversation_id: Uuid,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ConversationMessage>, i64), ChatError> {
        self.require_participant(conversation_id, actor).await?;

        let messages = self
            .conversation_repo
            .messages(conversation_id, limit, offset)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        let total = self
            .conversation_repo
            .count_messages(conversation_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        Ok((messages, total))
    }

    async fn delete_message(&self, message_id: Uuid, actor: Actor) -> Result<(), ChatError> {
        self.conversation_repo
            .soft_delete_message(message_id, actor.id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => ChatError::MessageNotFound,
                e => ChatError::Internal(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MockConversationRepository;

    fn actor(id: Uuid) -> Actor {
        Actor {
            id,
            is_super_admin: false,
        }
    }

    #[tokio::test]
    async fn conversation_needs_another_participant() {
        let svc = ChatServiceImpl::new(Arc::new(MockConversationRepository::new()));
        let creator = Uuid::now_v7();

        // Only the creator (explicitly repeated too) is not enough.
        let result = svc
            .create_conversation(
                actor(creator),
                CreateConversationDto {
                    name: None,
                    participant_ids: vec![creator],
                },
            )
            .await;

        assert!(matches!(result, Err(ChatError::NoParticipants)));
    }

    #[tokio::test]
    async fn creator_is_always_included_and_group_flag_follows_size() {
        let creator = Uuid::now_v7();
        let others = [Uuid::now_v7(), Uuid::now_v7()];

        let mut repo = MockConversationRepository::new();
        repo.expect_create_with_participants()
            .withf(move |conversation, participants| {
                conversation.is_group
                    && participants.first() == Some(&creator)
                    && participants.len() == 3
            })
            .returning(|conversation, _| Ok(conversation.clone()));

        let svc = ChatServiceImpl::new(Arc::new(repo));
        let conversation = svc
            .create_conversation(
                actor(creator),
                CreateConversationDto {
                    name: Some("team".into()),
                    participant_ids: others.to_vec(),
                },
            )
            .await
            .unwrap();

        assert!(conversation.is_group);
    }

    #[tokio::test]
    async fn non_participant_cannot_read_messages() {
        let mut repo = MockConversationRepository::new();
        repo.expect_is_participant().returning(|_, _| Ok(false));
        repo.expect_messages().never();

        let svc = ChatServiceImpl::new(Arc::new(repo));
        let result = svc
            .messages(Uuid::now_v7(), actor(Uuid::now_v7()), 50, 0)
            .await;

        assert!(matches!(result, Err(ChatError::Forbidden)));
    }
}
