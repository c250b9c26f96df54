//! Comment Service
//!
//! Comments on posts; the post's `comment_count` moves with the rows.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{Comment, CommentRepository, PostRepository};

/// Comment service trait
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Comment on a post.
    async fn create_comment(
        &self,
        post_id: Uuid,
        actor: Actor,
        content: String,
    ) -> Result<Comment, CommentError>;

    /// Edit an own comment.
    async fn update_comment(
        &self,
        comment_id: Uuid,
        actor: Actor,
        content: String,
    ) -> Result<Comment, CommentError>;

    /// Delete a comment (author or super admin).
    async fn delete_comment(&self, comment_id: Uuid, actor: Actor) -> Result<(), CommentError>;

    /// Live comments of a post, oldest first.
    async fn list_comments(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), CommentError>;
}

/// Comment service errors
#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Comment not found")]
    NotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Comment must not be empty")]
    EmptyContent,

    #[error("Permission denied")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// CommentService implementation
pub struct CommentServiceImpl<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    comment_repo: Arc<C>,
    post_repo: Arc<P>,
}

impl<C, P> CommentServiceImpl<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    pub fn new(comment_repo: Arc<C>, post_repo: Arc<P>) -> Self {
        Self {
            comment_repo,
            post_repo,
        }
    }

    async fn require_post(&self, post_id: Uuid) -> Result<(), CommentError> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await
            .map_err(|e| CommentError::Internal(e.to_string()))?;

        if post.is_none() {
            return Err(CommentError::PostNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl<C, P> CommentService for CommentServiceImpl<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    async fn create_comment(
        &self,
        post_id: Uuid,
        actor: Actor,
        content: String,
    ) -> Result<Comment, CommentError> {
        if content.trim().is_empty() {
            return Err(CommentError::EmptyContent);
        }

        self.require_post(post_id).await?;

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::now_v7(),
            post_id,
            author_id: actor.id,
            content,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        self.comment_repo
            .create(&comment)
            .await
            .map_err(|e| CommentError::Internal(e.to_string()))
    }

    async fn update_comment(
        &self,
        comment_id: Uuid,
        actor: Actor,
        content: String,
    ) -> Result<Comment, CommentError> {
        if content.trim().is_empty() {
            return Err(CommentError::EmptyContent);
        }

        let mut comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await
            .map_err(|e| CommentError::Internal(e.to_string()))?
            .ok_or(CommentError::NotFound)?;

        if comment.author_id != actor.id {
            return Err(CommentError::Forbidden);
        }

        comment.content = content;
        comment.updated_at = Utc::now();

        self.comment_repo
            .update(&comment)
            .await
            .map_err(|e| CommentError::Internal(e.to_string()))
    }

    async fn delete_comment(&self, comment_id: Uuid, actor: Actor) -> Result<(), CommentError> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await
            .map_err(|e| CommentError::Internal(e.to_string()))?
            .ok_or(CommentError::NotFound)?;

        if comment.author_id != actor.id && !actor.is_super_admin {
            return Err(CommentError::Forbidden);
        }

        self.comment_repo
            .soft_delete(comment_id)
            .await
            .map_err(|e| CommentError::Internal(e.to_string()))
    }

    async fn list_comments(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), CommentError> {
        self.require_post(post_id).await?;

        let comments = self
            .comment_repo
            .find_by_post(post_id, limit, offset)
            .await
            .map_err(|e| CommentError::Internal(e.to_string()))?;

        let total = self
            .comment_repo
            .count_by_post(post_id)
            .await
            .map_err(|e| CommentError::Internal(e.to_string()))?;

        Ok((comments, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{MockCommentRepository, MockPostRepository};

    fn actor(id: Uuid) -> Actor {
        Actor {
            id,
            is_super_admin: false,
        }
    }

    #[tokio::test]
    async fn empty_comment_is_rejected() {
        let svc = CommentServiceImpl::new(
            Arc::new(MockCommentRepository::new()),
            Arc::new(MockPostRepository::new()),
        );

        let result = svc
            .create_comment(Uuid::now_v7(), actor(Uuid::now_v7()), "  ".into())
            .await;

        assert!(matches!(result, Err(CommentError::EmptyContent)));
    }

    #[tokio::test]
    async fn commenting_on_missing_post_fails() {
        let mut post_repo = MockPostRepository::new();
        post_repo.expect_find_by_id().returning(|_| Ok(None));

        let svc = CommentServiceImpl::new(
            Arc::new(MockCommentRepository::new()),
            Arc::new(post_repo),
        );

        let result = svc
            .create_comment(Uuid::now_v7(), actor(Uuid::now_v7()), "First!".into())
            .await;

        assert!(matches!(result, Err(CommentError::PostNotFound)));
    }

    #[tokio::test]
    async fn only_the_author_can_edit() {
        let author = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::now_v7(),
            post_id: Uuid::now_v7(),
            author_id: author,
            content: "original".into(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let comment_id = comment.id;

        let mut comment_repo = MockCommentRepository::new();
        comment_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(comment.clone())));
        comment_repo.expect_update().never();

        let svc =
            CommentServiceImpl::new(Arc::new(comment_repo), Arc::new(MockPostRepository::new()));

        let result = svc
            .update_comment(comment_id, actor(stranger), "edited".into())
            .await;

        assert!(matches!(result, Err(CommentError::Forbidden)));
    }
}
