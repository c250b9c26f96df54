//! Comment entity and repository trait.
//!
//! Maps to the `comments` table. The comment row and the post's
//! `comment_count` move together inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,

    /// Author; immutable after creation
    pub author_id: Uuid,

    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for Comment data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Find a live comment by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, AppError>;

    /// Insert the comment and increment the post's `comment_count` in one
    /// transaction.
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError>;

    /// Update the content of an existing comment.
    async fn update(&self, comment: &Comment) -> Result<Comment, AppError>;

    /// Tombstone the comment and decrement the counter in one transaction.
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Live comments of a post, oldest first.
    async fn find_by_post(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, AppError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64, AppError>;
}
