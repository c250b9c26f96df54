//! Post like entity and repository trait.
//!
//! Maps to the `post_likes` table; unique per (post, user). The like row and
//! the post's `like_count` move together inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a user's like on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostLike {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl PostLike {
    pub fn new(post_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for PostLike data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Whether the user already likes the post.
    async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Insert the like and increment the post's `like_count` in one
    /// transaction. A unique-index race surfaces as `Conflict`.
    async fn create(&self, like: &PostLike) -> Result<PostLike, AppError>;

    /// Delete the like and decrement the counter in one transaction.
    /// Missing like is `NotFound`.
    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<(), AppError>;

    /// Like count for a post, from the edge table.
    async fn count_by_post(&self, post_id: Uuid) -> Result<i64, AppError>;
}
