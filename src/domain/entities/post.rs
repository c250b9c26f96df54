//! Post entity and repository trait.
//!
//! Maps to the `posts` table. Like/view/comment counters are denormalized
//! and maintained inside the transactions that write the backing rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a published post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// UUID primary key
    pub id: Uuid,

    /// Author; immutable after creation
    pub author_id: Uuid,

    /// Title (non-empty, up to 255 characters)
    pub title: String,

    /// Body content
    pub content: String,

    /// Optional cover image URL
    pub image_url: Option<String>,

    /// Denormalized like count
    pub like_count: i64,

    /// Denormalized view count
    pub view_count: i64,

    /// Denormalized comment count
    pub comment_count: i64,

    /// Soft-delete tombstone
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for Post data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a live post by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    /// Insert a new post.
    async fn create(&self, post: &Post) -> Result<Post, AppError>;

    /// Update title/content/image of an existing post.
    async fn update(&self, post: &Post) -> Result<Post, AppError>;

    /// Tombstone a post.
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError>;

    /// List live posts, newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Post>, AppError>;

    /// Count live posts.
    async fn count(&self) -> Result<i64, AppError>;

    /// List live posts by an author, newest first.
    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, AppError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64, AppError>;

    /// List live posts carrying a tag, newest first.
    async fn list_by_tag(
        &self,
        tag_name: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, AppError>;

    async fn count_by_tag(&self, tag_name: &str) -> Result<i64, AppError>;
}
