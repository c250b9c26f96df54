//! Tag entity and repository trait.
//!
//! Maps to the `tags` table and the `post_tags` junction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a content tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Tag data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Find a tag by name, inserting it if absent.
    async fn find_or_create(&self, name: &str) -> Result<Tag, AppError>;

    /// Replace a post's tag set in one transaction: clear the junction,
    /// find-or-create each name, re-link.
    async fn set_post_tags(&self, post_id: Uuid, names: &[String]) -> Result<Vec<Tag>, AppError>;

    /// Tags attached to a post.
    async fn tags_for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, AppError>;

    /// List tags alphabetically.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Tag>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}
