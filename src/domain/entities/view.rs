//! Post view entity and repository trait.
//!
//! Maps to the `post_views` table. Authenticated views are unique per
//! (post, user); anonymous traffic inserts a row per hit, identified only by
//! IP and user agent. The row insert and the post's `view_count` increment
//! share one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents one recorded view of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub post_id: Uuid,

    /// Present for authenticated viewers only
    pub user_id: Option<Uuid>,

    /// Anonymous metadata, kept when no credential was presented
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl PostView {
    pub fn authenticated(post_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            user_id: Some(user_id),
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    pub fn anonymous(post_id: Uuid, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            user_id: None,
            ip_address,
            user_agent,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for PostView data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ViewRepository: Send + Sync {
    /// Record a view. Returns `true` when a row was inserted (and the
    /// counter bumped), `false` when an authenticated duplicate made the
    /// call a silent no-op.
    async fn record(&self, view: &PostView) -> Result<bool, AppError>;

    /// Whether the user has any recorded view of the post.
    async fn has_viewed(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// View-row count for a post.
    async fn count_by_post(&self, post_id: Uuid) -> Result<i64, AppError>;
}
