//! Follow edge entity and repository trait.
//!
//! Maps to the `user_follows` table: a directed edge between two users with
//! denormalized counters on each side. Edge writes and counter updates
//! always share one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;
use crate::shared::error::AppError;

/// Represents a directed follow relationship.
///
/// Maps to the `user_follows` table:
/// - id: UUID PRIMARY KEY
/// - follower_id: UUID NOT NULL REFERENCES users(id)
/// - following_id: UUID NOT NULL REFERENCES users(id)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - UNIQUE (follower_id, following_id), CHECK (follower_id <> following_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFollow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl UserFollow {
    pub fn new(follower_id: Uuid, following_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            follower_id,
            following_id,
            created_at: Utc::now(),
        }
    }
}

/// Recomputed counter pair returned by the drift-repair path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowCounts {
    pub followers_count: i64,
    pub following_count: i64,
}

/// Repository trait for follow-graph data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Whether the edge (follower -> following) exists.
    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool, AppError>;

    /// Insert the edge and bump both denormalized counters in one
    /// transaction. A unique-index race surfaces as `Conflict`.
    async fn create(&self, follow: &UserFollow) -> Result<UserFollow, AppError>;

    /// Delete the edge and decrement both counters in one transaction.
    /// Missing edge is `NotFound`.
    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), AppError>;

    /// Users following `user_id`, newest edge first.
    async fn followers_of(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError>;

    async fn count_followers(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Users `user_id` follows, newest edge first.
    async fn following_of(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError>;

    async fn count_following(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Users followed by both `a` and `b`, computed as a double join in SQL.
    async fn mutual_follows(&self, a: Uuid, b: Uuid) -> Result<Vec<User>, AppError>;

    /// Recompute both counters from the edge table and overwrite the
    /// denormalized fields. Repair path for drift.
    async fn recalculate_counts(&self, user_id: Uuid) -> Result<FollowCounts, AppError>;
}
