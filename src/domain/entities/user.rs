//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a user account on the platform.
///
/// Maps to the `users` table:
/// - id: UUID PRIMARY KEY
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - display_name: VARCHAR(64) NULL
/// - avatar_url: TEXT NULL
/// - bio: TEXT NULL
/// - is_super_admin: BOOLEAN NOT NULL DEFAULT FALSE
/// - followers_count: BIGINT NOT NULL DEFAULT 0
/// - following_count: BIGINT NOT NULL DEFAULT 0
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// The follower/following counters are denormalized. They are only mutated
/// inside the same transaction that inserts or deletes the follow edge; the
/// repair path recomputes them from the `user_follows` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID primary key
    pub id: Uuid,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name (optional, up to 64 characters)
    pub display_name: Option<String>,

    /// URL to the user's avatar image
    pub avatar_url: Option<String>,

    /// Bio/about text
    pub bio: Option<String>,

    /// Platform-wide administrator flag
    pub is_super_admin: bool,

    /// Denormalized count of users following this user
    pub followers_count: i64,

    /// Denormalized count of users this user follows
    pub following_count: i64,

    /// Soft-delete tombstone
    pub is_deleted: bool,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Get the user's display name, falling back to username if not set.
    pub fn display_name_or_username(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Repository trait for User data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a live user by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Find a live user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Check whether an email is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check whether a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Insert a new user.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Update profile fields of an existing user.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Tombstone a user.
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError>;

    /// List live users, newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError>;

    /// Count live users.
    async fn count(&self) -> Result<i64, AppError>;
}
