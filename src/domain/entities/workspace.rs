//! Workspace entity and repository trait.
//!
//! Maps to the `workspaces` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a workspace: the top-level container owning pages and members.
///
/// Maps to the `workspaces` table:
/// - id: UUID PRIMARY KEY
/// - name: VARCHAR(100) NOT NULL (unique per owner among live rows)
/// - description: TEXT NULL
/// - icon: TEXT NULL
/// - owner_id: UUID NOT NULL REFERENCES users(id)
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// Creation inserts the workspace row and an `admin` membership row for the
/// owner in one transaction; neither exists without the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// UUID primary key
    pub id: Uuid,

    /// Workspace name (1-100 characters)
    pub name: String,

    /// Workspace description
    pub description: Option<String>,

    /// Icon (emoji or image URL)
    pub icon: Option<String>,

    /// User ID of the workspace owner
    pub owner_id: Uuid,

    /// Soft-delete tombstone
    pub is_deleted: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Check if a user is the owner of this workspace.
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Repository trait for Workspace data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Find a live workspace by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, AppError>;

    /// Find a workspace by ID regardless of the tombstone. Used by the
    /// purge path, which must reach soft-deleted workspaces too.
    async fn find_by_id_any(&self, id: Uuid) -> Result<Option<Workspace>, AppError>;

    /// Check whether the owner already has a live workspace with this name.
    async fn name_exists(&self, owner_id: Uuid, name: &str) -> Result<bool, AppError>;

    /// Insert the workspace row together with an `admin` membership row for
    /// the owner. Both writes share one transaction.
    async fn create_with_admin(&self, workspace: &Workspace) -> Result<Workspace, AppError>;

    /// List live workspaces the user is a member of, newest first.
    async fn find_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Workspace>, AppError>;

    /// Count live workspaces the user is a member of.
    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Update name/description/icon of an existing workspace.
    async fn update(&self, workspace: &Workspace) -> Result<Workspace, AppError>;

    /// Tombstone a workspace. Pages and blocks stay addressable by ID but
    /// drop out of default queries.
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Hard-delete a workspace: members first, then the workspace row, in
    /// one transaction, bypassing the tombstone filter unconditionally.
    async fn purge(&self, id: Uuid) -> Result<(), AppError>;
}
