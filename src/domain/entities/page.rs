//! Page entity and repository trait.
//!
//! Maps to the `pages` table. Pages form a tree per workspace through the
//! nullable `parent_id` self-reference; children retrieval is a flat filter,
//! callers assemble trees client-side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a document page within a workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// UUID primary key
    pub id: Uuid,

    /// Owning workspace (required)
    pub workspace_id: Uuid,

    /// Optional parent page for nesting
    pub parent_id: Option<Uuid>,

    /// Page title (non-empty)
    pub title: String,

    /// Icon (emoji or image URL)
    pub icon: Option<String>,

    /// User who created the page; immutable after creation
    pub created_by: Uuid,

    /// Soft-delete tombstone
    pub is_deleted: bool,

    /// Creation timestamp; immutable after creation
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for Page data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Find a live page by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, AppError>;

    /// Insert a new page.
    async fn create(&self, page: &Page) -> Result<Page, AppError>;

    /// Persist an updated page. The caller is responsible for carrying the
    /// original `created_by`/`created_at` onto the row.
    async fn update(&self, page: &Page) -> Result<Page, AppError>;

    /// Tombstone a page.
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError>;

    /// List live pages of a workspace, newest first.
    async fn find_by_workspace(
        &self,
        workspace_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Page>, AppError>;

    /// Count live pages of a workspace.
    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<i64, AppError>;

    /// Direct children of a page (flat filter by `parent_id`, no recursion).
    async fn find_children(&self, parent_id: Uuid) -> Result<Vec<Page>, AppError>;
}
