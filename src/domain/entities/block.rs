//! Block entity and repository trait.
//!
//! Maps to the `blocks` table. Blocks are the content units of a page,
//! optionally nested under a parent block, ordered among siblings by a
//! float `position` (fractional indexing).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Gap used when appending or prepending relative to one neighbour.
const POSITION_GAP: f64 = 1024.0;

/// Represents a content block within a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// UUID primary key
    pub id: Uuid,

    /// Owning page (required)
    pub page_id: Uuid,

    /// Optional parent block for nesting
    pub parent_id: Option<Uuid>,

    /// Type tag ("paragraph", "heading", "todo", ...)
    pub block_type: String,

    /// JSON-encoded props/content (JSONB column)
    pub content: serde_json::Value,

    /// Sibling ordering key; midpoint insertion avoids renumbering
    pub position: f64,

    /// User who created the block; immutable after creation
    pub created_by: Uuid,

    /// Soft-delete tombstone
    pub is_deleted: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Compute a position between two sibling positions.
///
/// With both neighbours present the midpoint is returned; with one
/// neighbour the position steps past it by a fixed gap. Repeated midpoint
/// insertion between the same pair eventually exhausts float precision, at
/// which point the returned value equals a neighbour and the caller must
/// rewrite sibling positions through the ordinary update path.
pub fn position_between(before: Option<f64>, after: Option<f64>) -> f64 {
    match (before, after) {
        (None, None) => POSITION_GAP,
        (Some(b), None) => b + POSITION_GAP,
        (None, Some(a)) => a - POSITION_GAP,
        (Some(b), Some(a)) => (b + a) / 2.0,
    }
}

/// Repository trait for Block data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockRepository: Send + Sync {
    /// Find a live block by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Block>, AppError>;

    /// Insert a new block.
    async fn create(&self, block: &Block) -> Result<Block, AppError>;

    /// Update type/content of an existing block.
    async fn update(&self, block: &Block) -> Result<Block, AppError>;

    /// Move a block to a new sibling position.
    async fn update_position(&self, id: Uuid, position: f64) -> Result<(), AppError>;

    /// Tombstone a block.
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Live blocks of a page ordered by position.
    async fn find_by_page(&self, page_id: Uuid) -> Result<Vec<Block>, AppError>;

    /// Direct children of a block ordered by position.
    async fn find_children(&self, parent_id: Uuid) -> Result<Vec<Block>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_position_is_the_gap() {
        assert_eq!(position_between(None, None), POSITION_GAP);
    }

    #[test]
    fn append_steps_past_the_last_sibling() {
        assert_eq!(position_between(Some(2048.0), None), 2048.0 + POSITION_GAP);
    }

    #[test]
    fn prepend_steps_before_the_first_sibling() {
        assert_eq!(position_between(None, Some(1024.0)), 0.0);
    }

    #[test]
    fn midpoint_lands_strictly_between_distinct_neighbours() {
        let p = position_between(Some(1024.0), Some(2048.0));
        assert!(p > 1024.0 && p < 2048.0);
    }

    #[test]
    fn repeated_midpoints_converge_but_stay_ordered() {
        let mut lo = 0.0_f64;
        let hi = 1.0_f64;
        for _ in 0..50 {
            let mid = position_between(Some(lo), Some(hi));
            assert!(mid >= lo && mid <= hi);
            lo = mid;
        }
    }
}
