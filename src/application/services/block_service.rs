//! Block Service
//!
//! Block operations inside a page: creation appends after the last sibling,
//! moves use fractional midpoint positions between the named neighbours.
//! Access goes through the page's workspace membership.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{
    position_between, Block, BlockRepository, MemberRepository, MemberRole, Page, PageRepository,
};

/// Block service trait
#[async_trait]
pub trait BlockService: Send + Sync {
    /// Create a block, appended after the current last sibling.
    async fn create_block(&self, actor: Actor, request: CreateBlockDto)
        -> Result<Block, BlockError>;

    /// Get a block by ID (workspace members only).
    async fn get_block(&self, block_id: Uuid, actor: Actor) -> Result<Block, BlockError>;

    /// Update a block's type tag and content.
    async fn update_block(
        &self,
        block_id: Uuid,
        actor: Actor,
        update: UpdateBlockDto,
    ) -> Result<Block, BlockError>;

    /// Move a block between two siblings (either side optional).
    async fn move_block(
        &self,
        block_id: Uuid,
        actor: Actor,
        request: MoveBlockDto,
    ) -> Result<(), BlockError>;

    /// Soft-delete a block.
    async fn delete_block(&self, block_id: Uuid, actor: Actor) -> Result<(), BlockError>;

    /// Live blocks of a page in sibling order.
    async fn page_blocks(&self, page_id: Uuid, actor: Actor) -> Result<Vec<Block>, BlockError>;

    /// Direct children of a block in sibling order.
    async fn children(&self, block_id: Uuid, actor: Actor) -> Result<Vec<Block>, BlockError>;
}

/// Create block request
#[derive(Debug, Clone)]
pub struct CreateBlockDto {
    pub page_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub block_type: String,
    pub content: serde_json::Value,
}

/// Update block request
#[derive(Debug, Clone, Default)]
pub struct UpdateBlockDto {
    pub block_type: Option<String>,
    pub content: Option<serde_json::Value>,
}

/// Move request: the IDs of the siblings the block should land between.
#[derive(Debug, Clone, Default)]
pub struct MoveBlockDto {
    pub after_id: Option<Uuid>,
    pub before_id: Option<Uuid>,
}

/// Block service errors
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("Block not found")]
    NotFound,

    #[error("Page not found")]
    PageNotFound,

    #[error("Permission denied")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// BlockService implementation
pub struct BlockServiceImpl<B, P, M>
where
    B: BlockRepository,
    P: PageRepository,
    M: MemberRepository,
{
    block_repo: Arc<B>,
    page_repo: Arc<P>,
    member_repo: Arc<M>,
}

impl<B, P, M> BlockServiceImpl<B, P, M>
where
    B: BlockRepository,
    P: PageRepository,
    M: MemberRepository,
{
    pub fn new(block_repo: Arc<B>, page_repo: Arc<P>, member_repo: Arc<M>) -> Self {
        Self {
            block_repo,
            page_repo,
            member_repo,
        }
    }

    async fn require_page(&self, page_id: Uuid) -> Result<Page, BlockError> {
        self.page_repo
            .find_by_id(page_id)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))?
            .ok_or(BlockError::PageNotFound)
    }

    async fn require_block(&self, block_id: Uuid) -> Result<Block, BlockError> {
        self.block_repo
            .find_by_id(block_id)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))?
            .ok_or(BlockError::NotFound)
    }

    async fn check_access(
        &self,
        page: &Page,
        actor: Actor,
        needs_edit: bool,
    ) -> Result<(), BlockError> {
        if actor.is_super_admin {
            return Ok(());
        }

        let role = self
            .member_repo
            .role_of(page.workspace_id, actor.id)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))?
            .ok_or(BlockError::Forbidden)?;

        if needs_edit && !role.can_edit() {
            return Err(BlockError::Forbidden);
        }

        Ok(())
    }

    /// Position of a sibling looked up by ID, if given.
    async fn sibling_position(&self, id: Option<Uuid>) -> Result<Option<f64>, BlockError> {
        match id {
            Some(id) => Ok(Some(self.require_block(id).await?.position)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<B, P, M> BlockService for BlockServiceImpl<B, P, M>
where
    B: BlockRepository + 'static,
    P: PageRepository + 'static,
    M: MemberRepository + 'static,
{
    async fn create_block(
        &self,
        actor: Actor,
        request: CreateBlockDto,
    ) -> Result<Block, BlockError> {
        let page = self.require_page(request.page_id).await?;
        self.check_access(&page, actor, true).await?;

        // Append after the current last sibling under the same parent.
        let siblings = match request.parent_id {
            Some(parent_id) => self.block_repo.find_children(parent_id).await,
            None => self.block_repo.find_by_page(request.page_id).await,
        }
        .map_err(|e| BlockError::Internal(e.to_string()))?;

        let last = siblings
            .iter()
            .filter(|b| b.parent_id == request.parent_id)
            .map(|b| b.position)
            .fold(None, |acc: Option<f64>, p| {
                Some(acc.map_or(p, |a| a.max(p)))
            });

        let now = Utc::now();
        let block = Block {
            id: Uuid::now_v7(),
            page_id: request.page_id,
            parent_id: request.parent_id,
            block_type: request.block_type,
            // An omitted content field arrives as JSON null; store an empty
            // object instead, the column is NOT NULL.
            content: if request.content.is_null() {
                serde_json::json!({})
            } else {
                request.content
            },
            position: position_between(last, None),
            created_by: actor.id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        self.block_repo
            .create(&block)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))
    }

    async fn get_block(&self, block_id: Uuid, actor: Actor) -> Result<Block, BlockError> {
        let block = self.require_block(block_id).await?;
        let page = self.require_page(block.page_id).await?;
        self.check_access(&page, actor, false).await?;
        Ok(block)
    }

    async fn update_block(
        &self,
        block_id: Uuid,
        actor: Actor,
        update: UpdateBlockDto,
    ) -> Result<Block, BlockError> {
        let existing = self.require_block(block_id).await?;
        let page = self.require_page(existing.page_id).await?;
        self.check_access(&page, actor, true).await?;

        let block = Block {
            block_type: update.block_type.unwrap_or(existing.block_type.clone()),
            content: update.content.unwrap_or(existing.content.clone()),
            updated_at: Utc::now(),
            ..existing
        };

        self.block_repo
            .update(&block)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))
    }

    async fn move_block(
        &self,
        block_id: Uuid,
        actor: Actor,
        request: MoveBlockDto,
    ) -> Result<(), BlockError> {
        let block = self.require_block(block_id).await?;
        let page = self.require_page(block.page_id).await?;
        self.check_access(&page, actor, true).await?;

        let after = self.sibling_position(request.after_id).await?;
        let before = self.sibling_position(request.before_id).await?;
        let position = position_between(after, before);

        self.block_repo
            .update_position(block_id, position)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))
    }

    async fn delete_block(&self, block_id: Uuid, actor: Actor) -> Result<(), BlockError> {
        let block = self.require_block(block_id).await?;
        let page = self.require_page(block.page_id).await?;
        self.check_access(&page, actor, true).await?;

        self.block_repo
            .soft_delete(block_id)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))
    }

    async fn page_blocks(&self, page_id: Uuid, actor: Actor) -> Result<Vec<Block>, BlockError> {
        let page = self.require_page(page_id).await?;
        self.check_access(&page, actor, false).await?;

        self.block_repo
            .find_by_page(page_id)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))
    }

    async fn children(&self, block_id: Uuid, actor: Actor) -> Result<Vec<Block>, BlockError> {
        let block = self.require_block(block_id).await?;
        let page = self.require_page(block.page_id).await?;
        self.check_access(&page, actor, false).await?;

        self.block_repo
            .find_children(block_id)
            .await
            .map_err(|e| BlockError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        MockBlockRepository, MockMemberRepository, MockPageRepository,
    };

    fn actor(id: Uuid) -> Actor {
        Actor {
            id,
            is_super_admin: false,
        }
    }

    fn sample_page(workspace_id: Uuid) -> Page {
        let now = Utc::now();
        Page {
            id: Uuid::now_v7(),
            workspace_id,
            parent_id: None,
            title: "Doc".into(),
            icon: None,
            created_by: Uuid::now_v7(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_block(page_id: Uuid, position: f64) -> Block {
        let now = Utc::now();
        Block {
            id: Uuid::now_v7(),
            page_id,
            parent_id: None,
            block_type: "paragraph".into(),
            content: serde_json::json!({"text": "hello"}),
            position,
            created_by: Uuid::now_v7(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_appends_after_the_last_sibling() {
        let page = sample_page(Uuid::now_v7());
        let page_id = page.id;

        let mut page_repo = MockPageRepository::new();
        page_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(page.clone())));

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .returning(|_, _| Ok(Some(MemberRole::Editor)));

        let mut block_repo = MockBlockRepository::new();
        block_repo.expect_find_by_page().returning(move |_| {
            Ok(vec![
                sample_block(page_id, 1024.0),
                sample_block(page_id, 2048.0),
            ])
        });
        block_repo
            .expect_create()
            .withf(|b| b.position > 2048.0)
            .returning(|b| Ok(b.clone()));

        let svc = BlockServiceImpl::new(
            Arc::new(block_repo),
            Arc::new(page_repo),
            Arc::new(member_repo),
        );

        let block = svc
            .create_block(
                actor(Uuid::now_v7()),
                CreateBlockDto {
                    page_id,
                    parent_id: None,
                    block_type: "paragraph".into(),
                    content: serde_json::json!({}),
                },
            )
            .await
            .unwrap();

        assert!(block.position > 2048.0);
    }

    #[tokio::test]
    async fn move_lands_between_the_named_neighbours() {
        let page = sample_page(Uuid::now_v7());
        let page_id = page.id;

        let moving = sample_block(page_id, 4096.0);
        let left = sample_block(page_id, 1024.0);
        let right = sample_block(page_id, 2048.0);
        let (moving_id, left_id, right_id) = (moving.id, left.id, right.id);

        let mut block_repo = MockBlockRepository::new();
        block_repo.expect_find_by_id().returning(move |id| {
            if id == moving_id {
                Ok(Some(moving.clone()))
            } else if id == left_id {
                Ok(Some(left.clone()))
            } else if id == right_id {
                Ok(Some(right.clone()))
            } else {
                Ok(None)
            }
        });
        block_repo
            .expect_update_position()
            .withf(|_, position| *position > 1024.0 && *position < 2048.0)
            .returning(|_, _| Ok(()));

        let mut page_repo = MockPageRepository::new();
        page_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(page.clone())));

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .returning(|_, _| Ok(Some(MemberRole::Editor)));

        let svc = BlockServiceImpl::new(
            Arc::new(block_repo),
            Arc::new(page_repo),
            Arc::new(member_repo),
        );

        svc.move_block(
            moving_id,
            actor(Uuid::now_v7()),
            MoveBlockDto {
                after_id: Some(left_id),
                before_id: Some(right_id),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn viewer_cannot_create_blocks() {
        let page = sample_page(Uuid::now_v7());
        let page_id = page.id;

        let mut page_repo = MockPageRepository::new();
        page_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(page.clone())));

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .returning(|_, _| Ok(Some(MemberRole::Viewer)));

        let mut block_repo = MockBlockRepository::new();
        block_repo.expect_create().never();

        let svc = BlockServiceImpl::new(
            Arc::new(block_repo),
            Arc::new(page_repo),
            Arc::new(member_repo),
        );

        let result = svc
            .create_block(
                actor(Uuid::now_v7()),
                CreateBlockDto {
                    page_id,
                    parent_id: None,
                    block_type: "paragraph".into(),
                    content: serde_json::json!({}),
                },
            )
            .await;

        assert!(matches!(result, Err(BlockError::Forbidden)));
    }
}
