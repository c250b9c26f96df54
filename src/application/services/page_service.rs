//! Page Service
//!
//! Page tree operations inside a workspace. Access is gated by workspace
//! membership: any role reads, editors and admins write. Updates preserve
//! creation provenance no matter what the payload carries.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{MemberRepository, MemberRole, Page, PageRepository, WorkspaceRepository};

/// Page service trait
#[async_trait]
pub trait PageService: Send + Sync {
    /// Create a page in a workspace.
    async fn create_page(&self, actor: Actor, request: CreatePageDto)
        -> Result<Page, PageError>;

    /// Get a page by ID (members only).
    async fn get_page(&self, page_id: Uuid, actor: Actor) -> Result<Page, PageError>;

    /// Update a page. `created_by`/`created_at` always survive unchanged.
    async fn update_page(
        &self,
        page_id: Uuid,
        actor: Actor,
        update: UpdatePageDto,
    ) -> Result<Page, PageError>;

    /// Soft-delete a page.
    async fn delete_page(&self, page_id: Uuid, actor: Actor) -> Result<(), PageError>;

    /// List live pages of a workspace.
    async fn list_pages(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Page>, i64), PageError>;

    /// Direct children of a page (flat, non-recursive).
    async fn children(&self, page_id: Uuid, actor: Actor) -> Result<Vec<Page>, PageError>;
}

/// Create page request
#[derive(Debug, Clone)]
pub struct CreatePageDto {
    pub workspace_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub icon: Option<String>,
}

/// Update page request. `parent_id` is doubly optional: absent leaves the
/// parent alone, `Some(None)` detaches the page to the workspace root.
#[derive(Debug, Clone, Default)]
pub struct UpdatePageDto {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Option<Uuid>>,
}

/// Page service errors
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Page not found")]
    NotFound,

    #[error("Workspace not found")]
    WorkspaceNotFound,

    #[error("Page title must not be empty")]
    EmptyTitle,

    #[error("Permission denied")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// PageService implementation
pub struct PageServiceImpl<P, W, M>
where
    P: PageRepository,
    W: WorkspaceRepository,
    M: MemberRepository,
{
    page_repo: Arc<P>,
    workspace_repo: Arc<W>,
    member_repo: Arc<M>,
}

impl<P, W, M> PageServiceImpl<P, W, M>
where
    P: PageRepository,
    W: WorkspaceRepository,
    M: MemberRepository,
{
    pub fn new(page_repo: Arc<P>, workspace_repo: Arc<W>, member_repo: Arc<M>) -> Self {
        Self {
            page_repo,
            workspace_repo,
            member_repo,
        }
    }

    async fn workspace_role(
        &self,
        workspace_id: Uuid,
        actor: Actor,
    ) -> Result<MemberRole, PageError> {
        if actor.is_super_admin {
            return Ok(MemberRole::Admin);
        }

        self.member_repo
            .role_of(workspace_id, actor.id)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))?
            .ok_or(PageError::Forbidden)
    }

    async fn require_editor(&self, workspace_id: Uuid, actor: Actor) -> Result<(), PageError> {
        let role = self.workspace_role(workspace_id, actor).await?;
        if !role.can_edit() {
            return Err(PageError::Forbidden);
        }
        Ok(())
    }

    async fn require_page(&self, page_id: Uuid) -> Result<Page, PageError> {
        self.page_repo
            .find_by_id(page_id)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))?
            .ok_or(PageError::NotFound)
    }
}

#[async_trait]
impl<P, W, M> PageService for PageServiceImpl<P, W, M>
where
    P: PageRepository + 'static,
    W: WorkspaceRepository + 'static,
    M: MemberRepository + 'static,
{
    async fn create_page(
        &self,
        actor: Actor,
        request: CreatePageDto,
    ) -> Result<Page, PageError> {
        if request.title.trim().is_empty() {
            return Err(PageError::EmptyTitle);
        }

        let workspace = self
            .workspace_repo
            .find_by_id(request.workspace_id)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))?;

        if workspace.is_none() {
            return Err(PageError::WorkspaceNotFound);
        }

        self.require_editor(request.workspace_id, actor).await?;

        let now = Utc::now();
        let page = Page {
            id: Uuid::now_v7(),
            workspace_id: request.workspace_id,
            parent_id: request.parent_id,
            title: request.title,
            icon: request.icon,
            created_by: actor.id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        self.page_repo
            .create(&page)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))
    }

    async fn get_page(&self, page_id: Uuid, actor: Actor) -> Result<Page, PageError> {
        let page = self.require_page(page_id).await?;
        self.workspace_role(page.workspace_id, actor).await?;
        Ok(page)
    }

    async fn update_page(
        &self,
        page_id: Uuid,
        actor: Actor,
        update: UpdatePageDto,
    ) -> Result<Page, PageError> {
        let existing = self.require_page(page_id).await?;
        self.require_editor(existing.workspace_id, actor).await?;

        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(PageError::EmptyTitle);
            }
        }

        // Provenance is copied from the existing row: whatever the caller
        // sent, the page keeps its original creator and creation time.
        let page = Page {
            id: existing.id,
            workspace_id: existing.workspace_id,
            parent_id: match update.parent_id {
                Some(parent) => parent,
                None => existing.parent_id,
            },
            title: update.title.unwrap_or(existing.title),
            icon: update.icon.or(existing.icon),
            created_by: existing.created_by,
            is_deleted: existing.is_deleted,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        self.page_repo
            .update(&page)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))
    }

    async fn delete_page(&self, page_id: Uuid, actor: Actor) -> Result<(), PageError> {
        let page = self.require_page(page_id).await?;
        self.require_editor(page.workspace_id, actor).await?;

        self.page_repo
            .soft_delete(page_id)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))
    }

    async fn list_pages(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Page>, i64), PageError> {
        let workspace = self
            .workspace_repo
            .find_by_id(workspace_id)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))?;

        if workspace.is_none() {
            return Err(PageError::WorkspaceNotFound);
        }

        self.workspace_role(workspace_id, actor).await?;

        let pages = self
            .page_repo
            .find_by_workspace(workspace_id, limit, offset)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))?;

        let total = self
            .page_repo
            .count_by_workspace(workspace_id)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))?;

        Ok((pages, total))
    }

    async fn children(&self, page_id: Uuid, actor: Actor) -> Result<Vec<Page>, PageError> {
        let page = self.require_page(page_id).await?;
        self.workspace_role(page.workspace_id, actor).await?;

        self.page_repo
            .find_children(page_id)
            .await
            .map_err(|e| PageError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        MockMemberRepository, MockPageRepository, MockWorkspaceRepository,
    };
    use crate::domain::Workspace;
    use chrono::Duration;

    fn actor(id: Uuid) -> Actor {
        Actor {
            id,
            is_super_admin: false,
        }
    }

    fn sample_workspace(id: Uuid) -> Workspace {
        let now = Utc::now();
        Workspace {
            id,
            name: "Docs".into(),
            description: None,
            icon: None,
            owner_id: Uuid::now_v7(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_page(workspace_id: Uuid, created_by: Uuid) -> Page {
        let created_at = Utc::now() - Duration::days(3);
        Page {
            id: Uuid::now_v7(),
            workspace_id,
            parent_id: None,
            title: "Roadmap".into(),
            icon: None,
            created_by,
            is_deleted: false,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn create_page_rejects_empty_title() {
        let mut page_repo = MockPageRepository::new();
        page_repo.expect_create().never();

        let svc = PageServiceImpl::new(
            Arc::new(page_repo),
            Arc::new(MockWorkspaceRepository::new()),
            Arc::new(MockMemberRepository::new()),
        );

        let result = svc
            .create_page(
                actor(Uuid::now_v7()),
                CreatePageDto {
                    workspace_id: Uuid::now_v7(),
                    parent_id: None,
                    title: "   ".into(),
                    icon: None,
                },
            )
            .await;

        assert!(matches!(result, Err(PageError::EmptyTitle)));
    }

    #[tokio::test]
    async fn create_page_requires_live_workspace() {
        let mut workspace_repo = MockWorkspaceRepository::new();
        workspace_repo.expect_find_by_id().returning(|_| Ok(None));

        let svc = PageServiceImpl::new(
            Arc::new(MockPageRepository::new()),
            Arc::new(workspace_repo),
            Arc::new(MockMemberRepository::new()),
        );

        let result = svc
            .create_page(
                actor(Uuid::now_v7()),
                CreatePageDto {
                    workspace_id: Uuid::now_v7(),
                    parent_id: None,
                    title: "Notes".into(),
                    icon: None,
                },
            )
            .await;

        assert!(matches!(result, Err(PageError::WorkspaceNotFound)));
    }

    #[tokio::test]
    async fn update_preserves_creator_and_creation_time() {
        let workspace_id = Uuid::now_v7();
        let creator = Uuid::now_v7();
        let editor = Uuid::now_v7();
        let existing = sample_page(workspace_id, creator);
        let page_id = existing.id;
        let original_created_at = existing.created_at;

        let mut page_repo = MockPageRepository::new();
        {
            let existing = existing.clone();
            page_repo
                .expect_find_by_id()
                .returning(move |_| Ok(Some(existing.clone())));
        }
        page_repo
            .expect_update()
            .withf(move |page| {
                page.created_by == creator
                    && page.created_at == original_created_at
                    && page.title == "Renamed"
            })
            .returning(|page| Ok(page.clone()));

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .returning(|_, _| Ok(Some(MemberRole::Editor)));

        let svc = PageServiceImpl::new(
            Arc::new(page_repo),
            Arc::new(MockWorkspaceRepository::new()),
            Arc::new(member_repo),
        );

        let updated = svc
            .update_page(
                page_id,
                actor(editor),
                UpdatePageDto {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.created_by, creator);
        assert_eq!(updated.created_at, original_created_at);
    }

    #[tokio::test]
    async fn viewer_cannot_modify_pages() {
        let workspace_id = Uuid::now_v7();
        let page = sample_page(workspace_id, Uuid::now_v7());
        let page_id = page.id;

        let mut page_repo = MockPageRepository::new();
        page_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(page.clone())));
        page_repo.expect_update().never();

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .returning(|_, _| Ok(Some(MemberRole::Viewer)));

        let svc = PageServiceImpl::new(
            Arc::new(page_repo),
            Arc::new(MockWorkspaceRepository::new()),
            Arc::new(member_repo),
        );

        let result = svc
            .update_page(page_id, actor(Uuid::now_v7()), UpdatePageDto::default())
            .await;

        assert!(matches!(result, Err(PageError::Forbidden)));
    }

    #[tokio::test]
    async fn non_member_cannot_read_pages() {
        let workspace_id = Uuid::now_v7();
        let page = sample_page(workspace_id, Uuid::now_v7());
        let page_id = page.id;

        let mut page_repo = MockPageRepository::new();
        page_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(page.clone())));

        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_role_of().returning(|_, _| Ok(None));

        let svc = PageServiceImpl::new(
            Arc::new(page_repo),
            Arc::new(MockWorkspaceRepository::new()),
            Arc::new(member_repo),
        );

        let result = svc.get_page(page_id, actor(Uuid::now_v7())).await;
        assert!(matches!(result, Err(PageError::Forbidden)));
    }
}
