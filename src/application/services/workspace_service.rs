//! Workspace Service
//!
//! Workspace lifecycle and membership management. Creation is atomic with
//! the owner's admin membership; member add is an idempotent upsert; member
//! update/remove distinguish a missing member from a missing workspace.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{
    MemberRepository, MemberRole, UserRepository, Workspace, WorkspaceMember, WorkspaceRepository,
};
use crate::shared::error::AppError;

/// Workspace service trait
#[async_trait]
pub trait WorkspaceService: Send + Sync {
    /// Create a workspace; the creator becomes its admin member atomically.
    async fn create_workspace(
        &self,
        actor: Actor,
        request: CreateWorkspaceDto,
    ) -> Result<WorkspaceDto, WorkspaceError>;

    /// Get a workspace by ID (members only).
    async fn get_workspace(&self, workspace_id: Uuid, actor: Actor)
        -> Result<WorkspaceDto, WorkspaceError>;

    /// List workspaces the actor is a member of.
    async fn list_workspaces(
        &self,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<WorkspaceDto>, i64), WorkspaceError>;

    /// Update workspace settings (admins only).
    async fn update_workspace(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        update: UpdateWorkspaceDto,
    ) -> Result<WorkspaceDto, WorkspaceError>;

    /// Soft-delete a workspace (admins only).
    async fn delete_workspace(&self, workspace_id: Uuid, actor: Actor)
        -> Result<(), WorkspaceError>;

    /// Hard-delete a workspace and its members (owner or super admin).
    /// Reaches tombstoned workspaces too.
    async fn purge_workspace(&self, workspace_id: Uuid, actor: Actor)
        -> Result<(), WorkspaceError>;

    /// Add a member, or change their role if already present (same role is
    /// a no-op).
    async fn add_member(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<MemberDto, WorkspaceError>;

    /// Change an existing member's role.
    async fn update_member_role(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<MemberDto, WorkspaceError>;

    /// Remove a member.
    async fn remove_member(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        user_id: Uuid,
    ) -> Result<(), WorkspaceError>;

    /// List members (members only).
    async fn list_members(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MemberDto>, i64), WorkspaceError>;

    /// The user's membership in a workspace. Absence is not an error.
    async fn membership(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<MembershipDto, WorkspaceError>;
}

/// Create workspace request
#[derive(Debug, Clone)]
pub struct CreateWorkspaceDto {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Update workspace request
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkspaceDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Workspace data transfer object
#[derive(Debug, Clone)]
pub struct WorkspaceDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub owner_id: String,
    pub member_count: i64,
    pub created_at: String,
}

impl WorkspaceDto {
    pub fn from_workspace(workspace: Workspace, member_count: i64) -> Self {
        Self {
            id: workspace.id.to_string(),
            name: workspace.name,
            description: workspace.description,
            icon: workspace.icon,
            owner_id: workspace.owner_id.to_string(),
            member_count,
            created_at: workspace.created_at.to_rfc3339(),
        }
    }
}

/// Member data transfer object
#[derive(Debug, Clone)]
pub struct MemberDto {
    pub workspace_id: String,
    pub user_id: String,
    pub role: String,
    pub joined_at: String,
}

impl From<WorkspaceMember> for MemberDto {
    fn from(member: WorkspaceMember) -> Self {
        Self {
            workspace_id: member.workspace_id.to_string(),
            user_id: member.user_id.to_string(),
            role: member.role.as_str().to_string(),
            joined_at: member.joined_at.to_rfc3339(),
        }
    }
}

/// Membership check result; `role` is empty when not a member.
#[derive(Debug, Clone)]
pub struct MembershipDto {
    pub is_member: bool,
    pub role: String,
}

/// Workspace service errors
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Workspace not found")]
    NotFound,

    #[error("Member not found")]
    MemberNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Workspace with this name already exists")]
    DuplicateName,

    #[error("Permission denied")]
    Forbidden,

    #[error("The workspace owner cannot be removed")]
    CannotRemoveOwner,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// WorkspaceService implementation
pub struct WorkspaceServiceImpl<W, M, U>
where
    W: WorkspaceRepository,
    M: MemberRepository,
    U: UserRepository,
{
    workspace_repo: Arc<W>,
    member_repo: Arc<M>,
    user_repo: Arc<U>,
}

impl<W, M, U> WorkspaceServiceImpl<W, M, U>
where
    W: WorkspaceRepository,
    M: MemberRepository,
    U: UserRepository,
{
    pub fn new(workspace_repo: Arc<W>, member_repo: Arc<M>, user_repo: Arc<U>) -> Self {
        Self {
            workspace_repo,
            member_repo,
            user_repo,
        }
    }

    async fn require_workspace(&self, workspace_id: Uuid) -> Result<Workspace, WorkspaceError> {
        self.workspace_repo
            .find_by_id(workspace_id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?
            .ok_or(WorkspaceError::NotFound)
    }

    /// Role of the actor in the workspace; super admins get `admin`.
    async fn actor_role(
        &self,
        workspace_id: Uuid,
        actor: Actor,
    ) -> Result<Option<MemberRole>, WorkspaceError> {
        if actor.is_super_admin {
            return Ok(Some(MemberRole::Admin));
        }

        self.member_repo
            .role_of(workspace_id, actor.id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))
    }

    async fn require_member(&self, workspace_id: Uuid, actor: Actor)
        -> Result<MemberRole, WorkspaceError> {
        self.actor_role(workspace_id, actor)
            .await?
            .ok_or(WorkspaceError::Forbidden)
    }

    async fn require_manager(&self, workspace_id: Uuid, actor: Actor)
        -> Result<(), WorkspaceError> {
        let role = self.require_member(workspace_id, actor).await?;
        if !role.can_manage() {
            return Err(WorkspaceError::Forbidden);
        }
        Ok(())
    }

    async fn member_count(&self, workspace_id: Uuid) -> Result<i64, WorkspaceError> {
        self.member_repo
            .count_by_workspace(workspace_id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))
    }
}

#[async_trait]
impl<W, M, U> WorkspaceService for WorkspaceServiceImpl<W, M, U>
where
    W: WorkspaceRepository + 'static,
    M: MemberRepository + 'static,
    U: UserRepository + 'static,
{
    async fn create_workspace(
        &self,
        actor: Actor,
        request: CreateWorkspaceDto,
    ) -> Result<WorkspaceDto, WorkspaceError> {
        let duplicate = self
            .workspace_repo
            .name_exists(actor.id, &request.name)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?;

        if duplicate {
            return Err(WorkspaceError::DuplicateName);
        }

        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::now_v7(),
            name: request.name,
            description: request.description,
            icon: request.icon,
            owner_id: actor.id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        // Workspace row and admin membership row commit together; a losing
        // racer on the name index surfaces as the same duplicate error.
        let created = self
            .workspace_repo
            .create_with_admin(&workspace)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => WorkspaceError::DuplicateName,
                e => WorkspaceError::Internal(e.to_string()),
            })?;

        Ok(WorkspaceDto::from_workspace(created, 1))
    }

    async fn get_workspace(
        &self,
        workspace_id: Uuid,
        actor: Actor,
    ) -> Result<WorkspaceDto, WorkspaceError> {
        let workspace = self.require_workspace(workspace_id).await?;
        self.require_member(workspace_id, actor).await?;

        let member_count = self.member_count(workspace_id).await?;
        Ok(WorkspaceDto::from_workspace(workspace, member_count))
    }

    async fn list_workspaces(
        &self,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<WorkspaceDto>, i64), WorkspaceError> {
        let workspaces = self
            .workspace_repo
            .find_for_user(actor.id, limit, offset)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?;

        let total = self
            .workspace_repo
            .count_for_user(actor.id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?;

        let mut dtos = Vec::with_capacity(workspaces.len());
        for workspace in workspaces {
            let member_count = self.member_count(workspace.id).await?;
            dtos.push(WorkspaceDto::from_workspace(workspace, member_count));
        }

        Ok((dtos, total))
    }

    async fn update_workspace(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        update: UpdateWorkspaceDto,
    ) -> Result<WorkspaceDto, WorkspaceError> {
        let mut workspace = self.require_workspace(workspace_id).await?;
        self.require_manager(workspace_id, actor).await?;

        if let Some(name) = update.name {
            workspace.name = name;
        }
        if let Some(description) = update.description {
            workspace.description = Some(description);
        }
        if let Some(icon) = update.icon {
            workspace.icon = Some(icon);
        }
        workspace.updated_at = Utc::now();

        let updated = self
            .workspace_repo
            .update(&workspace)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => WorkspaceError::DuplicateName,
                e => WorkspaceError::Internal(e.to_string()),
            })?;

        let member_count = self.member_count(workspace_id).await?;
        Ok(WorkspaceDto::from_workspace(updated, member_count))
    }

    async fn delete_workspace(
        &self,
        workspace_id: Uuid,
        actor: Actor,
    ) -> Result<(), WorkspaceError> {
        self.require_workspace(workspace_id).await?;
        self.require_manager(workspace_id, actor).await?;

        self.workspace_repo
            .soft_delete(workspace_id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))
    }

    async fn purge_workspace(
        &self,
        workspace_id: Uuid,
        actor: Actor,
    ) -> Result<(), WorkspaceError> {
        // Purge bypasses the tombstone filter.
        let workspace = self
            .workspace_repo
            .find_by_id_any(workspace_id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?
            .ok_or(WorkspaceError::NotFound)?;

        if !actor.is_super_admin && !workspace.is_owner(actor.id) {
            return Err(WorkspaceError::Forbidden);
        }

        self.workspace_repo
            .purge(workspace_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => WorkspaceError::NotFound,
                e => WorkspaceError::Internal(e.to_string()),
            })
    }

    async fn add_member(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<MemberDto, WorkspaceError> {
        self.require_workspace(workspace_id).await?;
        self.require_manager(workspace_id, actor).await?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?;

        if user.is_none() {
            return Err(WorkspaceError::UserNotFound);
        }

        // Upsert semantics: existing pair with a different role becomes a
        // role update, same role is a no-op.
        let member = self
            .member_repo
            .upsert(&WorkspaceMember::new(workspace_id, user_id, role))
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?;

        Ok(MemberDto::from(member))
    }

    async fn update_member_role(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<MemberDto, WorkspaceError> {
        self.require_workspace(workspace_id).await?;
        self.require_manager(workspace_id, actor).await?;

        let existing = self
            .member_repo
            .find(workspace_id, user_id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?
            .ok_or(WorkspaceError::MemberNotFound)?;

        self.member_repo
            .update_role(workspace_id, user_id, role)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => WorkspaceError::MemberNotFound,
                e => WorkspaceError::Internal(e.to_string()),
            })?;

        Ok(MemberDto::from(WorkspaceMember { role, ..existing }))
    }

    async fn remove_member(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        user_id: Uuid,
    ) -> Result<(), WorkspaceError> {
        let workspace = self.require_workspace(workspace_id).await?;
        self.require_manager(workspace_id, actor).await?;

        if workspace.is_owner(user_id) {
            return Err(WorkspaceError::CannotRemoveOwner);
        }

        let exists = self
            .member_repo
            .find(workspace_id, user_id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?;

        if exists.is_none() {
            return Err(WorkspaceError::MemberNotFound);
        }

        self.member_repo
            .delete(workspace_id, user_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => WorkspaceError::MemberNotFound,
                e => WorkspaceError::Internal(e.to_string()),
            })
    }

    async fn list_members(
        &self,
        workspace_id: Uuid,
        actor: Actor,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MemberDto>, i64), WorkspaceError> {
        self.require_workspace(workspace_id).await?;
        self.require_member(workspace_id, actor).await?;

        let members = self
            .member_repo
            .find_by_workspace(workspace_id, limit, offset)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?;

        let total = self.member_count(workspace_id).await?;

        Ok((members.into_iter().map(MemberDto::from).collect(), total))
    }

    async fn membership(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<MembershipDto, WorkspaceError> {
        let role = self
            .member_repo
            .role_of(workspace_id, user_id)
            .await
            .map_err(|e| WorkspaceError::Internal(e.to_string()))?;

        Ok(match role {
            Some(role) => MembershipDto {
                is_member: true,
                role: role.as_str().to_string(),
            },
            None => MembershipDto {
                is_member: false,
                role: String::new(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        MockMemberRepository, MockUserRepository, MockWorkspaceRepository,
    };
    use mockall::predicate::eq;

    fn actor(id: Uuid) -> Actor {
        Actor {
            id,
            is_super_admin: false,
        }
    }

    fn sample_user(id: Uuid) -> crate::domain::User {
        let now = Utc::now();
        crate::domain::User {
            id,
            username: "member".into(),
            email: "member@example.com".into(),
            password_hash: String::new(),
            display_name: None,
            avatar_url: None,
            bio: None,
            is_super_admin: false,
            followers_count: 0,
            following_count: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_workspace(owner_id: Uuid) -> Workspace {
        let now = Utc::now();
        Workspace {
            id: Uuid::now_v7(),
            name: "Eng".into(),
            description: None,
            icon: None,
            owner_id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_workspace_rejects_duplicate_name() {
        let owner = Uuid::now_v7();

        let mut workspace_repo = MockWorkspaceRepository::new();
        workspace_repo
            .expect_name_exists()
            .with(eq(owner), eq("Eng"))
            .returning(|_, _| Ok(true));
        workspace_repo.expect_create_with_admin().never();

        let svc = WorkspaceServiceImpl::new(
            Arc::new(workspace_repo),
            Arc::new(MockMemberRepository::new()),
            Arc::new(MockUserRepository::new()),
        );

        let result = svc
            .create_workspace(
                actor(owner),
                CreateWorkspaceDto {
                    name: "Eng".into(),
                    description: None,
                    icon: None,
                },
            )
            .await;

        assert!(matches!(result, Err(WorkspaceError::DuplicateName)));
    }

    #[tokio::test]
    async fn create_workspace_inserts_owner_as_admin_atomically() {
        let owner = Uuid::now_v7();

        let mut workspace_repo = MockWorkspaceRepository::new();
        workspace_repo.expect_name_exists().returning(|_, _| Ok(false));
        workspace_repo
            .expect_create_with_admin()
            .withf(move |ws| ws.owner_id == owner && ws.name == "Eng")
            .returning(|ws| Ok(ws.clone()));

        let svc = WorkspaceServiceImpl::new(
            Arc::new(workspace_repo),
            Arc::new(MockMemberRepository::new()),
            Arc::new(MockUserRepository::new()),
        );

        let dto = svc
            .create_workspace(
                actor(owner),
                CreateWorkspaceDto {
                    name: "Eng".into(),
                    description: None,
                    icon: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.owner_id, owner.to_string());
        assert_eq!(dto.member_count, 1);
    }

    #[tokio::test]
    async fn add_member_fails_when_workspace_is_absent() {
        let mut workspace_repo = MockWorkspaceRepository::new();
        workspace_repo.expect_find_by_id().returning(|_| Ok(None));

        let svc = WorkspaceServiceImpl::new(
            Arc::new(workspace_repo),
            Arc::new(MockMemberRepository::new()),
            Arc::new(MockUserRepository::new()),
        );

        let result = svc
            .add_member(
                Uuid::now_v7(),
                actor(Uuid::now_v7()),
                Uuid::now_v7(),
                MemberRole::Viewer,
            )
            .await;

        assert!(matches!(result, Err(WorkspaceError::NotFound)));
    }

    #[tokio::test]
    async fn add_member_upserts_role_for_existing_pair() {
        let owner = Uuid::now_v7();
        let target = Uuid::now_v7();
        let workspace = sample_workspace(owner);
        let workspace_id = workspace.id;

        let mut workspace_repo = MockWorkspaceRepository::new();
        workspace_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(workspace.clone())));

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .with(eq(workspace_id), eq(owner))
            .returning(|_, _| Ok(Some(MemberRole::Admin)));
        member_repo
            .expect_upsert()
            .withf(move |m| {
                m.workspace_id == workspace_id && m.user_id == target && m.role == MemberRole::Editor
            })
            .returning(|m| Ok(m.clone()));

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id))));

        let svc = WorkspaceServiceImpl::new(
            Arc::new(workspace_repo),
            Arc::new(member_repo),
            Arc::new(user_repo),
        );

        let dto = svc
            .add_member(workspace_id, actor(owner), target, MemberRole::Editor)
            .await
            .unwrap();

        assert_eq!(dto.role, "editor");
    }

    #[tokio::test]
    async fn remove_member_distinguishes_missing_member_from_missing_workspace() {
        let owner = Uuid::now_v7();
        let never_added = Uuid::now_v7();
        let workspace = sample_workspace(owner);
        let workspace_id = workspace.id;

        let mut workspace_repo = MockWorkspaceRepository::new();
        workspace_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(workspace.clone())));

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .returning(|_, _| Ok(Some(MemberRole::Admin)));
        member_repo.expect_find().returning(|_, _| Ok(None));
        member_repo.expect_delete().never();

        let svc = WorkspaceServiceImpl::new(
            Arc::new(workspace_repo),
            Arc::new(member_repo),
            Arc::new(MockUserRepository::new()),
        );

        let result = svc.remove_member(workspace_id, actor(owner), never_added).await;
        assert!(matches!(result, Err(WorkspaceError::MemberNotFound)));
    }

    #[tokio::test]
    async fn owner_cannot_be_removed() {
        let owner = Uuid::now_v7();
        let workspace = sample_workspace(owner);
        let workspace_id = workspace.id;

        let mut workspace_repo = MockWorkspaceRepository::new();
        workspace_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(workspace.clone())));

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .returning(|_, _| Ok(Some(MemberRole::Admin)));

        let svc = WorkspaceServiceImpl::new(
            Arc::new(workspace_repo),
            Arc::new(member_repo),
            Arc::new(MockUserRepository::new()),
        );

        let result = svc.remove_member(workspace_id, actor(owner), owner).await;
        assert!(matches!(result, Err(WorkspaceError::CannotRemoveOwner)));
    }

    #[tokio::test]
    async fn membership_absence_is_not_an_error() {
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_role_of().returning(|_, _| Ok(None));

        let svc = WorkspaceServiceImpl::new(
            Arc::new(MockWorkspaceRepository::new()),
            Arc::new(member_repo),
            Arc::new(MockUserRepository::new()),
        );

        let dto = svc.membership(Uuid::now_v7(), Uuid::now_v7()).await.unwrap();
        assert!(!dto.is_member);
        assert_eq!(dto.role, "");
    }

    #[tokio::test]
    async fn viewer_cannot_update_workspace() {
        let owner = Uuid::now_v7();
        let viewer = Uuid::now_v7();
        let workspace = sample_workspace(owner);
        let workspace_id = workspace.id;

        let mut workspace_repo = MockWorkspaceRepository::new();
        workspace_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(workspace.clone())));
        workspace_repo.expect_update().never();

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_role_of()
            .with(eq(workspace_id), eq(viewer))
            .returning(|_, _| Ok(Some(MemberRole::Viewer)));

        let svc = WorkspaceServiceImpl::new(
            Arc::new(workspace_repo),
            Arc::new(member_repo),
            Arc::new(MockUserRepository::new()),
        );

        let result = svc
            .update_workspace(workspace_id, actor(viewer), UpdateWorkspaceDto::default())
            .await;

        assert!(matches!(result, Err(WorkspaceError::Forbidden)));
    }
}
