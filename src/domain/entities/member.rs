//! Workspace Member entity and repository trait.
//!
//! Maps to the `workspace_members` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Membership role scoped to one workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Editor,
    Viewer,
}

impl MemberRole {
    /// Parse from the database/API string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Convert to the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Whether this role may modify pages and blocks.
    pub fn can_edit(&self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }

    /// Whether this role may manage members and workspace settings.
    pub fn can_manage(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user's membership in a workspace.
///
/// Maps to the `workspace_members` table:
/// - workspace_id: UUID NOT NULL REFERENCES workspaces(id) (composite PK)
/// - user_id: UUID NOT NULL REFERENCES users(id) (composite PK)
/// - role: VARCHAR(10) NOT NULL CHECK (role IN ('admin', 'editor', 'viewer'))
/// - joined_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMember {
    /// Workspace ID (part of composite primary key)
    pub workspace_id: Uuid,

    /// User ID (part of composite primary key)
    pub user_id: Uuid,

    /// Role within the workspace
    pub role: MemberRole,

    /// When the user joined the workspace
    pub joined_at: DateTime<Utc>,
}

impl WorkspaceMember {
    pub fn new(workspace_id: Uuid, user_id: Uuid, role: MemberRole) -> Self {
        Self {
            workspace_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }
}

/// Repository trait for WorkspaceMember data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find a member by workspace and user ID.
    async fn find(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, AppError>;

    /// The user's role in a workspace, if any. Absence is not an error.
    async fn role_of(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MemberRole>, AppError>;

    /// List members of a workspace, earliest joiner first.
    async fn find_by_workspace(
        &self,
        workspace_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkspaceMember>, AppError>;

    /// Member count for a workspace.
    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<i64, AppError>;

    /// Insert a membership, or update the role when the pair already exists
    /// (idempotent upsert; same role is a no-op).
    async fn upsert(&self, member: &WorkspaceMember) -> Result<WorkspaceMember, AppError>;

    /// Change an existing member's role. Missing pair is an error.
    async fn update_role(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<(), AppError>;

    /// Remove a member. Missing pair is an error.
    async fn delete(&self, workspace_id: Uuid, user_id: Uuid) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("admin", Some(MemberRole::Admin))]
    #[test_case("Editor", Some(MemberRole::Editor))]
    #[test_case("VIEWER", Some(MemberRole::Viewer))]
    #[test_case("owner", None)]
    #[test_case("", None)]
    fn parse_role(input: &str, expected: Option<MemberRole>) {
        assert_eq!(MemberRole::parse(input), expected);
    }

    #[test]
    fn role_capabilities() {
        assert!(MemberRole::Admin.can_edit());
        assert!(MemberRole::Admin.can_manage());
        assert!(MemberRole::Editor.can_edit());
        assert!(!MemberRole::Editor.can_manage());
        assert!(!MemberRole::Viewer.can_edit());
        assert!(!MemberRole::Viewer.can_manage());
    }
}
