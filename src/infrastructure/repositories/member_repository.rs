//! Member Repository Implementation
//!
//! PostgreSQL implementation of the MemberRepository trait.
//! Handles workspace membership and role assignments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{MemberRepository, MemberRole, WorkspaceMember};
use crate::shared::error::AppError;

/// Database row representation matching the `workspace_members` table schema.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    workspace_id: Uuid,
    user_id: Uuid,
    role: String,
    joined_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self) -> WorkspaceMember {
        WorkspaceMember {
            workspace_id: self.workspace_id,
            user_id: self.user_id,
            // The CHECK constraint keeps the column inside the enum.
            role: MemberRole::parse(&self.role).unwrap_or(MemberRole::Viewer),
            joined_at: self.joined_at,
        }
    }
}

/// PostgreSQL member repository implementation.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    /// Find a member by workspace and user ID.
    async fn find(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, AppError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT workspace_id, user_id, role, joined_at
            FROM workspace_members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MemberRow::into_member))
    }

    async fn role_of(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MemberRole>, AppError> {
        let role = sqlx::query_scalar::<_, String>(
            "SELECT role FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role.and_then(|r| MemberRole::parse(&r)))
    }

    async fn find_by_workspace(
        &self,
        workspace_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkspaceMember>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT workspace_id, user_id, role, joined_at
            FROM workspace_members
            WHERE workspace_id = $1
            ORDER BY joined_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(workspace_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MemberRow::into_member).collect())
    }

    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM workspace_members WHERE workspace_id = $1",
        )
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Insert a membership, or update the role when the pair already exists.
    async fn upsert(&self, member: &WorkspaceMember) -> Result<WorkspaceMember, AppError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (workspace_id, user_id)
            DO UPDATE SET role = EXCLUDED.role
            RETURNING workspace_id, user_id, role, joined_at
            "#,
        )
        .bind(member.workspace_id)
        .bind(member.user_id)
        .bind(member.role.as_str())
        .bind(member.joined_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_member())
    }

    async fn update_role(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE workspace_members
            SET role = $3
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Member not found in workspace {} for user {}",
                workspace_id, user_id
            )));
        }

        Ok(())
    }

    async fn delete(&self, workspace_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
        )
        .bind(workspace_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Member not found in workspace {} for user {}",
                workspace_id, user_id
            )));
        }

        Ok(())
    }
}
