//! Workspace Repository Implementation
//!
//! PostgreSQL implementation of the WorkspaceRepository trait. Workspace
//! creation and teardown are multi-statement transactions: the admin
//! membership row is born with the workspace, and purge removes members
//! before the workspace row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Workspace, WorkspaceRepository};
use crate::shared::error::AppError;

/// Database row representation matching the `workspaces` table schema.
#[derive(Debug, sqlx::FromRow)]
struct WorkspaceRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    icon: Option<String>,
    owner_id: Uuid,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkspaceRow {
    fn into_workspace(self) -> Workspace {
        Workspace {
            id: self.id,
            name: self.name,
            description: self.description,
            icon: self.icon,
            owner_id: self.owner_id,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL workspace repository implementation.
#[derive(Clone)]
pub struct PgWorkspaceRepository {
    pool: PgPool,
}

impl PgWorkspaceRepository {
    /// Create a new PgWorkspaceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkspaceRepository for PgWorkspaceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, AppError> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT id, name, description, icon, owner_id, is_deleted, created_at, updated_at
            FROM workspaces
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(WorkspaceRow::into_workspace))
    }

    async fn find_by_id_any(&self, id: Uuid) -> Result<Option<Workspace>, AppError> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT id, name, description, icon, owner_id, is_deleted, created_at, updated_at
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(WorkspaceRow::into_workspace))
    }

    async fn name_exists(&self, owner_id: Uuid, name: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM workspaces
                WHERE owner_id = $1 AND name = $2 AND is_deleted = FALSE
            )
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_with_admin(&self, workspace: &Workspace) -> Result<Workspace, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            INSERT INTO workspaces (id, name, description, icon, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, icon, owner_id, is_deleted, created_at, updated_at
            "#,
        )
        .bind(workspace.id)
        .bind(&workspace.name)
        .bind(&workspace.description)
        .bind(&workspace.icon)
        .bind(workspace.owner_id)
        .bind(workspace.created_at)
        .bind(workspace.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Workspace with this name already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        // The owner becomes an admin member in the same transaction.
        sqlx::query(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role, joined_at)
            VALUES ($1, $2, 'admin', $3)
            "#,
        )
        .bind(workspace.id)
        .bind(workspace.owner_id)
        .bind(workspace.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_workspace())
    }

    async fn find_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Workspace>, AppError> {
        let rows = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT w.id, w.name, w.description, w.icon, w.owner_id, w.is_deleted,
                   w.created_at, w.updated_at
            FROM workspaces w
            INNER JOIN workspace_members m ON m.workspace_id = w.id
            WHERE m.user_id = $1 AND w.is_deleted = FALSE
            ORDER BY w.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WorkspaceRow::into_workspace).collect())
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM workspaces w
            INNER JOIN workspace_members m ON m.workspace_id = w.id
            WHERE m.user_id = $1 AND w.is_deleted = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update(&self, workspace: &Workspace) -> Result<Workspace, AppError> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            UPDATE workspaces
            SET name = $2, description = $3, icon = $4, updated_at = $5
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, name, description, icon, owner_id, is_deleted, created_at, updated_at
            "#,
        )
        .bind(workspace.id)
        .bind(&workspace.name)
        .bind(&workspace.description)
        .bind(&workspace.icon)
        .bind(workspace.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Workspace with this name already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        row.map(WorkspaceRow::into_workspace)
            .ok_or_else(|| AppError::NotFound(format!("Workspace {} not found", workspace.id)))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE workspaces SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Workspace {} not found", id)));
        }

        Ok(())
    }

    async fn purge(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Members first, then the workspace row. No tombstone filter here:
        // purge must work on soft-deleted workspaces too.
        sqlx::query("DELETE FROM workspace_members WHERE workspace_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Workspace {} not found", id)));
        }

        tx.commit().await?;

        Ok(())
    }
}
