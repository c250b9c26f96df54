//! Page Repository Implementation
//!
//! PostgreSQL implementation of the PageRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Page, PageRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct PageRow {
    id: Uuid,
    workspace_id: Uuid,
    parent_id: Option<Uuid>,
    title: String,
    icon: Option<String>,
    created_by: Uuid,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PageRow {
    fn into_page(self) -> Page {
        Page {
            id: self.id,
            workspace_id: self.workspace_id,
            parent_id: self.parent_id,
            title: self.title,
            icon: self.icon,
            created_by: self.created_by,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const PAGE_COLUMNS: &str =
    "id, workspace_id, parent_id, title, icon, created_by, is_deleted, created_at, updated_at";

/// PostgreSQL page repository implementation.
#[derive(Clone)]
pub struct PgPageRepository {
    pool: PgPool,
}

impl PgPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageRepository for PgPageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, AppError> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PageRow::into_page))
    }

    async fn create(&self, page: &Page) -> Result<Page, AppError> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            INSERT INTO pages (id, workspace_id, parent_id, title, icon, created_by,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(page.id)
        .bind(page.workspace_id)
        .bind(page.parent_id)
        .bind(&page.title)
        .bind(&page.icon)
        .bind(page.created_by)
        .bind(page.created_at)
        .bind(page.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("Workspace or parent page not found".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_page())
    }

    /// Persist an update. `created_by`/`created_at` are written from the
    /// entity the service assembled, which carries the original values.
    async fn update(&self, page: &Page) -> Result<Page, AppError> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            UPDATE pages
            SET parent_id = $2, title = $3, icon = $4, updated_at = $5
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(page.id)
        .bind(page.parent_id)
        .bind(&page.title)
        .bind(&page.icon)
        .bind(page.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PageRow::into_page)
            .ok_or_else(|| AppError::NotFound(format!("Page {} not found", page.id)))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE pages SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page {} not found", id)));
        }

        Ok(())
    }

    async fn find_by_workspace(
        &self,
        workspace_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Page>, AppError> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            SELECT {PAGE_COLUMNS} FROM pages
            WHERE workspace_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(workspace_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PageRow::into_page).collect())
    }

    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pages WHERE workspace_id = $1 AND is_deleted = FALSE",
        )
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Flat child listing; tree assembly happens client-side.
    async fn find_children(&self, parent_id: Uuid) -> Result<Vec<Page>, AppError> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            SELECT {PAGE_COLUMNS} FROM pages
            WHERE parent_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC
            "#
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PageRow::into_page).collect())
    }
}
