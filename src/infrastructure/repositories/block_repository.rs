//! Block Repository Implementation
//!
//! PostgreSQL implementation of the BlockRepository trait. Sibling order is
//! the float `position` column; listings always sort by it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Block, BlockRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct BlockRow {
    id: Uuid,
    page_id: Uuid,
    parent_id: Option<Uuid>,
    block_type: String,
    content: serde_json::Value,
    position: f64,
    created_by: Uuid,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BlockRow {
    fn into_block(self) -> Block {
        Block {
            id: self.id,
            page_id: self.page_id,
            parent_id: self.parent_id,
            block_type: self.block_type,
            content: self.content,
            position: self.position,
            created_by: self.created_by,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const BLOCK_COLUMNS: &str = "id, page_id, parent_id, block_type, content, position, created_by, \
     is_deleted, created_at, updated_at";

/// PostgreSQL block repository implementation.
#[derive(Clone)]
pub struct PgBlockRepository {
    pool: PgPool,
}

impl PgBlockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockRepository for PgBlockRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Block>, AppError> {
        let row = sqlx::query_as::<_, BlockRow>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM blocks WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BlockRow::into_block))
    }

    async fn create(&self, block: &Block) -> Result<Block, AppError> {
        let row = sqlx::query_as::<_, BlockRow>(&format!(
            r#"
            INSERT INTO blocks (id, page_id, parent_id, block_type, content, position,
                                created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {BLOCK_COLUMNS}
            "#
        ))
        .bind(block.id)
        .bind(block.page_id)
        .bind(block.parent_id)
        .bind(&block.block_type)
        .bind(&block.content)
        .bind(block.position)
        .bind(block.created_by)
        .bind(block.created_at)
        .bind(block.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("Page or parent block not found".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_block())
    }

    async fn update(&self, block: &Block) -> Result<Block, AppError> {
        let row = sqlx::query_as::<_, BlockRow>(&format!(
            r#"
            UPDATE blocks
            SET block_type = $2, content = $3, updated_at = $4
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {BLOCK_COLUMNS}
            "#
        ))
        .bind(block.id)
        .bind(&block.block_type)
        .bind(&block.content)
        .bind(block.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BlockRow::into_block)
            .ok_or_else(|| AppError::NotFound(format!("Block {} not found", block.id)))
    }

    async fn update_position(&self, id: Uuid, position: f64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE blocks SET position = $2, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(position)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Block {} not found", id)));
        }

        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE blocks SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Block {} not found", id)));
        }

        Ok(())
    }

    async fn find_by_page(&self, page_id: Uuid) -> Result<Vec<Block>, AppError> {
        let rows = sqlx::query_as::<_, BlockRow>(&format!(
            r#"
            SELECT {BLOCK_COLUMNS} FROM blocks
            WHERE page_id = $1 AND is_deleted = FALSE
            ORDER BY position ASC
            "#
        ))
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BlockRow::into_block).collect())
    }

    async fn find_children(&self, parent_id: Uuid) -> Result<Vec<Block>, AppError> {
        let rows = sqlx::query_as::<_, BlockRow>(&format!(
            r#"
            SELECT {BLOCK_COLUMNS} FROM blocks
            WHERE parent_id = $1 AND is_deleted = FALSE
            ORDER BY position ASC
            "#
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BlockRow::into_block).collect())
    }
}
