//! View Repository Implementation
//!
//! PostgreSQL implementation of the ViewRepository trait. The partial unique
//! index on (post_id, user_id) makes authenticated recording idempotent at
//! the database, so the row insert and the counter increment can share one
//! transaction without a read-first race.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{PostView, ViewRepository};
use crate::shared::error::AppError;

/// PostgreSQL view repository implementation.
#[derive(Clone)]
pub struct PgViewRepository {
    pool: PgPool,
}

impl PgViewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewRepository for PgViewRepository {
    async fn record(&self, view: &PostView) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        // ON CONFLICT only fires for authenticated rows; anonymous rows
        // (user_id NULL) never collide and insert every time.
        let result = sqlx::query(
            r#"
            INSERT INTO post_views (id, post_id, user_id, ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (post_id, user_id) WHERE user_id IS NOT NULL DO NOTHING
            "#,
        )
        .bind(view.id)
        .bind(view.post_id)
        .bind(view.user_id)
        .bind(&view.ip_address)
        .bind(&view.user_agent)
        .bind(view.created_at)
        .execute(&mut *tx)
        .await?;

        let inserted = result.rows_affected() > 0;

        if inserted {
            sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
                .bind(view.post_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(inserted)
    }

    async fn has_viewed(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM post_views WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post_views WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
