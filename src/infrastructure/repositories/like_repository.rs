//! Like Repository Implementation
//!
//! PostgreSQL implementation of the LikeRepository trait. The like row and
//! the post's `like_count` move together in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{LikeRepository, PostLike};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct LikeRow {
    id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl LikeRow {
    fn into_like(self) -> PostLike {
        PostLike {
            id: self.id,
            post_id: self.post_id,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL like repository implementation.
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM post_likes WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, like: &PostLike) -> Result<PostLike, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            INSERT INTO post_likes (id, post_id, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, user_id, created_at
            "#,
        )
        .bind(like.id)
        .bind(like.post_id)
        .bind(like.user_id)
        .bind(like.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Post already liked".to_string())
            }
            _ => AppError::Database(e),
        })?;

        sqlx::query("UPDATE posts SET like_count = like_count + 1 WHERE id = $1")
            .bind(like.post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into_like())
    }

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not liked".to_string()));
        }

        sqlx::query("UPDATE posts SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
