//! Follow Repository Implementation
//!
//! PostgreSQL implementation of the FollowRepository trait. Edge writes and
//! the denormalized user counters always move inside one transaction; the
//! unique edge index backs the existence pre-checks against races.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{FollowCounts, FollowRepository, User, UserFollow};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct FollowRow {
    id: Uuid,
    follower_id: Uuid,
    following_id: Uuid,
    created_at: DateTime<Utc>,
}

impl FollowRow {
    fn into_follow(self) -> UserFollow {
        UserFollow {
            id: self.id,
            follower_id: self.follower_id,
            following_id: self.following_id,
            created_at: self.created_at,
        }
    }
}

/// Row shape shared by the follower/following/mutual listings.
#[derive(Debug, sqlx::FromRow)]
struct FollowUserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    bio: Option<String>,
    is_super_admin: bool,
    followers_count: i64,
    following_count: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FollowUserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            bio: self.bio,
            is_super_admin: self.is_super_admin,
            followers_count: self.followers_count,
            following_count: self.following_count,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const JOINED_USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.display_name, \
     u.avatar_url, u.bio, u.is_super_admin, u.followers_count, u.following_count, \
     u.is_deleted, u.created_at, u.updated_at";

/// PostgreSQL follow repository implementation.
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    /// Create a new PgFollowRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_follows
                WHERE follower_id = $1 AND following_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Insert the edge and bump both counters atomically.
    async fn create(&self, follow: &UserFollow) -> Result<UserFollow, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, FollowRow>(
            r#"
            INSERT INTO user_follows (id, follower_id, following_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, follower_id, following_id, created_at
            "#,
        )
        .bind(follow.id)
        .bind(follow.follower_id)
        .bind(follow.following_id)
        .bind(follow.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Already following this user".to_string())
            }
            _ => AppError::Database(e),
        })?;

        sqlx::query(
            "UPDATE users SET following_count = following_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(follow.follower_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET followers_count = followers_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(follow.following_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_follow())
    }

    /// Delete the edge and decrement both counters atomically.
    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "DELETE FROM user_follows WHERE follower_id = $1 AND following_id = $2",
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Not following this user".to_string()));
        }

        sqlx::query(
            r#"
            UPDATE users
            SET following_count = GREATEST(following_count - 1, 0), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(follower_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET followers_count = GREATEST(followers_count - 1, 0), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(following_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn followers_of(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, FollowUserRow>(&format!(
            r#"
            SELECT {JOINED_USER_COLUMNS}
            FROM users u
            INNER JOIN user_follows f ON f.follower_id = u.id
            WHERE f.following_id = $1 AND u.is_deleted = FALSE
            ORDER BY f.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FollowUserRow::into_user).collect())
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_follows WHERE following_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn following_of(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, FollowUserRow>(&format!(
            r#"
            SELECT {JOINED_USER_COLUMNS}
            FROM users u
            INNER JOIN user_follows f ON f.following_id = u.id
            WHERE f.follower_id = $1 AND u.is_deleted = FALSE
            ORDER BY f.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FollowUserRow::into_user).collect())
    }

    async fn count_following(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_follows WHERE follower_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Set intersection computed by the database, not in memory. Edge
    /// uniqueness makes duplicates impossible.
    async fn mutual_follows(&self, a: Uuid, b: Uuid) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, FollowUserRow>(&format!(
            r#"
            SELECT {JOINED_USER_COLUMNS}
            FROM users u
            INNER JOIN user_follows fa ON fa.following_id = u.id AND fa.follower_id = $1
            INNER JOIN user_follows fb ON fb.following_id = u.id AND fb.follower_id = $2
            WHERE u.is_deleted = FALSE
            "#
        ))
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FollowUserRow::into_user).collect())
    }

    /// Overwrite both counters from the edge table in a single statement.
    async fn recalculate_counts(&self, user_id: Uuid) -> Result<FollowCounts, AppError> {
        let row = sqlx::query_as::<_, (i64, i64)>(
            r#"
            UPDATE users
            SET followers_count = (SELECT COUNT(*) FROM user_follows WHERE following_id = $1),
                following_count = (SELECT COUNT(*) FROM user_follows WHERE follower_id = $1),
                updated_at = NOW()
            WHERE id = $1
            RETURNING followers_count, following_count
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let (followers_count, following_count) =
            row.ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        Ok(FollowCounts {
            followers_count,
            following_count,
        })
    }
}
