//! Follow Service
//!
//! Follow-graph operations: edge creation/removal with counter maintenance,
//! follower/following listings, mutual-follow intersection and the counter
//! repair path.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{FollowCounts, FollowRepository, User, UserFollow, UserRepository};
use crate::shared::error::AppError;

/// Follow service trait
#[async_trait]
pub trait FollowService: Send + Sync {
    /// Follow a user. Three writes commit atomically: the edge and both
    /// denormalized counters.
    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), FollowError>;

    /// Unfollow a user; symmetric to `follow`.
    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), FollowError>;

    /// Users following `user_id`.
    async fn followers(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), FollowError>;

    /// Users `user_id` follows.
    async fn following(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), FollowError>;

    /// Users followed by both `a` and `b`.
    async fn mutual_follows(&self, a: Uuid, b: Uuid) -> Result<Vec<User>, FollowError>;

    /// Recompute both counters from the edge table. Repair path for drift.
    async fn recalculate_counts(&self, user_id: Uuid) -> Result<FollowCounts, FollowError>;
}

/// Follow service errors
#[derive(Debug, thiserror::Error)]
pub enum FollowError {
    #[error("Cannot follow yourself")]
    SelfFollow,

    #[error("Already following")]
    AlreadyFollowing,

    #[error("Not following")]
    NotFollowing,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// FollowService implementation
pub struct FollowServiceImpl<F, U>
where
    F: FollowRepository,
    U: UserRepository,
{
    follow_repo: Arc<F>,
    user_repo: Arc<U>,
}

impl<F, U> FollowServiceImpl<F, U>
where
    F: FollowRepository,
    U: UserRepository,
{
    pub fn new(follow_repo: Arc<F>, user_repo: Arc<U>) -> Self {
        Self {
            follow_repo,
            user_repo,
        }
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User, FollowError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| FollowError::Internal(e.to_string()))?
            .ok_or(FollowError::UserNotFound)
    }
}

#[async_trait]
impl<F, U> FollowService for FollowServiceImpl<F, U>
where
    F: FollowRepository + 'static,
    U: UserRepository + 'static,
{
    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), FollowError> {
        if follower_id == following_id {
            return Err(FollowError::SelfFollow);
        }

        self.require_user(following_id).await?;

        let exists = self
            .follow_repo
            .exists(follower_id, following_id)
            .await
            .map_err(|e| FollowError::Internal(e.to_string()))?;

        if exists {
            return Err(FollowError::AlreadyFollowing);
        }

        // A racer that slips between the check and the insert loses on the
        // unique edge index and gets the same conflict.
        self.follow_repo
            .create(&UserFollow::new(follower_id, following_id))
            .await
            .map(|_| ())
            .map_err(|e| match e {
                AppError::Conflict(_) => FollowError::AlreadyFollowing,
                e => FollowError::Internal(e.to_string()),
            })
    }

    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), FollowError> {
        if follower_id == following_id {
            return Err(FollowError::SelfFollow);
        }

        self.follow_repo
            .delete(follower_id, following_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => FollowError::NotFollowing,
                e => FollowError::Internal(e.to_string()),
            })
    }

    async fn followers(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), FollowError> {
        self.require_user(user_id).await?;

        let users = self
            .follow_repo
            .followers_of(user_id, limit, offset)
            .await
            .map_err(|e| FollowError::Internal(e.to_string()))?;

        let total = self
            .follow_repo
            .count_followers(user_id)
            .await
            .map_err(|e| FollowError::Internal(e.to_string()))?;

        Ok((users, total))
    }

    async fn following(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), FollowError> {
        self.require_user(user_id).await?;

        let users = self
            .follow_repo
            .following_of(user_id, limit, offset)
            .await
            .map_err(|e| FollowError::Internal(e.to_string()))?;

        let total = self
            .follow_repo
            .count_following(user_id)
            .await
            .map_err(|e| FollowError::Internal(e.to_string()))?;

        Ok((users, total))
    }

    async fn mutual_follows(&self, a: Uuid, b: Uuid) -> Result<Vec<User>, FollowError> {
        self.follow_repo
            .mutual_follows(a, b)
            .await
            .map_err(|e| FollowError::Internal(e.to_string()))
    }

    async fn recalculate_counts(&self, user_id: Uuid) -> Result<FollowCounts, FollowError> {
        self.follow_repo
            .recalculate_counts(user_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => FollowError::UserNotFound,
                e => FollowError::Internal(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{MockFollowRepository, MockUserRepository};
    use chrono::Utc;
    use mockall::predicate::eq;

    fn sample_user(id: Uuid) -> User {
        let now = Utc::now();
        User {
            id,
            username: "user".into(),
            email: "user@example.com".into(),
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

    fn service(
        follow_repo: MockFollowRepository,
        user_repo: MockUserRepository,
    ) -> FollowServiceImpl<MockFollowRepository, MockUserRepository> {
        FollowServiceImpl::new(Arc::new(follow_repo), Arc::new(user_repo))
    }

    #[tokio::test]
    async fn self_follow_is_rejected_before_any_repository_call() {
        let mut follow_repo = MockFollowRepository::new();
        follow_repo.expect_exists().never();
        follow_repo.expect_create().never();

        let svc = service(follow_repo, MockUserRepository::new());
        let user = Uuid::now_v7();

        let result = svc.follow(user, user).await;
        assert!(matches!(result, Err(FollowError::SelfFollow)));
    }

    #[tokio::test]
    async fn second_follow_fails_without_touching_counters() {
        let follower = Uuid::now_v7();
        let following = Uuid::now_v7();

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id))));

        let mut follow_repo = MockFollowRepository::new();
        follow_repo
            .expect_exists()
            .with(eq(follower), eq(following))
            .returning(|_, _| Ok(true));
        follow_repo.expect_create().never();

        let svc = service(follow_repo, user_repo);
        let result = svc.follow(follower, following).await;

        assert!(matches!(result, Err(FollowError::AlreadyFollowing)));
    }

    #[tokio::test]
    async fn follow_of_missing_user_fails() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(|_| Ok(None));

        let mut follow_repo = MockFollowRepository::new();
        follow_repo.expect_create().never();

        let svc = service(follow_repo, user_repo);
        let result = svc.follow(Uuid::now_v7(), Uuid::now_v7()).await;

        assert!(matches!(result, Err(FollowError::UserNotFound)));
    }

    #[tokio::test]
    async fn race_losing_insert_maps_to_already_following() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id))));

        let mut follow_repo = MockFollowRepository::new();
        follow_repo.expect_exists().returning(|_, _| Ok(false));
        follow_repo
            .expect_create()
            .returning(|_| Err(AppError::Conflict("Already following this user".into())));

        let svc = service(follow_repo, user_repo);
        let result = svc.follow(Uuid::now_v7(), Uuid::now_v7()).await;

        assert!(matches!(result, Err(FollowError::AlreadyFollowing)));
    }

    #[tokio::test]
    async fn unfollow_without_edge_fails() {
        let mut follow_repo = MockFollowRepository::new();
        follow_repo
            .expect_delete()
            .returning(|_, _| Err(AppError::NotFound("Not following this user".into())));

        let svc = service(follow_repo, MockUserRepository::new());
        let result = svc.unfollow(Uuid::now_v7(), Uuid::now_v7()).await;

        assert!(matches!(result, Err(FollowError::NotFollowing)));
    }

    #[tokio::test]
    async fn mutual_follows_passes_both_sides_to_the_join() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let shared = sample_user(Uuid::now_v7());
        let shared_id = shared.id;

        let mut follow_repo = MockFollowRepository::new();
        follow_repo
            .expect_mutual_follows()
            .with(eq(a), eq(b))
            .returning(move |_, _| Ok(vec![shared.clone()]));

        let svc = service(follow_repo, MockUserRepository::new());
        let result = svc.mutual_follows(a, b).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, shared_id);
    }

    #[tokio::test]
    async fn recalculate_overwrites_from_edge_table() {
        let user = Uuid::now_v7();

        let mut follow_repo = MockFollowRepository::new();
        follow_repo
            .expect_recalculate_counts()
            .with(eq(user))
            .returning(|_| {
                Ok(FollowCounts {
                    followers_count: 3,
                    following_count: 5,
                })
            });

        let svc = service(follow_repo, MockUserRepository::new());
        let counts = svc.recalculate_counts(user).await.unwrap();

        assert_eq!(counts.followers_count, 3);
        assert_eq!(counts.following_count, 5);
    }
}
