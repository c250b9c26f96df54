//! User Service
//!
//! Profile management and user listings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{User, UserRepository};
use crate::shared::error::AppError;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user by ID.
    async fn get_user(&self, user_id: Uuid) -> Result<User, UserError>;

    /// Update the actor's own profile.
    async fn update_profile(&self, actor: Actor, update: UpdateProfileDto)
        -> Result<User, UserError>;

    /// Soft-delete the actor's own account.
    async fn delete_account(&self, actor: Actor) -> Result<(), UserError>;

    /// List users, newest first.
    async fn list_users(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), UserError>;
}

/// Update profile request
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn get_user(&self, user_id: Uuid) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(
        &self,
        actor: Actor,
        update: UpdateProfileDto,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(actor.id).await?;

        if let Some(username) = update.username {
            if username != user.username {
                let taken = self
                    .user_repo
                    .username_exists(&username)
                    .await
                    .map_err(|e| UserError::Internal(e.to_string()))?;

                if taken {
                    return Err(UserError::UsernameTaken);
                }
                user.username = username;
            }
        }
        if let Some(display_name) = update.display_name {
            user.display_name = Some(display_name);
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        user.updated_at = Utc::now();

        self.user_repo.update(&user).await.map_err(|e| match e {
            AppError::Conflict(_) => UserError::UsernameTaken,
            AppError::NotFound(_) => UserError::NotFound,
            e => UserError::Internal(e.to_string()),
        })
    }

    async fn delete_account(&self, actor: Actor) -> Result<(), UserError> {
        self.user_repo
            .soft_delete(actor.id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => UserError::NotFound,
                e => UserError::Internal(e.to_string()),
            })
    }

    async fn list_users(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), UserError> {
        let users = self
            .user_repo
            .list(limit, offset)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        let total = self
            .user_repo
            .count()
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        Ok((users, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MockUserRepository;

    fn sample_user(id: Uuid) -> User {
        let now = Utc::now();
        User {
            id,
            username: "alice".into(),
            email: "alice@example.com".into(),
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

    #[tokio::test]
    async fn changing_to_a_taken_username_fails() {
        let user_id = Uuid::now_v7();

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id))));
        user_repo.expect_username_exists().returning(|_| Ok(true));
        user_repo.expect_update().never();

        let svc = UserServiceImpl::new(Arc::new(user_repo));
        let result = svc
            .update_profile(
                Actor {
                    id: user_id,
                    is_super_admin: false,
                },
                UpdateProfileDto {
                    username: Some("bob".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::UsernameTaken)));
    }

    #[tokio::test]
    async fn keeping_the_same_username_skips_the_uniqueness_check() {
        let user_id = Uuid::now_v7();

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id))));
        user_repo.expect_username_exists().never();
        user_repo.expect_update().returning(|u| Ok(u.clone()));

        let svc = UserServiceImpl::new(Arc::new(user_repo));
        let user = svc
            .update_profile(
                Actor {
                    id: user_id,
                    is_super_admin: false,
                },
                UpdateProfileDto {
                    username: Some("alice".into()),
                    bio: Some("hello".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(user.bio.as_deref(), Some("hello"));
    }
}
