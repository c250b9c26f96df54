//! Post Service
//!
//! Post CRUD with tags, plus the engagement paths: likes (unique per user,
//! counter kept in the same transaction) and views (idempotent per
//! authenticated user, free-running for anonymous traffic).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{
    LikeRepository, Post, PostLike, PostRepository, PostView, TagRepository, ViewRepository,
};
use crate::shared::error::AppError;

/// Post service trait
#[async_trait]
pub trait PostService: Send + Sync {
    /// Create a post, attaching tags when given.
    async fn create_post(&self, actor: Actor, request: CreatePostDto)
        -> Result<PostDto, PostError>;

    /// Get a post with viewer-specific flags.
    async fn get_post(&self, post_id: Uuid, viewer: Option<Uuid>) -> Result<PostDto, PostError>;

    /// Update a post (author or super admin).
    async fn update_post(
        &self,
        post_id: Uuid,
        actor: Actor,
        update: UpdatePostDto,
    ) -> Result<PostDto, PostError>;

    /// Soft-delete a post (author or super admin).
    async fn delete_post(&self, post_id: Uuid, actor: Actor) -> Result<(), PostError>;

    /// List live posts, newest first.
    async fn list_posts(&self, limit: i64, offset: i64)
        -> Result<(Vec<PostDto>, i64), PostError>;

    /// List an author's live posts.
    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostDto>, i64), PostError>;

    /// List posts carrying a tag.
    async fn list_by_tag(
        &self,
        tag_name: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostDto>, i64), PostError>;

    /// Like a post. Duplicate likes are a domain conflict.
    async fn like(&self, post_id: Uuid, actor: Actor) -> Result<(), PostError>;

    /// Remove a like. Missing like is a domain error.
    async fn unlike(&self, post_id: Uuid, actor: Actor) -> Result<(), PostError>;

    /// Record a view. Authenticated duplicates are a silent no-op; anonymous
    /// hits always insert. Returns whether a row was recorded.
    async fn record_view(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<bool, PostError>;
}

/// Create post request
#[derive(Debug, Clone)]
pub struct CreatePostDto {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
}

/// Update post request
#[derive(Debug, Clone, Default)]
pub struct UpdatePostDto {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Post data transfer object with tag names and viewer flags.
#[derive(Debug, Clone)]
pub struct PostDto {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub like_count: i64,
    pub view_count: i64,
    pub comment_count: i64,
    pub tags: Vec<String>,
    pub liked: bool,
    pub viewed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl PostDto {
    fn from_post(post: Post, tags: Vec<String>, liked: bool, viewed: bool) -> Self {
        Self {
            id: post.id.to_string(),
            author_id: post.author_id.to_string(),
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            like_count: post.like_count,
            view_count: post.view_count,
            comment_count: post.comment_count,
            tags,
            liked,
            viewed,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// Post service errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Post already liked")]
    AlreadyLiked,

    #[error("Post not liked")]
    NotLiked,

    #[error("Post title must not be empty")]
    EmptyTitle,

    #[error("Permission denied")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// PostService implementation
pub struct PostServiceImpl<P, L, V, T>
where
    P: PostRepository,
    L: LikeRepository,
    V: ViewRepository,
    T: TagRepository,
{
    post_repo: Arc<P>,
    like_repo: Arc<L>,
    view_repo: Arc<V>,
    tag_repo: Arc<T>,
}

impl<P, L, V, T> PostServiceImpl<P, L, V, T>
where
    P: PostRepository,
    L: LikeRepository,
    V: ViewRepository,
    T: TagRepository,
{
    pub fn new(post_repo: Arc<P>, like_repo: Arc<L>, view_repo: Arc<V>, tag_repo: Arc<T>) -> Self {
        Self {
            post_repo,
            like_repo,
            view_repo,
            tag_repo,
        }
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post, PostError> {
        self.post_repo
            .find_by_id(post_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?
            .ok_or(PostError::NotFound)
    }

    async fn tag_names(&self, post_id: Uuid) -> Result<Vec<String>, PostError> {
        let tags = self
            .tag_repo
            .tags_for_post(post_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    /// Build a DTO for a viewer; anonymous viewers carry no flags.
    async fn to_dto(&self, post: Post, viewer: Option<Uuid>) -> Result<PostDto, PostError> {
        let tags = self.tag_names(post.id).await?;

        let (liked, viewed) = match viewer {
            Some(user_id) => {
                let liked = self
                    .like_repo
                    .exists(post.id, user_id)
                    .await
                    .map_err(|e| PostError::Internal(e.to_string()))?;
                let viewed = self
                    .view_repo
                    .has_viewed(post.id, user_id)
                    .await
                    .map_err(|e| PostError::Internal(e.to_string()))?;
                (liked, viewed)
            }
            None => (false, false),
        };

        Ok(PostDto::from_post(post, tags, liked, viewed))
    }

    async fn to_dto_list(
        &self,
        posts: Vec<Post>,
        total: i64,
    ) -> Result<(Vec<PostDto>, i64), PostError> {
        let mut dtos = Vec::with_capacity(posts.len());
        for post in posts {
            let tags = self.tag_names(post.id).await?;
            dtos.push(PostDto::from_post(post, tags, false, false));
        }
        Ok((dtos, total))
    }
}

#[async_trait]
impl<P, L, V, T> PostService for PostServiceImpl<P, L, V, T>
where
    P: PostRepository + 'static,
    L: LikeRepository + 'static,
    V: ViewRepository + 'static,
    T: TagRepository + 'static,
{
    async fn create_post(
        &self,
        actor: Actor,
        request: CreatePostDto,
    ) -> Result<PostDto, PostError> {
        if request.title.trim().is_empty() {
            return Err(PostError::EmptyTitle);
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::now_v7(),
            author_id: actor.id,
            title: request.title,
            content: request.content,
            image_url: request.image_url,
            like_count: 0,
            view_count: 0,
            comment_count: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .post_repo
            .create(&post)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        let tags = if request.tags.is_empty() {
            Vec::new()
        } else {
            self.tag_repo
                .set_post_tags(created.id, &request.tags)
                .await
                .map_err(|e| PostError::Internal(e.to_string()))?
                .into_iter()
                .map(|t| t.name)
                .collect()
        };

        Ok(PostDto::from_post(created, tags, false, false))
    }

    async fn get_post(&self, post_id: Uuid, viewer: Option<Uuid>) -> Result<PostDto, PostError> {
        let post = self.require_post(post_id).await?;
        self.to_dto(post, viewer).await
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        actor: Actor,
        update: UpdatePostDto,
    ) -> Result<PostDto, PostError> {
        let mut post = self.require_post(post_id).await?;

        if post.author_id != actor.id && !actor.is_super_admin {
            return Err(PostError::Forbidden);
        }

        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(PostError::EmptyTitle);
            }
            post.title = title;
        }
        if let Some(content) = update.content {
            post.content = content;
        }
        if let Some(image_url) = update.image_url {
            post.image_url = Some(image_url);
        }
        post.updated_at = Utc::now();

        let updated = self
            .post_repo
            .update(&post)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        if let Some(tags) = update.tags {
            self.tag_repo
                .set_post_tags(post_id, &tags)
                .await
                .map_err(|e| PostError::Internal(e.to_string()))?;
        }

        self.to_dto(updated, Some(actor.id)).await
    }

    async fn delete_post(&self, post_id: Uuid, actor: Actor) -> Result<(), PostError> {
        let post = self.require_post(post_id).await?;

        if post.author_id != actor.id && !actor.is_super_admin {
            return Err(PostError::Forbidden);
        }

        self.post_repo
            .soft_delete(post_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))
    }

    async fn list_posts(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostDto>, i64), PostError> {
        let posts = self
            .post_repo
            .list(limit, offset)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        let total = self
            .post_repo
            .count()
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        self.to_dto_list(posts, total).await
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostDto>, i64), PostError> {
        let posts = self
            .post_repo
            .list_by_author(author_id, limit, offset)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        let total = self
            .post_repo
            .count_by_author(author_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        self.to_dto_list(posts, total).await
    }

    async fn list_by_tag(
        &self,
        tag_name: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostDto>, i64), PostError> {
        let posts = self
            .post_repo
            .list_by_tag(tag_name, limit, offset)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        let total = self
            .post_repo
            .count_by_tag(tag_name)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        self.to_dto_list(posts, total).await
    }

    async fn like(&self, post_id: Uuid, actor: Actor) -> Result<(), PostError> {
        self.require_post(post_id).await?;

        let exists = self
            .like_repo
            .exists(post_id, actor.id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        if exists {
            return Err(PostError::AlreadyLiked);
        }

        // A losing racer hits the unique index and gets the same conflict.
        self.like_repo
            .create(&PostLike::new(post_id, actor.id))
            .await
            .map(|_| ())
            .map_err(|e| match e {
                AppError::Conflict(_) => PostError::AlreadyLiked,
                e => PostError::Internal(e.to_string()),
            })
    }

    async fn unlike(&self, post_id: Uuid, actor: Actor) -> Result<(), PostError> {
        self.require_post(post_id).await?;

        self.like_repo
            .delete(post_id, actor.id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => PostError::NotLiked,
                e => PostError::Internal(e.to_string()),
            })
    }

    async fn record_view(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<bool, PostError> {
        self.require_post(post_id).await?;

        let view = match viewer {
            Some(user_id) => PostView::authenticated(post_id, user_id),
            None => PostView::anonymous(post_id, ip_address, user_agent),
        };

        self.view_repo
            .record(&view)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        MockLikeRepository, MockPostRepository, MockTagRepository, MockViewRepository,
    };
    use mockall::predicate::eq;

    fn actor(id: Uuid) -> Actor {
        Actor {
            id,
            is_super_admin: false,
        }
    }

    fn sample_post(author_id: Uuid) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::now_v7(),
            author_id,
            title: "Title".into(),
            content: "Body".into(),
            image_url: None,
            like_count: 0,
            view_count: 0,
            comment_count: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        post_repo: MockPostRepository,
        like_repo: MockLikeRepository,
        view_repo: MockViewRepository,
        tag_repo: MockTagRepository,
    ) -> PostServiceImpl<MockPostRepository, MockLikeRepository, MockViewRepository, MockTagRepository>
    {
        PostServiceImpl::new(
            Arc::new(post_repo),
            Arc::new(like_repo),
            Arc::new(view_repo),
            Arc::new(tag_repo),
        )
    }

    #[tokio::test]
    async fn second_like_is_a_domain_conflict() {
        let user = Uuid::now_v7();
        let post = sample_post(Uuid::now_v7());
        let post_id = post.id;

        let mut post_repo = MockPostRepository::new();
        post_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        let mut like_repo = MockLikeRepository::new();
        like_repo
            .expect_exists()
            .with(eq(post_id), eq(user))
            .returning(|_, _| Ok(true));
        like_repo.expect_create().never();

        let svc = service(
            post_repo,
            like_repo,
            MockViewRepository::new(),
            MockTagRepository::new(),
        );

        let result = svc.like(post_id, actor(user)).await;
        assert!(matches!(result, Err(PostError::AlreadyLiked)));
    }

    #[tokio::test]
    async fn unlike_without_like_is_rejected() {
        let post = sample_post(Uuid::now_v7());
        let post_id = post.id;

        let mut post_repo = MockPostRepository::new();
        post_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        let mut like_repo = MockLikeRepository::new();
        like_repo
            .expect_delete()
            .returning(|_, _| Err(AppError::NotFound("Post not liked".into())));

        let svc = service(
            post_repo,
            like_repo,
            MockViewRepository::new(),
            MockTagRepository::new(),
        );

        let result = svc.unlike(post_id, actor(Uuid::now_v7())).await;
        assert!(matches!(result, Err(PostError::NotLiked)));
    }

    #[tokio::test]
    async fn liking_a_missing_post_is_not_found() {
        let mut post_repo = MockPostRepository::new();
        post_repo.expect_find_by_id().returning(|_| Ok(None));

        let mut like_repo = MockLikeRepository::new();
        like_repo.expect_create().never();

        let svc = service(
            post_repo,
            like_repo,
            MockViewRepository::new(),
            MockTagRepository::new(),
        );

        let result = svc.like(Uuid::now_v7(), actor(Uuid::now_v7())).await;
        assert!(matches!(result, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn duplicate_authenticated_view_is_a_silent_noop() {
        let user = Uuid::now_v7();
        let post = sample_post(Uuid::now_v7());
        let post_id = post.id;

        let mut post_repo = MockPostRepository::new();
        post_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        let mut view_repo = MockViewRepository::new();
        view_repo
            .expect_record()
            .withf(move |view| view.user_id == Some(user))
            .returning(|_| Ok(false));

        let svc = service(
            post_repo,
            MockLikeRepository::new(),
            view_repo,
            MockTagRepository::new(),
        );

        let recorded = svc
            .record_view(post_id, Some(user), None, None)
            .await
            .unwrap();

        assert!(!recorded);
    }

    #[tokio::test]
    async fn anonymous_view_keeps_request_metadata() {
        let post = sample_post(Uuid::now_v7());
        let post_id = post.id;

        let mut post_repo = MockPostRepository::new();
        post_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        let mut view_repo = MockViewRepository::new();
        view_repo
            .expect_record()
            .withf(|view| {
                view.user_id.is_none()
                    && view.ip_address.as_deref() == Some("203.0.113.9")
                    && view.user_agent.as_deref() == Some("curl/8.0")
            })
            .returning(|_| Ok(true));

        let svc = service(
            post_repo,
            MockLikeRepository::new(),
            view_repo,
            MockTagRepository::new(),
        );

        let recorded = svc
            .record_view(
                post_id,
                None,
                Some("203.0.113.9".into()),
                Some("curl/8.0".into()),
            )
            .await
            .unwrap();

        assert!(recorded);
    }

    #[tokio::test]
    async fn only_the_author_or_super_admin_can_delete() {
        let author = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let post = sample_post(author);
        let post_id = post.id;

        let mut post_repo = MockPostRepository::new();
        post_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        post_repo.expect_soft_delete().never();

        let svc = service(
            post_repo,
            MockLikeRepository::new(),
            MockViewRepository::new(),
            MockTagRepository::new(),
        );

        let result = svc.delete_post(post_id, actor(stranger)).await;
        assert!(matches!(result, Err(PostError::Forbidden)));
    }
}
