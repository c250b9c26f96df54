//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: registration, credentials, JWT tokens, sessions
//! - **UserService**: profile management
//! - **FollowService**: follow graph and counter maintenance
//! - **WorkspaceService**: workspace lifecycle and membership
//! - **PageService** / **BlockService**: document tree
//! - **PostService**: posts, tags, likes, views
//! - **CommentService**: comments
//! - **ChatService**: conversations and messages

pub mod auth_service;
pub mod block_service;
pub mod chat_service;
pub mod comment_service;
pub mod follow_service;
pub mod page_service;
pub mod post_service;
pub mod user_service;
pub mod workspace_service;

use uuid::Uuid;

/// Authenticated principal acting on a service call, decoded once at the
/// middleware boundary.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub is_super_admin: bool,
}

pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims};
pub use block_service::{
    BlockError, BlockService, BlockServiceImpl, CreateBlockDto, MoveBlockDto, UpdateBlockDto,
};
pub use chat_service::{ChatError, ChatService, ChatServiceImpl, CreateConversationDto};
pub use comment_service::{CommentError, CommentService, CommentServiceImpl};
pub use follow_service::{FollowError, FollowService, FollowServiceImpl};
pub use page_service::{
    CreatePageDto, PageError, PageService, PageServiceImpl, UpdatePageDto,
};
pub use post_service::{
    CreatePostDto, PostDto, PostError, PostService, PostServiceImpl, UpdatePostDto,
};
pub use user_service::{UpdateProfileDto, UserError, UserService, UserServiceImpl};
pub use workspace_service::{
    CreateWorkspaceDto, MemberDto, MembershipDto, UpdateWorkspaceDto, WorkspaceDto,
    WorkspaceError, WorkspaceService, WorkspaceServiceImpl,
};
