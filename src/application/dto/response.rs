//! Response DTOs
//!
//! Data structures for API response bodies. Every endpoint answers with the
//! `{success, message, data}` envelope; failures use the error envelope in
//! `shared::error`.

use serde::Serialize;

use crate::application::services::{AuthTokens, MemberDto, MembershipDto, PostDto, WorkspaceDto};
use crate::domain::{
    Block, Comment, Conversation, ConversationMessage, FollowCounts, Page, Tag, User,
};

/// Success envelope: `{success, message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Offset-paginated listing payload.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            items,
            total,
            page,
            limit,
        }
    }
}

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Registration/login response (user plus tokens)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenResponse,
}

/// User response; email only included for the profile owner.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: if include_email { Some(user.email) } else { None },
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            bio: user.bio,
            followers_count: user.followers_count,
            following_count: user.following_count,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Follow counter pair after a recount.
#[derive(Debug, Serialize)]
pub struct FollowCountsResponse {
    pub followers_count: i64,
    pub following_count: i64,
}

impl From<FollowCounts> for FollowCountsResponse {
    fn from(counts: FollowCounts) -> Self {
        Self {
            followers_count: counts.followers_count,
            following_count: counts.following_count,
        }
    }
}

/// Workspace response
#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub owner_id: String,
    pub member_count: i64,
    pub created_at: String,
}

impl From<WorkspaceDto> for WorkspaceResponse {
    fn from(dto: WorkspaceDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            icon: dto.icon,
            owner_id: dto.owner_id,
            member_count: dto.member_count,
            created_at: dto.created_at,
        }
    }
}

/// Workspace member response
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub workspace_id: String,
    pub user_id: String,
    pub role: String,
    pub joined_at: String,
}

impl From<MemberDto> for MemberResponse {
    fn from(dto: MemberDto) -> Self {
        Self {
            workspace_id: dto.workspace_id,
            user_id: dto.user_id,
            role: dto.role,
            joined_at: dto.joined_at,
        }
    }
}

/// Membership check response; `role` is empty when not a member.
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub is_member: bool,
    pub role: String,
}

impl From<MembershipDto> for MembershipResponse {
    fn from(dto: MembershipDto) -> Self {
        Self {
            is_member: dto.is_member,
            role: dto.role,
        }
    }
}

/// Page response
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub id: String,
    pub workspace_id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub icon: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Page> for PageResponse {
    fn from(page: Page) -> Self {
        Self {
            id: page.id.to_string(),
            workspace_id: page.workspace_id.to_string(),
            parent_id: page.parent_id.map(|id| id.to_string()),
            title: page.title,
            icon: page.icon,
            created_by: page.created_by.to_string(),
            created_at: page.created_at.to_rfc3339(),
            updated_at: page.updated_at.to_rfc3339(),
        }
    }
}

/// Block response
#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub id: String,
    pub page_id: String,
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub block_type: String,
    pub content: serde_json::Value,
    pub position: f64,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Block> for BlockResponse {
    fn from(block: Block) -> Self {
        Self {
            id: block.id.to_string(),
            page_id: block.page_id.to_string(),
            parent_id: block.parent_id.map(|id| id.to_string()),
            block_type: block.block_type,
            content: block.content,
            position: block.position,
            created_by: block.created_by.to_string(),
            created_at: block.created_at.to_rfc3339(),
            updated_at: block.updated_at.to_rfc3339(),
        }
    }
}

/// Post response
#[derive(Debug, Serialize)]
pub struct PostResponse {
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

impl From<PostDto> for PostResponse {
    fn from(dto: PostDto) -> Self {
        Self {
            id: dto.id,
            author_id: dto.author_id,
            title: dto.title,
            content: dto.content,
            image_url: dto.image_url,
            like_count: dto.like_count,
            view_count: dto.view_count,
            comment_count: dto.comment_count,
            tags: dto.tags,
            liked: dto.liked,
            viewed: dto.viewed,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

/// Comment response
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            post_id: comment.post_id.to_string(),
            author_id: comment.author_id.to_string(),
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
            updated_at: comment.updated_at.to_rfc3339(),
        }
    }
}

/// Tag response
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.to_string(),
            name: tag.name,
        }
    }
}

/// Conversation response
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub name: Option<String>,
    pub is_group: bool,
    pub created_by: String,
    pub created_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id.to_string(),
            name: conversation.name,
            is_group: conversation.is_group,
            created_by: conversation.created_by.to_string(),
            created_at: conversation.created_at.to_rfc3339(),
        }
    }
}

/// Chat message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<ConversationMessage> for MessageResponse {
    fn from(message: ConversationMessage) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub key: String,
    pub size: usize,
}
