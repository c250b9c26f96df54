//! Request DTOs
//!
//! Data structures for API request bodies and common query parameters.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Update profile request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: Option<String>,

    #[validate(length(max = 64, message = "Display name must be at most 64 characters"))]
    pub display_name: Option<String>,

    pub avatar_url: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
}

/// Create workspace request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkspaceRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Update workspace request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorkspaceRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Add member request; role must be admin, editor or viewer.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: String,
}

/// Update member role request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: String,
}

/// Create page request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePageRequest {
    pub workspace_id: Uuid,
    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub icon: Option<String>,
}

/// Update page request. A present-but-null `parent_id` detaches the page
/// to the workspace root; an absent field leaves the parent alone.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePageRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub icon: Option<String>,

    #[serde(default, deserialize_with = "present_as_some")]
    pub parent_id: Option<Option<Uuid>>,
}

/// Distinguishes an absent field (outer `None`) from an explicit `null`
/// (`Some(None)`), which plain `Option<Option<T>>` cannot.
fn present_as_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Create block request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlockRequest {
    pub page_id: Uuid,
    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 50, message = "Block type must be 1-50 characters"))]
    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default)]
    pub content: serde_json::Value,
}

/// Update block request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBlockRequest {
    #[validate(length(min = 1, max = 50, message = "Block type must be 1-50 characters"))]
    #[serde(rename = "type")]
    pub block_type: Option<String>,

    pub content: Option<serde_json::Value>,
}

/// Move block request: neighbours the block should land between.
#[derive(Debug, Deserialize, Default)]
pub struct MoveBlockRequest {
    pub after_id: Option<Uuid>,
    pub before_id: Option<Uuid>,
}

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    pub image_url: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update post request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub content: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Content must be 1-2000 characters"))]
    pub content: String,
}

/// Update comment request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Content must be 1-2000 characters"))]
    pub content: String,
}

/// Create conversation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    pub participant_ids: Vec<Uuid>,
}

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,
}

/// Offset/limit pagination query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Requested page, 1-based.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, clamped to 1..=100.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    /// Row offset derived from page and limit.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(None, None, 20, 0; "defaults")]
    #[test_case(Some(3), Some(10), 10, 20; "third page of ten")]
    #[test_case(Some(0), Some(500), 100, 0; "clamped page and limit")]
    #[test_case(Some(-2), Some(-5), 1, 0; "negative input")]
    fn pagination_math(page: Option<i64>, limit: Option<i64>, want_limit: i64, want_offset: i64) {
        let params = PaginationParams { page, limit };
        assert_eq!(params.limit(), want_limit);
        assert_eq!(params.offset(), want_offset);
    }
}
