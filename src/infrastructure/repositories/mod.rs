//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits.
//!
//! Each repository wraps one entity's data access: row structs mirror the
//! table schema, constraint violations are translated into domain-level
//! `Conflict`/`NotFound` errors, and multi-statement invariants (workspace +
//! admin member, follow edge + counters, like/comment rows + post counters)
//! run inside a single transaction on the shared pool.

pub mod block_repository;
pub mod comment_repository;
pub mod conversation_repository;
pub mod follow_repository;
pub mod like_repository;
pub mod member_repository;
pub mod page_repository;
pub mod post_repository;
pub mod session_repository;
pub mod tag_repository;
pub mod user_repository;
pub mod view_repository;
pub mod workspace_repository;

pub use block_repository::PgBlockRepository;
pub use comment_repository::PgCommentRepository;
pub use conversation_repository::PgConversationRepository;
pub use follow_repository::PgFollowRepository;
pub use like_repository::PgLikeRepository;
pub use member_repository::PgMemberRepository;
pub use page_repository::PgPageRepository;
pub use post_repository::PgPostRepository;
pub use session_repository::PgSessionRepository;
pub use tag_repository::PgTagRepository;
pub use user_repository::PgUserRepository;
pub use view_repository::PgViewRepository;
pub use workspace_repository::PgWorkspaceRepository;
