//! User Session entity and repository trait.
//!
//! Maps to the `user_sessions` table. Used for refresh token management:
//! only the SHA-256 hash of a refresh token is ever stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a refresh-token session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// UUID primary key
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// SHA-256 hash of the refresh token (never the raw token)
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Revocation timestamp, set on logout
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: Uuid, refresh_token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            refresh_token_hash,
            expires_at,
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    /// A session is active while unexpired and unrevoked.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Repository trait for Session data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session.
    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    /// Look up a session by refresh-token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// Replace the stored hash on rotation.
    async fn update_token_hash(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Revoke a session.
    async fn revoke(&self, id: Uuid) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fresh_session_is_active() {
        let session = Session::new(Uuid::now_v7(), "hash".into(), Utc::now() + Duration::days(7));
        assert!(session.is_active());
    }

    #[test]
    fn expired_session_is_inactive() {
        let session = Session::new(Uuid::now_v7(), "hash".into(), Utc::now() - Duration::minutes(1));
        assert!(!session.is_active());
    }

    #[test]
    fn revoked_session_is_inactive() {
        let mut session =
            Session::new(Uuid::now_v7(), "hash".into(), Utc::now() + Duration::days(7));
        session.revoked_at = Some(Utc::now());
        assert!(!session.is_active());
    }
}
