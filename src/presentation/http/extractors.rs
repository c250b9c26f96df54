//! Custom Extractors

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::presentation::middleware::AuthUser;

/// Optional authenticated user: present when the auth middleware decoded a
/// valid credential, absent for anonymous traffic. Never rejects.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthUser>().copied()))
    }
}
