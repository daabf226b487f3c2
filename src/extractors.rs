//! Request Extractors
//!
//! Axum extractors for the authenticated identity and client metadata.

use crate::error::AuthError;
use crate::models::{AccessTokenClaims, Role};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

/// Authenticated identity extracted from verified access-token claims
///
/// Populated by the authorization middleware; handlers reading this are
/// guaranteed a verified token without re-touching the verifier.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn from_claims(claims: &AccessTokenClaims) -> Self {
        Self {
            username: claims.sub.clone(),
            roles: claims.roles.clone(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessTokenClaims>()
            .map(AuthUser::from_claims)
            .ok_or(AuthError::Unauthorized)
    }
}

/// Client network identity for rate limiting and audit logging
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: Option<String>,
}

impl ClientInfo {
    /// Identity string used as the rate-limiter key
    pub fn identity(&self) -> String {
        self.ip.clone().unwrap_or_else(|| "unknown".to_string())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo {
            ip: client_ip(&parts.headers),
        })
    }
}

/// First forwarded hop, falling back to the reverse proxy's real-ip header
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .or_else(|| {
            headers
                .get("X-Real-IP")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}
