//! Token Issuer and Verifier
//!
//! Signed, time-bounded JWT access and refresh tokens. Access and refresh
//! tokens are signed with distinct secrets so that a leaked refresh secret
//! cannot forge access tokens and vice versa.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{AccessTokenClaims, RefreshTokenClaims, Role};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header,
    Validation};

/// Token verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("token malformed")]
    Malformed,
}

/// Signing and verification keys for both token kinds
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenKeys {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Issue an access token carrying the identity and its current roles
    pub fn issue_access(&self, username: &str, roles: &[Role]) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: username.to_string(),
            roles: roles.to_vec(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_ttl)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.access_encoding).map_err(|err| {
            tracing::error!("Failed to sign access token: {:?}", err);
            AuthError::Internal
        })
    }

    /// Issue a refresh token carrying only the identity
    pub fn issue_refresh(&self, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = RefreshTokenClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_ttl)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.refresh_encoding).map_err(|err| {
            tracing::error!("Failed to sign refresh token: {:?}", err);
            AuthError::Internal
        })
    }

    /// Validate an access token's signature and expiry, returning its claims
    pub fn verify_access(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        decode::<AccessTokenClaims>(token, &self.access_decoding, &validation())
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Validate a refresh token's signature and expiry, returning its claims
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshTokenClaims, TokenError> {
        decode::<RefreshTokenClaims>(token, &self.refresh_decoding, &validation())
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::default();
    // A token strictly past its expiry is rejected outright.
    validation.leeway = 0;
    validation
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => TokenError::Malformed,
        _ => TokenError::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn keys() -> TokenKeys {
        TokenKeys::from_config(&test_config())
    }

    #[test]
    fn access_token_round_trip() {
        let keys = keys();
        let token = keys.issue_access("alice", &[Role::Editor]).unwrap();
        let claims = keys.verify_access(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.roles, vec![Role::Editor]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_round_trip_carries_no_roles() {
        let keys = keys();
        let token = keys.issue_refresh("alice").unwrap();
        let claims = keys.verify_refresh(&token).unwrap();

        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn key_separation_rejects_cross_verification() {
        let keys = keys();
        let refresh = keys.issue_refresh("alice").unwrap();
        let access = keys.issue_access("alice", &[Role::User]).unwrap();

        assert!(keys.verify_access(&refresh).is_err());
        assert_eq!(keys.verify_refresh(&access).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let config = crate::config::AuthConfig {
            access_ttl: -10,
            ..test_config()
        };
        let keys = TokenKeys::from_config(&config);
        let token = keys.issue_access("alice", &[Role::User]).unwrap();

        assert_eq!(keys.verify_access(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert_eq!(
            keys().verify_access("not-a-token").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn tampered_token_is_invalid() {
        let keys = keys();
        let token = keys.issue_access("alice", &[Role::User]).unwrap();
        // Flip the signature segment.
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let tampered = parts.join(".");

        assert_eq!(keys.verify_access(&tampered).unwrap_err(), TokenError::Invalid);
    }
}
