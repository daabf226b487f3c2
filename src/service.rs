//! Auth Flow Controller
//!
//! Orchestrates login, refresh, and logout over the password hasher,
//! token keys, and credential store. The server keeps no session state:
//! a session is exactly a valid refresh token in the client's cookie.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::User;
use crate::password::PasswordHasher;
use crate::store::{StoreError, UserStore};
use crate::tokens::TokenKeys;

use std::sync::Arc;
use std::time::Duration;

/// Tokens minted by a successful login
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    keys: TokenKeys,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, config: AuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            hasher: PasswordHasher::new(&config)?,
            keys: TokenKeys::from_config(&config),
            store,
            config,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Token keys, for the authorization middleware
    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    /// Password hasher, for the user-management collaborator's rehash path
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    // ============================================
    // Login
    // ============================================

    /// Authenticate credentials and mint an access/refresh token pair
    ///
    /// Unknown user, inactive user, and wrong password are indistinguishable
    /// from the caller's side.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let user = self
            .find_user(username)
            .await?
            .filter(|user| user.active)
            .ok_or(AuthError::Unauthorized)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::debug!(username = %user.username, "Login rejected: password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let access_token = self.keys.issue_access(&user.username, &user.roles)?;
        let refresh_token = self.keys.issue_refresh(&user.username)?;

        tracing::info!(username = %user.username, "User logged in");

        Ok(IssuedSession {
            access_token,
            refresh_token,
        })
    }

    // ============================================
    // Refresh
    // ============================================

    /// Exchange a valid refresh token for a new access token
    ///
    /// Roles are re-resolved from the store, not copied from login time, so
    /// permission edits become effective within one refresh cycle. The
    /// refresh token itself is not rotated; it rides the same cookie until
    /// natural expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.keys.verify_refresh(refresh_token).map_err(|err| {
            tracing::debug!(error = %err, "Refresh rejected");
            AuthError::Forbidden
        })?;

        let user = self
            .find_user(&claims.sub)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        self.keys.issue_access(&user.username, &user.roles)
    }

    // ============================================
    // Store Access
    // ============================================

    /// Store lookup with a bounded timeout
    ///
    /// An unresponsive store surfaces as `Unavailable` instead of hanging
    /// the request worker.
    async fn find_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        let timeout = Duration::from_millis(self.config.store_timeout_ms);

        match tokio::time::timeout(timeout, self.store.find_by_username(username)).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => {
                tracing::warn!(username = %username, "Credential store lookup timed out");
                Err(AuthError::Unavailable)
            }
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => AuthError::Unavailable,
            StoreError::Internal(msg) => AuthError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::models::Role;
    use crate::store::memory::{MemoryUserStore, StalledUserStore};

    async fn service_with_user(roles: Vec<Role>, active: bool) -> (AuthService, Arc<MemoryUserStore>) {
        let config = test_config();
        let hasher = PasswordHasher::new(&config).unwrap();
        let store = Arc::new(MemoryUserStore::new());
        store
            .insert("alice", &hasher.hash("correct horse").unwrap(), roles, active)
            .await;
        let service = AuthService::new(store.clone(), config).unwrap();
        (service, store)
    }

    #[tokio::test]
    async fn login_issues_verifiable_tokens() {
        let (service, _) = service_with_user(vec![Role::Editor], true).await;

        let session = service.login("alice", "correct horse").await.unwrap();

        let access = service.keys().verify_access(&session.access_token).unwrap();
        assert_eq!(access.sub, "alice");
        assert_eq!(access.roles, vec![Role::Editor]);

        let refresh = service.keys().verify_refresh(&session.refresh_token).unwrap();
        assert_eq!(refresh.sub, "alice");
    }

    #[tokio::test]
    async fn login_wrong_password_is_unauthorized() {
        let (service, _) = service_with_user(vec![Role::User], true).await;

        assert_eq!(
            service.login("alice", "wrong").await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn unknown_and_inactive_users_are_indistinguishable() {
        let (service, _) = service_with_user(vec![Role::User], false).await;

        let inactive = service.login("alice", "correct horse").await.unwrap_err();
        let missing = service.login("nobody", "correct horse").await.unwrap_err();

        assert_eq!(inactive, missing);
        assert_eq!(inactive, AuthError::Unauthorized);
    }

    #[tokio::test]
    async fn refresh_picks_up_current_roles() {
        let (service, store) = service_with_user(vec![Role::User], true).await;

        let session = service.login("alice", "correct horse").await.unwrap();
        store.set_roles("alice", vec![Role::User, Role::Admin]).await;

        let access_token = service.refresh(&session.refresh_token).await.unwrap();
        let claims = service.keys().verify_access(&access_token).unwrap();

        // The new token reflects the store, not the roles at login time.
        assert_eq!(claims.roles, vec![Role::User, Role::Admin]);
    }

    #[tokio::test]
    async fn refresh_with_garbage_token_is_forbidden() {
        let (service, _) = service_with_user(vec![Role::User], true).await;

        assert_eq!(
            service.refresh("garbage").await.unwrap_err(),
            AuthError::Forbidden
        );
    }

    #[tokio::test]
    async fn refresh_with_access_token_is_forbidden() {
        // Key separation: an access token must not pass as a refresh token.
        let (service, _) = service_with_user(vec![Role::User], true).await;
        let session = service.login("alice", "correct horse").await.unwrap();

        assert_eq!(
            service.refresh(&session.access_token).await.unwrap_err(),
            AuthError::Forbidden
        );
    }

    #[tokio::test]
    async fn refresh_after_user_removed_is_unauthorized() {
        let (service, store) = service_with_user(vec![Role::User], true).await;
        let session = service.login("alice", "correct horse").await.unwrap();

        store.remove("alice").await;

        assert_eq!(
            service.refresh(&session.refresh_token).await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn stalled_store_surfaces_unavailable() {
        let config = AuthConfig {
            store_timeout_ms: 50,
            ..test_config()
        };
        let service = AuthService::new(Arc::new(StalledUserStore), config).unwrap();

        assert_eq!(
            service.login("alice", "pw").await.unwrap_err(),
            AuthError::Unavailable
        );
    }
}
