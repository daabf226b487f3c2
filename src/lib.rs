//! CrewNotes Authentication Service
//!
//! Credential and session authority for the CrewNotes application:
//! - Username/password login with Argon2id hashing
//! - Short-lived JWT access tokens, longer-lived refresh tokens
//! - Silent access-token renewal from an HttpOnly session cookie
//! - Role-based authorization middleware for protected routes
//! - Login rate limiting with audit logging
//!
//! Sessions are stateless: validity is determined purely by token
//! signature and expiry, with no server-side session table.
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `ACCESS_TOKEN_SECRET` - Secret for signing access tokens (required, min 32 chars)
//! - `REFRESH_TOKEN_SECRET` - Secret for signing refresh tokens (required, distinct)
//! - `ACCESS_TOKEN_TTL` - Access token lifetime in seconds (default: 600)
//! - `REFRESH_TOKEN_TTL` - Refresh token lifetime in seconds (default: 604800)
//! - `LOGIN_RATE_WINDOW` / `LOGIN_RATE_MAX` - Login limiter window and capacity (default: 60 / 5)
//! - `STORE_TIMEOUT_MS` - Credential store lookup timeout (default: 5000)
//! - `DATABASE_URL` - PostgreSQL connection string (required)
//!
//! # Usage
//!
//! ```rust,ignore
//! use crewnotes_auth::{create_routes, AppState, AuthConfig, AuthService, PgUserStore};
//!
//! let config = AuthConfig::from_env();
//! config.validate()?;
//!
//! let store = Arc::new(PgUserStore::new(pool));
//! let auth = Arc::new(AuthService::new(store, config)?);
//! let app = create_routes(state);
//! ```

pub mod audit;
pub mod config;
pub mod cookie;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limit;
pub mod service;
pub mod store;
pub mod tokens;

// Re-export commonly used types
pub use audit::AuditLog;
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{AuthUser, ClientInfo};
pub use handlers::{create_routes, AppState};
pub use models::{AccessTokenClaims, AccessTokenResponse, LoginRequest, RefreshTokenClaims, Role,
    User};
pub use password::PasswordHasher;
pub use rate_limit::LoginRateLimiter;
pub use service::{AuthService, IssuedSession};
pub use store::{PgUserStore, StoreError, UserStore};
pub use tokens::{TokenError, TokenKeys};
