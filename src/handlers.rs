//! Authentication HTTP Handlers
//!
//! REST endpoints for the session lifecycle: login, silent refresh, and
//! logout.

use crate::audit::AuditLog;
use crate::cookie::{build_clear_cookie, build_session_cookie, read_session_cookie};
use crate::error::AuthError;
use crate::extractors::ClientInfo;
use crate::models::{AccessTokenResponse, LoginRequest, MessageResponse};
use crate::rate_limit::{limit_login, LoginRateLimiter};
use crate::service::AuthService;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub limiter: Arc<LoginRateLimiter>,
    pub audit: Arc<AuditLog>,
}

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
///
/// The rate limiter guards only the login entry point; refresh and logout
/// are cheap and carry no guessable secret.
pub fn create_routes(state: AppState) -> Router {
    let limited_login = Router::new()
        .route("/auth", post(login))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            limit_login,
        ));

    Router::new()
        .merge(limited_login)
        .route("/auth/refresh", get(refresh))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

// ============================================
// Login
// ============================================

/// POST /auth
///
/// Authenticate credentials; answer with an access token in the body and
/// the refresh token in the session cookie. The access token never rides
/// a cookie.
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    req.validate()
        .map_err(|err| AuthError::BadRequest(err.to_string()))?;

    let session = state
        .auth
        .login(&req.username, &req.password)
        .await
        .map_err(|err| {
            if err == AuthError::Unauthorized {
                tracing::info!(client = %client.identity(), "Login rejected");
            }
            err
        })?;

    let cookie = build_session_cookie(&session.refresh_token, state.auth.config().refresh_ttl)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AccessTokenResponse {
            access_token: session.access_token,
        }),
    )
        .into_response())
}

// ============================================
// Refresh
// ============================================

/// GET /auth/refresh
///
/// Mint a new access token from the session cookie. The cookie itself is
/// left untouched; it rides until natural expiry.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccessTokenResponse>, AuthError> {
    let refresh_token = read_session_cookie(&headers).ok_or(AuthError::Unauthorized)?;

    let access_token = state.auth.refresh(&refresh_token).await?;

    Ok(Json(AccessTokenResponse { access_token }))
}

// ============================================
// Logout
// ============================================

/// POST /auth/logout
///
/// Idempotent: without a session cookie there is nothing to clear and the
/// response is 204. With one, the cookie is cleared using the same
/// attributes it was created with.
pub async fn logout(headers: HeaderMap) -> Response {
    if read_session_cookie(&headers).is_none() {
        return StatusCode::NO_CONTENT.into_response();
    }

    (
        [(header::SET_COOKIE, build_clear_cookie())],
        Json(MessageResponse::new("Cookie cleared")),
    )
        .into_response()
}

// ============================================
// Test Support
// ============================================
