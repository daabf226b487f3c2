//! Authorization Middleware
//!
//! Gate placed in front of protected routes. Verifies the bearer access
//! token and injects the claims into the request extensions; no store
//! lookup happens here, so role claims are trusted until the next refresh.

use crate::error::AuthError;
use crate::handlers::AppState;
use crate::models::{AccessTokenClaims, Role};
use crate::tokens::TokenKeys;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::future::Future;
use std::pin::Pin;

/// Extract and verify the bearer access token
///
/// Missing credentials are `Unauthorized`; credentials that fail
/// verification are `Forbidden`, signalling the client to refresh.
fn authenticate(keys: &TokenKeys, headers: &HeaderMap) -> Result<AccessTokenClaims, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Unauthorized)?;

    keys.verify_access(token).map_err(|err| {
        tracing::debug!(error = %err, "Access token rejected");
        AuthError::Forbidden
    })
}

/// Require an authenticated user
///
/// Stores the verified claims in request extensions for the
/// [`crate::extractors::AuthUser`] extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authenticate(state.auth.keys(), req.headers())?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Require an authenticated user holding a specific role
pub fn require_role(
    required: Role,
) -> impl Fn(
    State<AppState>,
    Request,
    Next,
) -> Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>
       + Clone
       + Send {
    move |State(state): State<AppState>, mut req: Request, next: Next| {
        Box::pin(async move {
            let claims = authenticate(state.auth.keys(), req.headers())?;

            if !claims.roles.contains(&required) {
                return Err(AuthError::Forbidden);
            }

            req.extensions_mut().insert(claims);

            Ok(next.run(req).await)
        })
    }
}
