//! Authentication Middleware
//! Mission: Gate protected endpoints behind bearer-token verification

use crate::auth::jwt::JwtHandler;
use crate::auth::models::Claims;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Auth middleware that validates bearer tokens on protected routes.
///
/// A missing or malformed Authorization header is rejected before any
/// verification is attempted; verification failures are rejected without
/// detail. On success the claims are attached to the request extensions for
/// downstream handlers. Performs no database access.
pub async fn require_auth(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(parse_bearer)
        .ok_or(AuthError::MissingCredential)?
        .to_string();

    let claims = jwt_handler.verify(&token).map_err(|e| {
        debug!("Token verification failed: {}", e);
        AuthError::InvalidToken
    })?;

    debug!("Token verified for user {}", claims.username);

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extract the token from an Authorization header value.
///
/// The `Bearer` scheme keyword is case-insensitive and must be separated
/// from the token by exactly one space.
fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

/// Extract claims from request (use after auth middleware)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

/// Auth middleware rejection
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No usable bearer credential in the request
    MissingCredential,
    /// Credential failed signature or expiry checks
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredential => (StatusCode::FORBIDDEN, "No token provided."),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token."),
        };

        (status, Json(json!({ "auth": false, "message": message }))).into_response()
    }
}
