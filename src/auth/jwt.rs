//! JWT Token Handler
//! Mission: Issue and verify signed bearer tokens

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;
use uuid::Uuid;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expiration_hours: 24, // 24-hour tokens by default
        }
    }

    /// Create a handler with a custom validity window.
    pub fn with_expiration(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// Issue a signed token for an authenticated user.
    pub fn issue(&self, user_id: &Uuid, username: &str) -> Result<String> {
        let now = Utc::now();
        let expiration = now + chrono::Duration::hours(self.expiration_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        debug!(
            "Issuing JWT for user {} ({}), expires in {}h",
            username, user_id, self.expiration_hours
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign JWT")
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// Any failure is a hard reject; there is no partial-trust path.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0; // exact expiry, no grace window

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed,
        })?;

        debug!("Validated JWT for user {}", decoded.claims.username);

        Ok(decoded.claims)
    }
}

/// Token verification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Token could not be decoded or parsed
    Malformed,
    /// Signature does not match the signing secret
    BadSignature,
    /// Token is past its expiry timestamp
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::BadSignature => write!(f, "bad token signature"),
            TokenError::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-12345";

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let handler = JwtHandler::new(TEST_SECRET.to_string());
        let user_id = Uuid::new_v4();

        let token = handler.issue(&user_id, "testuser").unwrap();
        assert!(!token.is_empty());

        let claims = handler.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "testuser");
        assert!(claims.iat <= Utc::now().timestamp() as usize);
        assert_eq!(claims.exp, claims.iat + 24 * 3600);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let handler = JwtHandler::new(TEST_SECRET.to_string());

        assert_eq!(
            handler.verify("invalid.token.here").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(handler.verify("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_different_secrets_reject() {
        let issuer = JwtHandler::new("secret1".to_string());
        let verifier = JwtHandler::new("secret2".to_string());

        let token = issuer.issue(&Uuid::new_v4(), "testuser").unwrap();

        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let handler = JwtHandler::with_expiration(TEST_SECRET.to_string(), -1);

        let token = handler.issue(&Uuid::new_v4(), "testuser").unwrap();

        assert_eq!(handler.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let handler = JwtHandler::new(TEST_SECRET.to_string());
        let token = handler.issue(&Uuid::new_v4(), "testuser").unwrap();

        // Flip the last character of the signature segment
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(
            handler.verify(&tampered).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_tampered_payload_never_accepted() {
        let handler = JwtHandler::new(TEST_SECRET.to_string());
        let token = handler.issue(&Uuid::new_v4(), "testuser").unwrap();

        // Corrupt one character inside the payload segment
        let payload_start = token.find('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[payload_start] = if bytes[payload_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        let err = handler.verify(&tampered).unwrap_err();
        assert!(matches!(
            err,
            TokenError::BadSignature | TokenError::Malformed
        ));
    }
}
