//! ID token verification.
//!
//! The identity provider hands the client a signed ID token after interactive
//! sign-in. Every request presents it as a bearer token; this service checks
//! signature and expiry and turns the claims into an [`AuthUser`].

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::identity_service::AuthUser;
use crate::config::AppConfig;

/// Authentication failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token has an empty subject claim")]
    EmptySubject,
    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// ID token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (user id at the identity provider)
    pub sub: String,
    #[serde(default)]
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Signs and verifies ID tokens with a shared secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: Option<String>,
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience: None,
        }
    }

    /// Require tokens to carry this `aud` claim.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let service = Self::new(&config.id_token_secret);
        match &config.id_token_audience {
            Some(aud) => service.with_audience(aud.clone()),
            None => service,
        }
    }

    /// Issue an ID token for `user`, valid for `ttl`.
    ///
    /// Production tokens come from the identity provider; this is used by
    /// development tooling and tests.
    pub fn issue_id_token(&self, user: &AuthUser, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = IdTokenClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.display_name.clone(),
            picture: user.image_url.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            aud: self.audience.clone(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to encode token: {}", e)))
    }

    /// Verify an ID token (signature, expiry, audience) and return the signed-in user.
    pub fn verify_id_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud.as_str()]),
            None => validation.validate_aud = false,
        }

        let data = decode::<IdTokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid token signature".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(AuthError::EmptySubject);
        }
        debug!("Verified ID token for {}", claims.sub);
        Ok(AuthUser {
            id: claims.sub,
            display_name: claims.name,
            email: claims.email,
            image_url: claims.picture,
        })
    }

    /// Extract bearer token from Authorization header
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        auth_header.strip_prefix("Bearer ").filter(|t| !t.is_empty())
    }
}

/// Shared JWT service for use across the application
pub type SharedJwtService = Arc<JwtService>;
