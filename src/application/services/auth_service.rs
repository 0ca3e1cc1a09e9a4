//! Authentication Service
//!
//! Verifies handshake bearer tokens and resolves them to local users.
//! Users are provisioned elsewhere; an unknown subject is rejected, never
//! created.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthSettings;
use crate::domain::{User, UserRepository};
use crate::shared::error::AppError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (external identity)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Token issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User not found")]
    UnknownUser,

    #[error("Invalid verification key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(e) => e,
            AuthError::InvalidKey(msg) => AppError::Internal(msg),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

/// Cryptographic token check, returning the verified subject.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// `jsonwebtoken`-backed verifier (HS256 shared secret or RS256 public key)
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Build a verifier from auth settings.
    ///
    /// The RS256 public key wins when both key sources are configured.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, AuthError> {
        let public_key = settings
            .jwt_public_key
            .as_deref()
            .filter(|k| !k.trim().is_empty());

        let (key, algorithm) = match (public_key, settings.jwt_secret.as_deref()) {
            (Some(pem), _) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AuthError::InvalidKey(e.to_string()))?,
                Algorithm::RS256,
            ),
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => {
                return Err(AuthError::InvalidKey("no verification key configured".into()))
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = settings.leeway_secs;
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let subject = token_data.claims.sub;
        if subject.is_empty() {
            return Err(AuthError::InvalidToken("empty subject".into()));
        }
        Ok(subject)
    }
}

/// Resolves a handshake credential to a provisioned local user.
pub struct ConnectionAuthenticator {
    verifier: Arc<dyn TokenVerifier>,
    users: Arc<dyn UserRepository>,
}

impl ConnectionAuthenticator {
    pub fn new(verifier: Arc<dyn TokenVerifier>, users: Arc<dyn UserRepository>) -> Self {
        Self { verifier, users }
    }

    /// Verify the credential and look up the user it names.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let subject = self.verifier.verify(token).await?;

        self.users
            .find_by_external_id(&subject)
            .await?
            .ok_or(AuthError::UnknownUser)
    }
}
