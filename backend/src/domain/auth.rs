//! Token issuance and verification.
//!
//! Access and refresh tokens are HS256 JWTs carrying a small identity claim
//! set. The authority is constructed from an explicit [`AuthConfig`] rather
//! than reading ambient process state, and expiry is checked against a
//! caller-supplied clock with zero leeway so a token is invalid the second
//! after its embedded expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Immutable token configuration threaded in at construction time.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub access_ttl_secs: i64,
    /// Refresh validity = access validity + this extension.
    pub refresh_extension_secs: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(secret: impl Into<String>, access_ttl_secs: i64, refresh_extension_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_secs,
            refresh_extension_secs,
        }
    }
}

/// Which validity window a token was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Identity claim set embedded in every token.
///
/// ## Invariants
/// - `exp > iat`; refresh tokens carry the longer window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated account.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

/// Authentication failures surfaced before business logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Signature or claim shape did not validate.
    #[error("failed to decode token")]
    InvalidToken,
    /// The embedded expiry has passed.
    #[error("token expired, please log in again")]
    ExpiredToken,
}

/// Access/refresh token pair handed out by login-like operations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies signed, time-limited tokens.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_extension: Duration,
}

impl TokenAuthority {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_ttl_secs),
            refresh_extension: Duration::seconds(config.refresh_extension_secs),
        }
    }

    /// Issue a token for the given identity and kind.
    pub fn issue(
        &self,
        username: &str,
        email: &str,
        kind: TokenKind,
    ) -> Result<String, DomainError> {
        self.issue_at(Utc::now(), username, email, kind)
    }

    /// Issue with an explicit clock; tests drive this directly.
    pub fn issue_at(
        &self,
        now: DateTime<Utc>,
        username: &str,
        email: &str,
        kind: TokenKind,
    ) -> Result<String, DomainError> {
        let validity = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.access_ttl + self.refresh_extension,
        };
        let claims = Claims {
            sub: username.to_owned(),
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
            kind,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| DomainError::internal(format!("token encoding failed: {err}")))
    }

    /// Issue the access + refresh pair returned by login-like operations.
    pub fn issue_pair(&self, username: &str, email: &str) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            access_token: self.issue(username, email, TokenKind::Access)?,
            refresh_token: self.issue(username, email, TokenKind::Refresh)?,
        })
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(Utc::now(), token)
    }

    /// Verify with an explicit clock. Signature failures map to
    /// [`TokenError::InvalidToken`]; a valid signature with a passed expiry
    /// maps to [`TokenError::ExpiredToken`].
    pub fn verify_at(&self, now: DateTime<Utc>, token: &str) -> Result<Claims, TokenError> {
        // Expiry is checked by hand against the supplied clock, with zero
        // leeway, so the library's wall-clock check is disabled.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::InvalidToken)?;
        if now.timestamp() > data.claims.exp {
            return Err(TokenError::ExpiredToken);
        }
        Ok(data.claims)
    }
}
