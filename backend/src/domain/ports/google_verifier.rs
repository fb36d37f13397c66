//! Port abstraction for Google ID-token verification.
//!
//! Provider trust verification is delegated to Google's published endpoint;
//! the domain only consumes "token → verified identity or failure".

use async_trait::async_trait;

use crate::domain::DomainError;

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub name: String,
    pub email: String,
}

#[async_trait]
pub trait GoogleTokenVerifier: Send + Sync {
    /// Verify the token and check its audience against the configured
    /// client id. Expired or foreign-audience tokens are domain errors.
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, DomainError>;
}
