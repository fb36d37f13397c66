//! Google ID-token verification against the tokeninfo endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::domain::ports::{GoogleIdentity, GoogleTokenVerifier};
use crate::domain::DomainError;

/// Default verification endpoint; overridable for tests.
pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Verifier that delegates signature and expiry checks to Google's
/// published tokeninfo endpoint, then checks the audience locally.
#[derive(Clone)]
pub struct GoogleTokenInfoVerifier {
    http: reqwest::Client,
    endpoint: Url,
    client_id: String,
}

/// Subset of the tokeninfo response the sign-in flow needs.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    email: Option<String>,
    name: Option<String>,
}

impl GoogleTokenInfoVerifier {
    /// Build a verifier for the given OAuth client id.
    pub fn new(endpoint: Url, client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            client_id: client_id.into(),
        }
    }
}

#[async_trait]
impl GoogleTokenVerifier for GoogleTokenInfoVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, DomainError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|err| {
                debug!(error = %err, "tokeninfo request failed");
                DomainError::transport("google token verification unavailable")
            })?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "tokeninfo rejected the token");
            return Err(DomainError::unauthorized("invalid google token"));
        }

        let info: TokenInfo = response.json().await.map_err(|err| {
            debug!(error = %err, "tokeninfo response was not parseable");
            DomainError::transport("google token verification unavailable")
        })?;

        if info.aud != self.client_id {
            return Err(DomainError::unauthorized("google token audience mismatch"));
        }
        let email = info
            .email
            .ok_or_else(|| DomainError::unauthorized("google token carries no email"))?;
        let name = info.name.unwrap_or_else(|| email.clone());
        Ok(GoogleIdentity { name, email })
    }
}
