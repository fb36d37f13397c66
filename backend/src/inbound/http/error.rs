//! HTTP error mapping.
//!
//! Keep the domain free of transport concerns by translating [`DomainError`]
//! and token failures into Actix responses here. The body is always the
//! standard [`Envelope`] and the transport status mirrors
//! `envelope.status_code`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{DomainError, Envelope, TokenError};

/// Failure raised before or during a handler, rendered as an envelope.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ApiError(DomainError);

impl ApiError {
    #[must_use]
    pub fn domain(&self) -> &DomainError {
        &self.0
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        Self(DomainError::unauthorized(error.to_string()).on_field("token"))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        let envelope = Envelope::failure(&self.0);
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let envelope = Envelope::failure(&self.0);
        if envelope.status_code >= 500 {
            error!(message = self.0.message(), "request failed");
        }
        HttpResponse::build(self.status_code()).json(envelope)
    }
}

/// Convenient result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Render an envelope with its own status code on the transport layer.
#[must_use]
pub fn envelope_response(envelope: &Envelope) -> HttpResponse {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(envelope)
}

/// Collapse a fallible envelope computation into a response.
#[must_use]
pub fn respond(outcome: Result<Envelope, DomainError>) -> HttpResponse {
    let envelope = match outcome {
        Ok(envelope) => envelope,
        Err(error) => Envelope::failure(&error),
    };
    envelope_response(&envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn token_failures_render_unauthorized_envelopes() {
        let error = ApiError::from(TokenError::ExpiredToken);
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    fn business_failures_mirror_their_envelope_status() {
        let error = ApiError::from(DomainError::not_found("no such car"));
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
