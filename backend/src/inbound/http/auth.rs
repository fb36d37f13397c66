//! Bearer-token extraction for protected endpoints.
//!
//! Handlers declare an [`AuthedUser`] parameter; extraction verifies the
//! token before the handler body runs, so protected handlers never see an
//! unauthenticated request.

use std::future::{ready, Ready};

use actix_web::{web, FromRequest, HttpRequest};

use crate::domain::{Claims, DomainError, TokenKind};

use super::error::{ApiError, ApiResult};
use super::state::HttpState;

/// Claims of a verified access token.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub Claims);

fn bearer_token(req: &HttpRequest) -> ApiResult<&str> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::from(DomainError::unauthorized("missing bearer token").on_field("token"))
        })?;
    let value = header.to_str().map_err(|_| {
        ApiError::from(DomainError::unauthorized("malformed authorization header").on_field("token"))
    })?;
    value.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::from(DomainError::unauthorized("missing bearer token").on_field("token"))
    })
}

fn extract(req: &HttpRequest) -> ApiResult<AuthedUser> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| ApiError::from(DomainError::internal("http state not configured")))?;
    let token = bearer_token(req)?;
    let claims = state.tokens.verify(token)?;
    if claims.kind != TokenKind::Access {
        return Err(ApiError::from(
            DomainError::unauthorized("an access token is required").on_field("token"),
        ));
    }
    Ok(AuthedUser(claims))
}

impl FromRequest for AuthedUser {
    type Error = ApiError;
    type Future = Ready<ApiResult<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(extract(req))
    }
}
