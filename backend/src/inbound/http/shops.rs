//! Shops API handlers.
//!
//! ```text
//! GET    /api/v1/shops?country=1
//! POST   /api/v1/shops
//! PATCH  /api/v1/shops?id=2
//! DELETE /api/v1/shops?id=2
//! ```

use actix_web::{delete, get, patch, post, web, HttpResponse};

use crate::domain::envelope::shape_many;
use crate::domain::shops::{ShopDraft, ShopFilter};
use crate::domain::{DomainError, Envelope, Predicate, QueryFilter};

use super::auth::AuthedUser;
use super::error::respond;
use super::state::HttpState;

/// Check supplied location ids exist, tagging misses per field.
async fn check_locations(
    state: &HttpState,
    country: Option<i32>,
    state_id: Option<i32>,
    city: Option<i32>,
) -> Result<(), DomainError> {
    if let Some(id) = country {
        if state.shops.find_country(id).await?.is_none() {
            return Err(DomainError::not_found("country does not exist").on_field("country"));
        }
    }
    if let Some(id) = state_id {
        if state.shops.find_state(id).await?.is_none() {
            return Err(DomainError::not_found("state does not exist").on_field("state"));
        }
    }
    if let Some(id) = city {
        if state.shops.find_city(id).await?.is_none() {
            return Err(DomainError::not_found("city does not exist").on_field("city"));
        }
    }
    Ok(())
}

/// List shops matching the supplied filter, joined with their hierarchy.
#[utoipa::path(
    get,
    path = "/api/v1/shops",
    responses(
        (status = 200, description = "Matching shops", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["shops"],
    operation_id = "list_shops"
)]
#[get("/shops")]
pub async fn list_shops(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<ShopFilter>,
) -> HttpResponse {
    let predicate = Predicate::from_filter(&filter.normalize());
    let outcome = async {
        let shops = state.shops.list(&predicate).await?;
        let data = shape_many(&shops, &[], &state.files)?;
        Ok(Envelope::ok().with_data(data))
    }
    .await;
    respond(outcome)
}

/// Add a shop; all three location ids must exist.
#[utoipa::path(
    post,
    path = "/api/v1/shops",
    request_body = ShopDraft,
    responses(
        (status = 201, description = "Shop added", body = Envelope),
        (status = 404, description = "Unknown location id", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["shops"],
    operation_id = "add_shop"
)]
#[post("/shops")]
pub async fn add_shop(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    payload: web::Json<ShopDraft>,
) -> HttpResponse {
    let draft = payload.into_inner();
    let outcome = async {
        check_locations(&state, Some(draft.country), Some(draft.state), Some(draft.city)).await?;
        let details = state.shops.insert(draft).await?;
        let data = shape_many(&[details], &[], &state.files)?;
        Ok(Envelope::created("shop added successfully").with_data(data))
    }
    .await;
    respond(outcome)
}

/// Bulk-update every shop matching the filter; supplied location ids are
/// checked before anything is written.
#[utoipa::path(
    patch,
    path = "/api/v1/shops",
    request_body = ShopFilter,
    responses(
        (status = 200, description = "Updated shops", body = Envelope),
        (status = 404, description = "Unknown location id", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["shops"],
    operation_id = "update_shops"
)]
#[patch("/shops")]
pub async fn update_shops(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<ShopFilter>,
    payload: web::Json<ShopFilter>,
) -> HttpResponse {
    let patch = payload.into_inner();
    let outcome = async {
        check_locations(&state, patch.country, patch.state, patch.city).await?;
        let predicate = Predicate::from_filter(&filter.normalize());
        let (updated, shops) = state.shops.update(&predicate, patch).await?;
        let data = shape_many(&shops, &[], &state.files)?;
        Ok(Envelope::ok()
            .describe(format!("{updated} shops updated"))
            .with_data(data))
    }
    .await;
    respond(outcome)
}

/// Delete every shop matching the filter.
#[utoipa::path(
    delete,
    path = "/api/v1/shops",
    responses(
        (status = 200, description = "Deletion count", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["shops"],
    operation_id = "delete_shops"
)]
#[delete("/shops")]
pub async fn delete_shops(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<ShopFilter>,
) -> HttpResponse {
    let predicate = Predicate::from_filter(&filter.normalize());
    let outcome = async {
        let removed = state.shops.delete(&predicate).await?;
        Ok(Envelope::ok().describe(format!("{removed} shops deleted")))
    }
    .await;
    respond(outcome)
}
