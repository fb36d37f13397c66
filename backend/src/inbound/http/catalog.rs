//! Catalog API handlers.
//!
//! ```text
//! GET    /api/v1/cars?color=red&seat=5
//! GET    /api/v1/cars/search?search=city
//! GET    /api/v1/cars/price-calculation
//! POST   /api/v1/cars
//! POST   /api/v1/cars/update?id=3
//! DELETE /api/v1/cars?id=3
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::catalog::{
    validate_image_set, CarDraft, CarFilter, CarSearchFilter, CarUpdate, CAR_IMAGE_FIELDS,
};
use crate::domain::envelope::{shape_many, shape_one};
use crate::domain::{DomainError, Envelope, Predicate, QueryFilter};

use super::auth::AuthedUser;
use super::error::respond;
use super::state::HttpState;

/// Create payload: the catalog attributes plus exactly four image references.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CarCreateRequest {
    #[serde(flatten)]
    pub car: CarDraft,
    pub images: Vec<String>,
}

/// List cars matching the supplied filter.
#[utoipa::path(
    get,
    path = "/api/v1/cars",
    responses(
        (status = 200, description = "Matching cars", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["cars"],
    operation_id = "list_cars"
)]
#[get("/cars")]
pub async fn list_cars(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<CarFilter>,
) -> HttpResponse {
    let predicate = Predicate::from_filter(&filter.normalize());
    respond(list_with(&state, &predicate).await)
}

async fn list_with(state: &HttpState, predicate: &Predicate) -> Result<Envelope, DomainError> {
    let cars = state.cars.list(predicate).await?;
    let data = shape_many(&cars, CAR_IMAGE_FIELDS, &state.files)?;
    Ok(Envelope::ok().with_data(data))
}

/// Polymorphic search: text terms fan out over name/engine/transmission,
/// numeric terms over version/mileage/seat/rating/power.
#[utoipa::path(
    get,
    path = "/api/v1/cars/search",
    responses(
        (status = 200, description = "Matching cars", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["cars"],
    operation_id = "search_cars"
)]
#[get("/cars/search")]
pub async fn search_cars(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    query: web::Query<CarSearchFilter>,
) -> HttpResponse {
    let predicate = query.predicate();
    respond(list_with(&state, &predicate).await)
}

/// Per-state GST totals used by the storefront price calculator.
#[utoipa::path(
    get,
    path = "/api/v1/cars/price-calculation",
    responses(
        (status = 200, description = "Per-state GST totals", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["cars"],
    operation_id = "price_calculation"
)]
#[get("/cars/price-calculation")]
pub async fn price_calculation(_user: AuthedUser, state: web::Data<HttpState>) -> HttpResponse {
    let outcome = async {
        let breakdown = state.shops.gst_breakdown().await?;
        let data = shape_many(&breakdown, &[], &state.files)?;
        Ok(Envelope::ok().with_data(data))
    }
    .await;
    respond(outcome)
}

/// Add a car to the catalog.
#[utoipa::path(
    post,
    path = "/api/v1/cars",
    request_body = CarCreateRequest,
    responses(
        (status = 201, description = "Car added", body = Envelope),
        (status = 400, description = "Validation failure", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["cars"],
    operation_id = "add_car"
)]
#[post("/cars")]
pub async fn add_car(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    payload: web::Json<CarCreateRequest>,
) -> HttpResponse {
    let CarCreateRequest { car, images } = payload.into_inner();
    let outcome = async {
        car.validate()?;
        validate_image_set(&images)?;
        let images: [String; 4] = images
            .try_into()
            .map_err(|_| DomainError::invalid_request("please provide 4 image references"))?;
        let created = state.cars.insert(car, images).await?;
        let data = shape_one(&created, CAR_IMAGE_FIELDS, &state.files)?;
        Ok(Envelope::created("car added successfully").with_data(vec![data]))
    }
    .await;
    respond(outcome)
}

/// Bulk-update every car matching the filter; update and reload share one
/// transaction.
#[utoipa::path(
    post,
    path = "/api/v1/cars/update",
    request_body = CarUpdate,
    responses(
        (status = 200, description = "Updated cars", body = Envelope),
        (status = 400, description = "Validation failure", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["cars"],
    operation_id = "update_cars"
)]
#[post("/cars/update")]
pub async fn update_cars(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<CarFilter>,
    payload: web::Json<CarUpdate>,
) -> HttpResponse {
    let update = payload.into_inner().clean_empty();
    let outcome = async {
        update.validate_images()?;
        let predicate = Predicate::from_filter(&filter.normalize());
        let cars = state.cars.update(&predicate, update).await?;
        let data = shape_many(&cars, CAR_IMAGE_FIELDS, &state.files)?;
        Ok(Envelope::ok()
            .describe("cars updated successfully")
            .with_data(data))
    }
    .await;
    respond(outcome)
}

/// Delete every car matching the filter.
#[utoipa::path(
    delete,
    path = "/api/v1/cars",
    responses(
        (status = 200, description = "Deletion count", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["cars"],
    operation_id = "delete_cars"
)]
#[delete("/cars")]
pub async fn delete_cars(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<CarFilter>,
) -> HttpResponse {
    let predicate = Predicate::from_filter(&filter.normalize());
    let outcome = async {
        let removed = state.cars.delete(&predicate).await?;
        Ok(Envelope::ok().describe(format!("{removed} cars deleted")))
    }
    .await;
    respond(outcome)
}
