//! Sales API handlers.
//!
//! ```text
//! GET    /api/v1/sales?payment_status=pending
//! GET    /api/v1/sales/graph
//! POST   /api/v1/sales
//! PATCH  /api/v1/sales?id=3
//! DELETE /api/v1/sales?id=3
//! ```

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use serde_json::Value;

use crate::domain::catalog::CAR_IMAGE_FIELDS;
use crate::domain::envelope::shape_one;
use crate::domain::ports::NewOrder;
use crate::domain::sales::{OrderDetails, OrderDraft, OrderFilter, OrderUpdate};
use crate::domain::{DomainError, Envelope, FileUrlResolver, Predicate, QueryFilter};

use super::auth::AuthedUser;
use super::error::respond;
use super::state::HttpState;

/// Shape a joined order; the embedded car's image slots get absolute URLs.
fn shape_order(
    details: &OrderDetails,
    resolver: &FileUrlResolver,
) -> Result<Value, DomainError> {
    let mut value = serde_json::to_value(details)
        .map_err(|err| DomainError::internal(format!("order serialization failed: {err}")))?;
    if let Some(car) = &details.car {
        value["car"] = shape_one(car, CAR_IMAGE_FIELDS, resolver)?;
    }
    Ok(value)
}

fn shape_orders(
    orders: &[OrderDetails],
    resolver: &FileUrlResolver,
) -> Result<Vec<Value>, DomainError> {
    orders
        .iter()
        .map(|details| shape_order(details, resolver))
        .collect()
}

/// Check the referenced car and customer exist, tagging misses per field.
async fn check_references(
    state: &HttpState,
    car: Option<i32>,
    customer: Option<i32>,
) -> Result<(), DomainError> {
    if let Some(id) = car {
        if state.cars.find(id).await?.is_none() {
            return Err(DomainError::not_found("car does not exist").on_field("car"));
        }
    }
    if let Some(id) = customer {
        if state.accounts.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found("customer does not exist").on_field("customer"));
        }
    }
    Ok(())
}

/// List sales matching the supplied filter, joined with car and customer.
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    responses(
        (status = 200, description = "Matching sales", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["sales"],
    operation_id = "list_sales"
)]
#[get("/sales")]
pub async fn list_sales(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<OrderFilter>,
) -> HttpResponse {
    let predicate = Predicate::from_filter(&filter.normalize());
    let outcome = async {
        let orders = state.orders.list(&predicate).await?;
        let data = shape_orders(&orders, &state.files)?;
        Ok(Envelope::ok().with_data(data))
    }
    .await;
    respond(outcome)
}

/// Per-car monthly sales counts for the dashboard graph.
#[utoipa::path(
    get,
    path = "/api/v1/sales/graph",
    responses(
        (status = 200, description = "Monthly series per car", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["sales"],
    operation_id = "sales_graph"
)]
#[get("/sales/graph")]
pub async fn sales_graph(_user: AuthedUser, state: web::Data<HttpState>) -> HttpResponse {
    let outcome = async {
        let series = state.orders.monthly_sales().await?;
        let data = series
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| DomainError::internal(format!("series serialization failed: {err}")))?;
        Ok(Envelope::ok().with_data(data))
    }
    .await;
    respond(outcome)
}

/// Record a sale; the car and customer must exist.
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body = OrderDraft,
    responses(
        (status = 201, description = "Sale recorded", body = Envelope),
        (status = 404, description = "Unknown car or customer", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["sales"],
    operation_id = "add_sale"
)]
#[post("/sales")]
pub async fn add_sale(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    payload: web::Json<OrderDraft>,
) -> HttpResponse {
    let draft = payload.into_inner();
    let outcome = async {
        check_references(&state, Some(draft.car), Some(draft.customer)).await?;
        let order = NewOrder {
            car_id: draft.car,
            customer_id: draft.customer,
            payment_method: draft.payment_method,
            payment_status: draft.payment_status,
            order_date: draft.order_date.unwrap_or_else(Utc::now),
        };
        let details = state.orders.insert(order).await?;
        let data = shape_order(&details, &state.files)?;
        Ok(Envelope::created("sale recorded successfully").with_data(vec![data]))
    }
    .await;
    respond(outcome)
}

/// Bulk-update every sale matching the filter.
#[utoipa::path(
    patch,
    path = "/api/v1/sales",
    request_body = OrderUpdate,
    responses(
        (status = 200, description = "Updated sales", body = Envelope),
        (status = 404, description = "Unknown car or customer", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["sales"],
    operation_id = "update_sales"
)]
#[patch("/sales")]
pub async fn update_sales(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<OrderFilter>,
    payload: web::Json<OrderUpdate>,
) -> HttpResponse {
    let update = payload.into_inner();
    let outcome = async {
        check_references(&state, update.car, update.customer).await?;
        let predicate = Predicate::from_filter(&filter.normalize());
        let (updated, orders) = state.orders.update(&predicate, update).await?;
        let data = shape_orders(&orders, &state.files)?;
        Ok(Envelope::ok()
            .describe(format!("{updated} sales updated"))
            .with_data(data))
    }
    .await;
    respond(outcome)
}

/// Delete every sale matching the filter.
#[utoipa::path(
    delete,
    path = "/api/v1/sales",
    responses(
        (status = 200, description = "Deletion count", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["sales"],
    operation_id = "delete_sales"
)]
#[delete("/sales")]
pub async fn delete_sales(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<OrderFilter>,
) -> HttpResponse {
    let predicate = Predicate::from_filter(&filter.normalize());
    let outcome = async {
        let removed = state.orders.delete(&predicate).await?;
        Ok(Envelope::ok().describe(format!("{removed} sales deleted")))
    }
    .await;
    respond(outcome)
}
