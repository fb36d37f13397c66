//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every HTTP endpoint and the schemas they exchange.
//! The generated document is served at `GET /api/doc/openapi.json`.

use actix_web::web;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::accounts::{
    AccountUpdate, Credentials, PasswordChange, Profile, SignUp, TestDrive, TestDriveFilter,
    TestDriveRequest,
};
use crate::domain::catalog::{Car, CarDraft, CarFilter, CarSearchFilter, CarUpdate};
use crate::domain::sales::{MonthlyCount, OrderDetails, OrderDraft, OrderFilter, OrderUpdate, SalesSeries};
use crate::domain::shops::{City, Country, GstBreakdown, ShopDetails, ShopDraft, ShopFilter, State};
use crate::domain::{Envelope, TokenPair};
use crate::inbound::http::accounts::{GoogleSignIn, ProfileTarget, RefreshRequest};
use crate::inbound::http::catalog::CarCreateRequest;

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Dealership back-office API",
        description = "Catalog, sales, shop and account operations."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::catalog::list_cars,
        crate::inbound::http::catalog::search_cars,
        crate::inbound::http::catalog::price_calculation,
        crate::inbound::http::catalog::add_car,
        crate::inbound::http::catalog::update_cars,
        crate::inbound::http::catalog::delete_cars,
        crate::inbound::http::sales::list_sales,
        crate::inbound::http::sales::sales_graph,
        crate::inbound::http::sales::add_sale,
        crate::inbound::http::sales::update_sales,
        crate::inbound::http::sales::delete_sales,
        crate::inbound::http::shops::list_shops,
        crate::inbound::http::shops::add_shop,
        crate::inbound::http::shops::update_shops,
        crate::inbound::http::shops::delete_shops,
        crate::inbound::http::accounts::sign_up,
        crate::inbound::http::accounts::verify_account,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::refresh,
        crate::inbound::http::accounts::change_password,
        crate::inbound::http::accounts::google_sign_in,
        crate::inbound::http::accounts::profile,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::request_test_drive,
        crate::inbound::http::accounts::list_test_drives,
        crate::inbound::http::accounts::update_test_drives,
        crate::inbound::http::accounts::delete_test_drives,
    ),
    components(schemas(
        Envelope, TokenPair,
        Car, CarDraft, CarFilter, CarSearchFilter, CarUpdate, CarCreateRequest,
        OrderDetails, OrderDraft, OrderFilter, OrderUpdate, SalesSeries, MonthlyCount,
        Country, State, City, ShopDetails, ShopDraft, ShopFilter, GstBreakdown,
        SignUp, Credentials, PasswordChange, AccountUpdate, Profile,
        RefreshRequest, GoogleSignIn, ProfileTarget,
        TestDrive, TestDriveRequest, TestDriveFilter,
    )),
    tags(
        (name = "cars", description = "Catalog operations"),
        (name = "sales", description = "Order operations"),
        (name = "shops", description = "Location hierarchy operations"),
        (name = "accounts", description = "Account and session operations"),
        (name = "test-drives", description = "Test-drive requests")
    )
)]
pub struct ApiDoc;

/// Serve the generated specification.
pub async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}
