//! HTTP inbound adapter: actix-web handlers over the domain ports.

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod sales;
pub mod shops;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::HttpState;

use actix_web::web;

/// Register every `/api/v1` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // catalog
            .service(catalog::search_cars)
            .service(catalog::price_calculation)
            .service(catalog::update_cars)
            .service(catalog::list_cars)
            .service(catalog::add_car)
            .service(catalog::delete_cars)
            // sales
            .service(sales::sales_graph)
            .service(sales::list_sales)
            .service(sales::add_sale)
            .service(sales::update_sales)
            .service(sales::delete_sales)
            // shops
            .service(shops::list_shops)
            .service(shops::add_shop)
            .service(shops::update_shops)
            .service(shops::delete_shops)
            // accounts
            .service(accounts::sign_up)
            .service(accounts::verify_account)
            .service(accounts::login)
            .service(accounts::refresh)
            .service(accounts::change_password)
            .service(accounts::google_sign_in)
            .service(accounts::profile)
            .service(accounts::update_profile)
            // test drives
            .service(accounts::request_test_drive)
            .service(accounts::list_test_drives)
            .service(accounts::update_test_drives)
            .service(accounts::delete_test_drives),
    );
}
