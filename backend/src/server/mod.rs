//! Server bootstrap: wire outbound adapters into the HTTP state and run.

pub mod config;

use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::info;
use url::Url;

use crate::domain::{FileUrlResolver, TokenAuthority};
use crate::inbound::http::{self, HttpState};
use crate::outbound::google::{GoogleTokenInfoVerifier, GOOGLE_TOKENINFO_URL};
use crate::outbound::mail::LogMailer;
use crate::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselCarRepository, DieselOrderRepository,
    DieselShopRepository, DieselTestDriveRepository, PoolConfig,
};

pub use config::{AppConfig, ConfigError};

/// Assemble the handler state from production adapters.
#[must_use]
pub fn build_state(config: &AppConfig, pool: DbPool) -> HttpState {
    let tokeninfo = Url::parse(GOOGLE_TOKENINFO_URL).unwrap_or_else(|_| config.public_base.clone());
    HttpState {
        cars: Arc::new(DieselCarRepository::new(pool.clone())),
        orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        shops: Arc::new(DieselShopRepository::new(pool.clone())),
        accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
        test_drives: Arc::new(DieselTestDriveRepository::new(pool)),
        mailer: Arc::new(LogMailer),
        google: Arc::new(GoogleTokenInfoVerifier::new(
            tokeninfo,
            config.google_client_id.clone(),
        )),
        tokens: TokenAuthority::new(&config.auth),
        files: FileUrlResolver::new(config.media_base.clone()),
        public_base: config.public_base.clone(),
    }
}

/// Build the pool, wire the adapters and serve until shutdown.
pub async fn run(config: AppConfig) -> io::Result<()> {
    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(|err| io::Error::other(err.to_string()))?;
    let state = web::Data::new(build_state(&config, pool));
    info!(addr = %config.bind_addr, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(http::configure)
            .route(
                "/api/doc/openapi.json",
                web::get().to(crate::doc::openapi_json),
            )
    })
    .bind(config.bind_addr)?
    .run()
    .await
}
