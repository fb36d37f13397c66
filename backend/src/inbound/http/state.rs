//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::{
    AccountRepository, CarRepository, GoogleTokenVerifier, Mailer, OrderRepository, ShopRepository,
    TestDriveRepository,
};
use crate::domain::{FileUrlResolver, TokenAuthority};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub cars: Arc<dyn CarRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub shops: Arc<dyn ShopRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub test_drives: Arc<dyn TestDriveRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub google: Arc<dyn GoogleTokenVerifier>,
    pub tokens: TokenAuthority,
    pub files: FileUrlResolver,
    /// Public base used when building verification links.
    pub public_base: Url,
}
