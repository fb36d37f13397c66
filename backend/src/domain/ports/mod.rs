//! Ports between the domain and its collaborators.
//!
//! Inbound adapters depend on these traits only; outbound adapters implement
//! them. Tests substitute in-memory doubles.

pub mod account_repository;
pub mod car_repository;
pub mod google_verifier;
pub mod mailer;
pub mod order_repository;
pub mod shop_repository;
pub mod test_drive_repository;

pub use account_repository::{AccountRepository, NewAccount, ProfileChanges};
pub use car_repository::CarRepository;
pub use google_verifier::{GoogleIdentity, GoogleTokenVerifier};
pub use mailer::{Mail, MailError, Mailer};
pub use order_repository::{NewOrder, OrderRepository};
pub use shop_repository::ShopRepository;
pub use test_drive_repository::TestDriveRepository;

use crate::domain::DomainError;

/// Failures raised by storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// A query or mutation failed during execution.
    #[error("store query failed: {message}")]
    Query { message: String },
}

impl StoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(error: StoreError) -> Self {
        Self::internal(error.to_string())
    }
}
