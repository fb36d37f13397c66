//! Port abstraction for catalog persistence adapters.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::catalog::{Car, CarDraft, CarUpdate};
use crate::domain::filter::Predicate;

#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Fetch every car matching the predicate.
    async fn list(&self, predicate: &Predicate) -> Result<Vec<Car>, StoreError>;

    /// Fetch a car by identifier.
    async fn find(&self, id: i32) -> Result<Option<Car>, StoreError>;

    /// Insert a new catalog entry with its four image references.
    async fn insert(&self, draft: CarDraft, images: [String; 4]) -> Result<Car, StoreError>;

    /// Apply the update to every matching car and return the reloaded rows.
    /// Update and reload run inside one transaction.
    async fn update(&self, predicate: &Predicate, update: CarUpdate)
    -> Result<Vec<Car>, StoreError>;

    /// Delete matching cars, returning the number removed.
    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError>;
}
