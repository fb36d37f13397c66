//! Port abstraction for shop-hierarchy persistence adapters.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::filter::Predicate;
use crate::domain::shops::{City, Country, GstBreakdown, ShopDetails, ShopDraft, ShopFilter, State};

#[async_trait]
pub trait ShopRepository: Send + Sync {
    /// Fetch matching shops joined with their location hierarchy.
    async fn list(&self, predicate: &Predicate) -> Result<Vec<ShopDetails>, StoreError>;

    /// Location lookups used for foreign-key validation.
    async fn find_country(&self, id: i32) -> Result<Option<Country>, StoreError>;
    async fn find_state(&self, id: i32) -> Result<Option<State>, StoreError>;
    async fn find_city(&self, id: i32) -> Result<Option<City>, StoreError>;

    /// Insert a shop whose foreign ids have been validated.
    async fn insert(&self, draft: ShopDraft) -> Result<ShopDetails, StoreError>;

    /// Apply the patch to every matching shop; returns the updated count and
    /// the reloaded rows, both from one transaction.
    async fn update(
        &self,
        predicate: &Predicate,
        patch: ShopFilter,
    ) -> Result<(u64, Vec<ShopDetails>), StoreError>;

    /// Delete matching shops, returning the number removed.
    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Per-state GST totals for the price-calculation endpoint.
    async fn gst_breakdown(&self) -> Result<Vec<GstBreakdown>, StoreError>;
}
