//! Port abstraction for test-drive persistence adapters.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::accounts::{TestDrive, TestDriveFilter};
use crate::domain::filter::Predicate;

#[async_trait]
pub trait TestDriveRepository: Send + Sync {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<TestDrive>, StoreError>;

    async fn insert(&self, username: &str, email: &str) -> Result<TestDrive, StoreError>;

    /// Apply the patch to every matching record; returns the updated count
    /// and the reloaded rows, both from one transaction.
    async fn update(
        &self,
        predicate: &Predicate,
        patch: TestDriveFilter,
    ) -> Result<(u64, Vec<TestDrive>), StoreError>;

    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError>;
}
