//! Port abstraction for sales persistence adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StoreError;
use crate::domain::filter::Predicate;
use crate::domain::sales::{OrderDetails, OrderUpdate, PaymentMethod, PaymentStatus, SalesSeries};

/// Insert payload with resolved foreign keys.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub car_id: i32,
    pub customer_id: i32,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_date: DateTime<Utc>,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fetch matching orders joined with car and customer.
    async fn list(&self, predicate: &Predicate) -> Result<Vec<OrderDetails>, StoreError>;

    /// Record a sale and return it with its joins.
    async fn insert(&self, order: NewOrder) -> Result<OrderDetails, StoreError>;

    /// Apply the update to every matching order; returns the updated count
    /// and the reloaded rows, both from one transaction.
    async fn update(
        &self,
        predicate: &Predicate,
        update: OrderUpdate,
    ) -> Result<(u64, Vec<OrderDetails>), StoreError>;

    /// Delete matching orders, returning the number removed.
    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Per-car monthly order counts for the sales graph.
    async fn monthly_sales(&self) -> Result<Vec<SalesSeries>, StoreError>;
}
