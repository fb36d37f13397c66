//! PostgreSQL persistence adapters using Diesel.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! The adapters stay thin: they translate between Diesel row structs and
//! domain types, and interpret domain predicates into typed conditions.
//! Row structs (`models.rs`), table definitions (`schema.rs`) and the
//! condition interpreters (`condition.rs`) are internal details, never
//! exposed to the domain layer. Database errors are collapsed into
//! [`StoreError`](crate::domain::ports::StoreError) so responses never
//! leak database internals.

mod condition;
mod diesel_account_repository;
mod diesel_car_repository;
mod diesel_order_repository;
mod diesel_shop_repository;
mod diesel_test_drive_repository;
mod error_map;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_car_repository::DieselCarRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_shop_repository::DieselShopRepository;
pub use diesel_test_drive_repository::DieselTestDriveRepository;
pub use pool::{DbPool, PoolConfig};
