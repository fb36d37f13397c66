//! PostgreSQL-backed `CarRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::catalog::{Car, CarDraft, CarUpdate};
use crate::domain::filter::Predicate;
use crate::domain::ports::{CarRepository, StoreError};

use super::condition::cars_condition;
use super::error_map::map_diesel_error;
use super::models::{CarChanges, CarRow, NewCarRow};
use super::pool::DbPool;
use super::schema::cars;

/// Diesel-backed implementation of the `CarRepository` port.
#[derive(Clone)]
pub struct DieselCarRepository {
    pool: DbPool,
}

impl DieselCarRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn rows_to_cars(rows: Vec<CarRow>) -> Result<Vec<Car>, StoreError> {
    rows.into_iter().map(Car::try_from).collect()
}

#[async_trait]
impl CarRepository for DieselCarRepository {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<Car>, StoreError> {
        let condition = cars_condition(predicate)?;
        let mut conn = self.pool.get().await?;
        let rows: Vec<CarRow> = cars::table
            .filter(condition)
            .order(cars::id.asc())
            .select(CarRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_cars(rows)
    }

    async fn find(&self, id: i32) -> Result<Option<Car>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<CarRow> = cars::table
            .find(id)
            .select(CarRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Car::try_from).transpose()
    }

    async fn insert(&self, draft: CarDraft, images: [String; 4]) -> Result<Car, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: CarRow = diesel::insert_into(cars::table)
            .values(NewCarRow::from_draft(draft, images))
            .returning(CarRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Car::try_from(row)
    }

    async fn update(
        &self,
        predicate: &Predicate,
        update: CarUpdate,
    ) -> Result<Vec<Car>, StoreError> {
        if update.is_empty() {
            return self.list(predicate).await;
        }
        let update_condition = cars_condition(predicate)?;
        let reload_condition = cars_condition(predicate)?;
        let changes = CarChanges::from(update);
        let mut conn = self.pool.get().await?;
        let rows: Vec<CarRow> = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::update(cars::table.filter(update_condition))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                    cars::table
                        .filter(reload_condition)
                        .order(cars::id.asc())
                        .select(CarRow::as_select())
                        .load(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        rows_to_cars(rows)
    }

    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let condition = cars_condition(predicate)?;
        let mut conn = self.pool.get().await?;
        let removed = diesel::delete(cars::table.filter(condition))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed as u64)
    }
}
