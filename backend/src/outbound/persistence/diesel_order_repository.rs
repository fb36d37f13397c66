//! PostgreSQL-backed `OrderRepository` implementation using Diesel.
//!
//! Orders are stored with nullable car and customer links so deleting either
//! side keeps the sale record. Joined responses are assembled in two steps:
//! load the matching order rows, then fetch the referenced cars and accounts
//! with `eq_any` lookups.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::accounts::AccountSummary;
use crate::domain::catalog::Car;
use crate::domain::filter::Predicate;
use crate::domain::ports::{NewOrder, OrderRepository, StoreError};
use crate::domain::sales::{Order, OrderDetails, OrderUpdate, SalesSeries};

use super::condition::orders_condition;
use super::error_map::map_diesel_error;
use super::models::{CarRow, NewOrderRow, OrderChanges, OrderRow};
use super::pool::DbPool;
use super::schema::{accounts, cars, orders};

/// Diesel-backed implementation of the `OrderRepository` port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Fetch the cars and customers referenced by the rows and join them up.
async fn assemble_details(
    conn: &mut AsyncPgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<OrderDetails>, StoreError> {
    let car_ids: Vec<i32> = rows.iter().filter_map(|row| row.car_id).collect();
    let customer_ids: Vec<i32> = rows.iter().filter_map(|row| row.customer_id).collect();

    let car_rows: Vec<CarRow> = cars::table
        .filter(cars::id.eq_any(car_ids))
        .select(CarRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut cars_by_id = HashMap::with_capacity(car_rows.len());
    for row in car_rows {
        let car = Car::try_from(row)?;
        cars_by_id.insert(car.id, car);
    }

    let customer_rows: Vec<(i32, String, String)> = accounts::table
        .filter(accounts::id.eq_any(customer_ids))
        .select((accounts::id, accounts::username, accounts::email))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let customers_by_id: HashMap<i32, AccountSummary> = customer_rows
        .into_iter()
        .map(|(id, username, email)| (id, AccountSummary { username, email }))
        .collect();

    rows.into_iter()
        .map(|row| {
            let order = Order::try_from(row)?;
            Ok(OrderDetails {
                id: order.id,
                car: order.car_id.and_then(|id| cars_by_id.get(&id).cloned()),
                customer: order
                    .customer_id
                    .and_then(|id| customers_by_id.get(&id).cloned()),
                payment_method: order.payment_method,
                payment_status: order.payment_status,
                order_date: order.order_date,
            })
        })
        .collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<OrderDetails>, StoreError> {
        let condition = orders_condition(predicate)?;
        let mut conn = self.pool.get().await?;
        let rows: Vec<OrderRow> = orders::table
            .filter(condition)
            .order(orders::id.asc())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        assemble_details(&mut conn, rows).await
    }

    async fn insert(&self, order: NewOrder) -> Result<OrderDetails, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: OrderRow = diesel::insert_into(orders::table)
            .values(NewOrderRow::from(order))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut details = assemble_details(&mut conn, vec![row]).await?;
        details
            .pop()
            .ok_or_else(|| StoreError::query("inserted order row went missing"))
    }

    async fn update(
        &self,
        predicate: &Predicate,
        update: OrderUpdate,
    ) -> Result<(u64, Vec<OrderDetails>), StoreError> {
        let mut conn = self.pool.get().await?;
        let (updated, rows) = if update.is_empty() {
            let condition = orders_condition(predicate)?;
            let rows: Vec<OrderRow> = orders::table
                .filter(condition)
                .order(orders::id.asc())
                .select(OrderRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            (0, rows)
        } else {
            let update_condition = orders_condition(predicate)?;
            let reload_condition = orders_condition(predicate)?;
            let changes = OrderChanges::from(update);
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let updated = diesel::update(orders::table.filter(update_condition))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                    let rows: Vec<OrderRow> = orders::table
                        .filter(reload_condition)
                        .order(orders::id.asc())
                        .select(OrderRow::as_select())
                        .load(conn)
                        .await?;
                    Ok((updated as u64, rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?
        };
        let details = assemble_details(&mut conn, rows).await?;
        Ok((updated, details))
    }

    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let condition = orders_condition(predicate)?;
        let mut conn = self.pool.get().await?;
        let removed = diesel::delete(orders::table.filter(condition))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed as u64)
    }

    async fn monthly_sales(&self) -> Result<Vec<SalesSeries>, StoreError> {
        let mut conn = self.pool.get().await?;
        let catalog: Vec<(i32, String)> = cars::table
            .order(cars::id.asc())
            .select((cars::id, cars::name))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let sold: Vec<(Option<i32>, DateTime<Utc>)> = orders::table
            .select((orders::car_id, orders::order_date))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut counts: HashMap<(i32, u32), i64> = HashMap::new();
        for (car_id, order_date) in sold {
            let Some(car_id) = car_id else { continue };
            *counts.entry((car_id, order_date.month())).or_insert(0) += 1;
        }

        let series = catalog
            .into_iter()
            .map(|(id, name)| {
                let monthly: Vec<(u32, i64)> = (1..=12)
                    .filter_map(|month| {
                        counts
                            .get(&(id, month))
                            .map(|count| (month, *count))
                    })
                    .collect();
                SalesSeries::from_counts(name, &monthly)
            })
            .collect();
        Ok(series)
    }
}
