//! PostgreSQL-backed `ShopRepository` implementation using Diesel.
//!
//! Shop responses embed the full country, state and city records. The
//! hierarchy is assembled from separate `eq_any` loads rather than a
//! four-way join.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::filter::Predicate;
use crate::domain::ports::{ShopRepository, StoreError};
use crate::domain::shops::{City, Country, GstBreakdown, ShopDetails, ShopDraft, ShopFilter, State};

use super::condition::shops_condition;
use super::error_map::map_diesel_error;
use super::models::{CityRow, CountryRow, NewShopRow, ShopChanges, ShopRow, StateRow};
use super::pool::DbPool;
use super::schema::{cities, countries, shops, states};

/// Diesel-backed implementation of the `ShopRepository` port.
#[derive(Clone)]
pub struct DieselShopRepository {
    pool: DbPool,
}

impl DieselShopRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Fetch the referenced hierarchy records and join them onto the shop rows.
///
/// A shop whose foreign keys point at missing records is a broken reference;
/// surfacing it as a query error beats fabricating a location.
async fn assemble_details(
    conn: &mut AsyncPgConnection,
    rows: Vec<ShopRow>,
) -> Result<Vec<ShopDetails>, StoreError> {
    let country_ids: Vec<i32> = rows.iter().map(|row| row.country_id).collect();
    let state_ids: Vec<i32> = rows.iter().map(|row| row.state_id).collect();
    let city_ids: Vec<i32> = rows.iter().map(|row| row.city_id).collect();

    let countries_by_id: HashMap<i32, Country> = countries::table
        .filter(countries::id.eq_any(country_ids))
        .select(CountryRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .map(|row| (row.id, Country::from(row)))
        .collect();
    let states_by_id: HashMap<i32, State> = states::table
        .filter(states::id.eq_any(state_ids))
        .select(StateRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .map(|row| (row.id, State::from(row)))
        .collect();
    let cities_by_id: HashMap<i32, City> = cities::table
        .filter(cities::id.eq_any(city_ids))
        .select(CityRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .map(|row| (row.id, City::from(row)))
        .collect();

    rows.into_iter()
        .map(|row| {
            let country = countries_by_id
                .get(&row.country_id)
                .cloned()
                .ok_or_else(|| StoreError::query("shop references a missing country"))?;
            let state = states_by_id
                .get(&row.state_id)
                .cloned()
                .ok_or_else(|| StoreError::query("shop references a missing state"))?;
            let city = cities_by_id
                .get(&row.city_id)
                .cloned()
                .ok_or_else(|| StoreError::query("shop references a missing city"))?;
            Ok(ShopDetails {
                id: row.id,
                name: row.name,
                country,
                state,
                city,
                marker_offset: row.marker_offset,
                coordinates: row.coordinates,
            })
        })
        .collect()
}

#[async_trait]
impl ShopRepository for DieselShopRepository {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<ShopDetails>, StoreError> {
        let condition = shops_condition(predicate)?;
        let mut conn = self.pool.get().await?;
        let rows: Vec<ShopRow> = shops::table
            .filter(condition)
            .order(shops::id.asc())
            .select(ShopRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        assemble_details(&mut conn, rows).await
    }

    async fn find_country(&self, id: i32) -> Result<Option<Country>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<CountryRow> = countries::table
            .find(id)
            .select(CountryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Country::from))
    }

    async fn find_state(&self, id: i32) -> Result<Option<State>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<StateRow> = states::table
            .find(id)
            .select(StateRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(State::from))
    }

    async fn find_city(&self, id: i32) -> Result<Option<City>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<CityRow> = cities::table
            .find(id)
            .select(CityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(City::from))
    }

    async fn insert(&self, draft: ShopDraft) -> Result<ShopDetails, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: ShopRow = diesel::insert_into(shops::table)
            .values(NewShopRow::from(draft))
            .returning(ShopRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut details = assemble_details(&mut conn, vec![row]).await?;
        details
            .pop()
            .ok_or_else(|| StoreError::query("inserted shop row went missing"))
    }

    async fn update(
        &self,
        predicate: &Predicate,
        patch: ShopFilter,
    ) -> Result<(u64, Vec<ShopDetails>), StoreError> {
        let mut conn = self.pool.get().await?;
        let (updated, rows) = if patch.is_empty() {
            let condition = shops_condition(predicate)?;
            let rows: Vec<ShopRow> = shops::table
                .filter(condition)
                .order(shops::id.asc())
                .select(ShopRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            (0, rows)
        } else {
            let update_condition = shops_condition(predicate)?;
            let reload_condition = shops_condition(predicate)?;
            let changes = ShopChanges::from(patch);
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let updated = diesel::update(shops::table.filter(update_condition))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                    let rows: Vec<ShopRow> = shops::table
                        .filter(reload_condition)
                        .order(shops::id.asc())
                        .select(ShopRow::as_select())
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
        let condition = shops_condition(predicate)?;
        let mut conn = self.pool.get().await?;
        let removed = diesel::delete(shops::table.filter(condition))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed as u64)
    }

    async fn gst_breakdown(&self) -> Result<Vec<GstBreakdown>, StoreError> {
        let mut conn = self.pool.get().await?;
        let countries_by_id: HashMap<i32, Country> = countries::table
            .select(CountryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.id, Country::from(row)))
            .collect();
        let state_rows: Vec<StateRow> = states::table
            .order(states::id.asc())
            .select(StateRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        state_rows
            .into_iter()
            .map(|row| {
                let state = State::from(row);
                let country = countries_by_id
                    .get(&state.country_id)
                    .ok_or_else(|| StoreError::query("state references a missing country"))?;
                Ok(GstBreakdown::new(&state, country))
            })
            .collect()
    }
}
