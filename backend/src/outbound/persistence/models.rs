//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{account_avatars, accounts, cars, cities, countries, orders, shops, states, test_drives};
use crate::domain::accounts::{Account, TestDrive};
use crate::domain::catalog::{Car, CarDraft, CarUpdate, Color, FuelType};
use crate::domain::ports::{NewAccount, NewOrder, ProfileChanges, StoreError};
use crate::domain::sales::{Order, OrderUpdate, PaymentMethod, PaymentStatus};
use crate::domain::shops::{City, Country, Shop, ShopDraft, ShopFilter, State};

fn parse_column<T>(value: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err: T::Err| StoreError::query(err.to_string()))
}

// ---------------------------------------------------------------------------
// Catalog models
// ---------------------------------------------------------------------------

/// Row struct for reading from the cars table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CarRow {
    pub id: i32,
    pub name: String,
    pub version: f64,
    pub price: f64,
    pub fuel_type: String,
    pub mileage: i32,
    pub engine: String,
    pub transmission: String,
    pub seat: i32,
    pub color: String,
    pub rating: i32,
    pub power: f64,
    pub new_arrival: bool,
    pub image_one: Option<String>,
    pub image_two: Option<String>,
    pub image_three: Option<String>,
    pub image_four: Option<String>,
}

impl TryFrom<CarRow> for Car {
    type Error = StoreError;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            version: row.version,
            price: row.price,
            fuel_type: parse_column::<FuelType>(&row.fuel_type)?,
            mileage: row.mileage,
            engine: row.engine,
            transmission: row.transmission,
            seat: row.seat,
            color: parse_column::<Color>(&row.color)?,
            rating: row.rating,
            power: row.power,
            new_arrival: row.new_arrival,
            image_one: row.image_one,
            image_two: row.image_two,
            image_three: row.image_three,
            image_four: row.image_four,
        })
    }
}

/// Insertable struct for creating new catalog entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cars)]
pub(crate) struct NewCarRow {
    pub name: String,
    pub version: f64,
    pub price: f64,
    pub fuel_type: &'static str,
    pub mileage: i32,
    pub engine: String,
    pub transmission: String,
    pub seat: i32,
    pub color: &'static str,
    pub rating: i32,
    pub power: f64,
    pub new_arrival: bool,
    pub image_one: String,
    pub image_two: String,
    pub image_three: String,
    pub image_four: String,
}

impl NewCarRow {
    pub(crate) fn from_draft(draft: CarDraft, images: [String; 4]) -> Self {
        let [image_one, image_two, image_three, image_four] = images;
        Self {
            name: draft.name,
            version: draft.version,
            price: draft.price,
            fuel_type: draft.fuel_type.as_str(),
            mileage: draft.mileage,
            engine: draft.engine,
            transmission: draft.transmission,
            seat: draft.seat,
            color: draft.color.as_str(),
            rating: draft.rating,
            power: draft.power,
            new_arrival: draft.new_arrival,
            image_one,
            image_two,
            image_three,
            image_four,
        }
    }
}

/// Changeset struct for patching catalog entries; `None` fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cars)]
pub(crate) struct CarChanges {
    pub name: Option<String>,
    pub version: Option<f64>,
    pub price: Option<f64>,
    pub fuel_type: Option<&'static str>,
    pub mileage: Option<i32>,
    pub engine: Option<String>,
    pub transmission: Option<String>,
    pub seat: Option<i32>,
    pub color: Option<&'static str>,
    pub rating: Option<i32>,
    pub power: Option<f64>,
    pub new_arrival: Option<bool>,
    pub image_one: Option<String>,
    pub image_two: Option<String>,
    pub image_three: Option<String>,
    pub image_four: Option<String>,
}

impl From<CarUpdate> for CarChanges {
    fn from(update: CarUpdate) -> Self {
        Self {
            name: update.name,
            version: update.version,
            price: update.price,
            fuel_type: update.fuel_type.map(FuelType::as_str),
            mileage: update.mileage,
            engine: update.engine,
            transmission: update.transmission,
            seat: update.seat,
            color: update.color.map(Color::as_str),
            rating: update.rating,
            power: update.power,
            new_arrival: update.new_arrival,
            image_one: update.image_one,
            image_two: update.image_two,
            image_three: update.image_three,
            image_four: update.image_four,
        }
    }
}

// ---------------------------------------------------------------------------
// Location hierarchy models
// ---------------------------------------------------------------------------

/// Row struct for reading from the countries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = countries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CountryRow {
    pub id: i32,
    pub name: String,
    pub gst_rate: f64,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            gst_rate: row.gst_rate,
        }
    }
}

/// Row struct for reading from the states table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = states)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StateRow {
    pub id: i32,
    pub name: String,
    pub country_id: i32,
    pub gst_rate: f64,
}

impl From<StateRow> for State {
    fn from(row: StateRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            country_id: row.country_id,
            gst_rate: row.gst_rate,
        }
    }
}

/// Row struct for reading from the cities table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CityRow {
    pub id: i32,
    pub name: String,
    pub state_id: i32,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            state_id: row.state_id,
        }
    }
}

/// Row struct for reading from the shops table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = shops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ShopRow {
    pub id: i32,
    pub name: String,
    pub country_id: i32,
    pub state_id: i32,
    pub city_id: i32,
    pub marker_offset: f64,
    pub coordinates: String,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            country_id: row.country_id,
            state_id: row.state_id,
            city_id: row.city_id,
            marker_offset: row.marker_offset,
            coordinates: row.coordinates,
        }
    }
}

/// Insertable struct for creating shop records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = shops)]
pub(crate) struct NewShopRow {
    pub name: String,
    pub country_id: i32,
    pub state_id: i32,
    pub city_id: i32,
    pub marker_offset: f64,
    pub coordinates: String,
}

impl From<ShopDraft> for NewShopRow {
    fn from(draft: ShopDraft) -> Self {
        Self {
            name: draft.name,
            country_id: draft.country,
            state_id: draft.state,
            city_id: draft.city,
            marker_offset: draft.marker_offset,
            coordinates: draft.coordinates,
        }
    }
}

/// Changeset struct for patching shop records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = shops)]
pub(crate) struct ShopChanges {
    pub name: Option<String>,
    pub country_id: Option<i32>,
    pub state_id: Option<i32>,
    pub city_id: Option<i32>,
    pub marker_offset: Option<f64>,
    pub coordinates: Option<String>,
}

impl From<ShopFilter> for ShopChanges {
    fn from(patch: ShopFilter) -> Self {
        Self {
            name: patch.name,
            country_id: patch.country,
            state_id: patch.state,
            city_id: patch.city,
            marker_offset: patch.marker_offset,
            coordinates: patch.coordinates,
        }
    }
}

// ---------------------------------------------------------------------------
// Sales models
// ---------------------------------------------------------------------------

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: i32,
    pub car_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub payment_method: String,
    pub payment_status: String,
    pub order_date: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            car_id: row.car_id,
            customer_id: row.customer_id,
            payment_method: parse_column::<PaymentMethod>(&row.payment_method)?,
            payment_status: parse_column::<PaymentStatus>(&row.payment_status)?,
            order_date: row.order_date,
        })
    }
}

/// Insertable struct for recording sales.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow {
    pub car_id: i32,
    pub customer_id: i32,
    pub payment_method: &'static str,
    pub payment_status: &'static str,
    pub order_date: DateTime<Utc>,
}

impl From<NewOrder> for NewOrderRow {
    fn from(order: NewOrder) -> Self {
        Self {
            car_id: order.car_id,
            customer_id: order.customer_id,
            payment_method: order.payment_method.as_str(),
            payment_status: order.payment_status.as_str(),
            order_date: order.order_date,
        }
    }
}

/// Changeset struct for patching orders.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = orders)]
pub(crate) struct OrderChanges {
    pub car_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub payment_method: Option<&'static str>,
    pub payment_status: Option<&'static str>,
    pub order_date: Option<DateTime<Utc>>,
}

impl From<OrderUpdate> for OrderChanges {
    fn from(update: OrderUpdate) -> Self {
        Self {
            car_id: update.car,
            customer_id: update.customer,
            payment_method: update.payment_method.map(PaymentMethod::as_str),
            payment_status: update.payment_status.map(PaymentStatus::as_str),
            order_date: update.order_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Account models
// ---------------------------------------------------------------------------

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            active: row.active,
        }
    }
}

/// Insertable struct for creating accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
}

impl From<NewAccount> for NewAccountRow {
    fn from(account: NewAccount) -> Self {
        Self {
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            active: account.active,
        }
    }
}

/// Changeset struct for partial profile updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
pub(crate) struct AccountChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl From<ProfileChanges> for AccountChanges {
    fn from(changes: ProfileChanges) -> Self {
        Self {
            username: changes.username,
            email: changes.email,
            password_hash: changes.password_hash,
        }
    }
}

/// Insertable struct for the avatar upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = account_avatars)]
pub(crate) struct AvatarRow {
    pub account_id: i32,
    pub avatar: String,
}

// ---------------------------------------------------------------------------
// Test-drive models
// ---------------------------------------------------------------------------

/// Row struct for reading from the test_drives table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = test_drives)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TestDriveRow {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<TestDriveRow> for TestDrive {
    fn from(row: TestDriveRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
        }
    }
}

/// Insertable struct for recording test-drive requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = test_drives)]
pub(crate) struct NewTestDriveRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

/// Changeset struct for patching test-drive records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = test_drives)]
pub(crate) struct TestDriveChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}
