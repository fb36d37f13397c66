//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the deployment's migrations exactly; they
//! drive Diesel's compile-time query validation.

diesel::table! {
    /// Catalog entries with four image-reference slots.
    cars (id) {
        id -> Int4,
        name -> Varchar,
        version -> Float8,
        price -> Float8,
        fuel_type -> Varchar,
        mileage -> Int4,
        engine -> Varchar,
        transmission -> Varchar,
        seat -> Int4,
        color -> Varchar,
        rating -> Int4,
        power -> Float8,
        new_arrival -> Bool,
        image_one -> Nullable<Varchar>,
        image_two -> Nullable<Varchar>,
        image_three -> Nullable<Varchar>,
        image_four -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Countries with their national GST rate.
    countries (id) {
        id -> Int4,
        name -> Varchar,
        gst_rate -> Float8,
    }
}

diesel::table! {
    /// States within a country.
    states (id) {
        id -> Int4,
        name -> Varchar,
        country_id -> Int4,
        gst_rate -> Float8,
    }
}

diesel::table! {
    /// Cities within a state.
    cities (id) {
        id -> Int4,
        name -> Varchar,
        state_id -> Int4,
    }
}

diesel::table! {
    /// Dealership locations.
    shops (id) {
        id -> Int4,
        name -> Varchar,
        country_id -> Int4,
        state_id -> Int4,
        city_id -> Int4,
        marker_offset -> Float8,
        coordinates -> Varchar,
    }
}

diesel::table! {
    /// Sales records linking cars to customer accounts.
    orders (id) {
        id -> Int4,
        car_id -> Nullable<Int4>,
        customer_id -> Nullable<Int4>,
        payment_method -> Varchar,
        payment_status -> Varchar,
        order_date -> Timestamptz,
    }
}

diesel::table! {
    /// User accounts; inactive until email verification.
    accounts (id) {
        id -> Int4,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        active -> Bool,
    }
}

diesel::table! {
    /// One avatar reference per account.
    account_avatars (account_id) {
        account_id -> Int4,
        avatar -> Varchar,
    }
}

diesel::table! {
    /// Test-drive requests.
    test_drives (id) {
        id -> Int4,
        username -> Varchar,
        email -> Varchar,
    }
}

diesel::joinable!(states -> countries (country_id));
diesel::joinable!(cities -> states (state_id));
diesel::joinable!(shops -> countries (country_id));
diesel::joinable!(shops -> states (state_id));
diesel::joinable!(shops -> cities (city_id));
diesel::joinable!(orders -> cars (car_id));
diesel::joinable!(orders -> accounts (customer_id));
diesel::joinable!(account_avatars -> accounts (account_id));

diesel::allow_tables_to_appear_in_same_query!(
    cars,
    countries,
    states,
    cities,
    shops,
    orders,
    accounts,
    account_avatars,
    test_drives,
);
