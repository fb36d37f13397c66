//! Translation of domain predicates into Diesel boolean expressions.
//!
//! Each table gets its own interpreter because Diesel conditions are typed
//! against the table they select from. The interpreters share one macro that
//! maps field names onto columns by kind and applies the coercion rules:
//! integer columns accept whole-number floats, fractional probes against an
//! integer column match nothing rather than erroring, and substring search
//! escapes LIKE metacharacters before binding.

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;

use super::schema::{cars, orders, shops, test_drives};
use crate::domain::filter::{FilterValue, Predicate};
use crate::domain::ports::StoreError;

/// A fully built condition over one table's FROM clause.
pub(crate) type BoxedCond<QS> = Box<dyn BoxableExpression<QS, Pg, SqlType = Bool>>;

/// A constant TRUE or FALSE condition, valid on any table.
fn boolean_literal<QS>(value: bool) -> BoxedCond<QS> {
    if value {
        Box::new(diesel::dsl::sql::<Bool>("TRUE"))
    } else {
        Box::new(diesel::dsl::sql::<Bool>("FALSE"))
    }
}

/// Escape `%`, `_` and `\` so user input matches literally under ILIKE.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn unknown_field(field: &str) -> StoreError {
    StoreError::query(format!("unknown filter field: {field}"))
}

fn type_mismatch(field: &str) -> StoreError {
    StoreError::query(format!("filter value has the wrong type for field: {field}"))
}

/// Whole-number floats compare against integer columns; anything else in the
/// float range of an i32 cannot match an integer row.
fn float_as_i32(value: f64) -> Option<i32> {
    if value.fract() == 0.0 && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
        Some(value as i32)
    } else {
        None
    }
}

macro_rules! table_condition {
    (
        $(#[$doc:meta])*
        $fn_name:ident, $table:ident,
        text: [$($text_field:literal => $text_col:ident),* $(,)?],
        int: [$($int_field:literal => $int_col:ident),* $(,)?],
        int_nullable: [$($intn_field:literal => $intn_col:ident),* $(,)?],
        float: [$($float_field:literal => $float_col:ident),* $(,)?],
        bool: [$($bool_field:literal => $bool_col:ident),* $(,)?],
        datetime: [$($dt_field:literal => $dt_col:ident),* $(,)?],
    ) => {
        $(#[$doc])*
        pub(crate) fn $fn_name(
            predicate: &Predicate,
        ) -> Result<BoxedCond<$table::table>, StoreError> {
            match predicate {
                Predicate::All => Ok(boolean_literal(true)),
                Predicate::And(parts) => {
                    let mut cond: BoxedCond<$table::table> = boolean_literal(true);
                    for part in parts {
                        let next = $fn_name(part)?;
                        cond = Box::new(cond.and(next));
                    }
                    Ok(cond)
                }
                Predicate::Or(parts) => {
                    let mut cond: Option<BoxedCond<$table::table>> = None;
                    for part in parts {
                        let next = $fn_name(part)?;
                        cond = Some(match cond {
                            Some(prior) => Box::new(prior.or(next)),
                            None => next,
                        });
                    }
                    Ok(cond.unwrap_or_else(|| boolean_literal(false)))
                }
                Predicate::Eq { field, value } => match field.as_str() {
                    $( $text_field => match value {
                        FilterValue::Text(text) => {
                            let cond: BoxedCond<$table::table> =
                                Box::new($table::$text_col.eq(text.clone()));
                            Ok(cond)
                        }
                        _ => Err(type_mismatch(field)),
                    }, )*
                    $( $int_field => match value {
                        FilterValue::Int(raw) => match i32::try_from(*raw) {
                            Ok(v) => {
                                let cond: BoxedCond<$table::table> =
                                    Box::new($table::$int_col.eq(v));
                                Ok(cond)
                            }
                            Err(_) => Ok(boolean_literal(false)),
                        },
                        FilterValue::Float(raw) => match float_as_i32(*raw) {
                            Some(v) => {
                                let cond: BoxedCond<$table::table> =
                                    Box::new($table::$int_col.eq(v));
                                Ok(cond)
                            }
                            None => Ok(boolean_literal(false)),
                        },
                        _ => Err(type_mismatch(field)),
                    }, )*
                    $( $intn_field => match value {
                        FilterValue::Int(raw) => match i32::try_from(*raw) {
                            Ok(v) => {
                                let cond: BoxedCond<$table::table> =
                                    Box::new($table::$intn_col.assume_not_null().eq(v));
                                Ok(cond)
                            }
                            Err(_) => Ok(boolean_literal(false)),
                        },
                        FilterValue::Float(raw) => match float_as_i32(*raw) {
                            Some(v) => {
                                let cond: BoxedCond<$table::table> =
                                    Box::new($table::$intn_col.assume_not_null().eq(v));
                                Ok(cond)
                            }
                            None => Ok(boolean_literal(false)),
                        },
                        _ => Err(type_mismatch(field)),
                    }, )*
                    $( $float_field => match value {
                        FilterValue::Float(v) => {
                            let cond: BoxedCond<$table::table> =
                                Box::new($table::$float_col.eq(*v));
                            Ok(cond)
                        }
                        FilterValue::Int(v) => {
                            #[expect(
                                clippy::cast_precision_loss,
                                reason = "filters carry human-scale magnitudes"
                            )]
                            let cond: BoxedCond<$table::table> =
                                Box::new($table::$float_col.eq(*v as f64));
                            Ok(cond)
                        }
                        _ => Err(type_mismatch(field)),
                    }, )*
                    $( $bool_field => match value {
                        FilterValue::Bool(v) => {
                            let cond: BoxedCond<$table::table> =
                                Box::new($table::$bool_col.eq(*v));
                            Ok(cond)
                        }
                        _ => Err(type_mismatch(field)),
                    }, )*
                    $( $dt_field => match value {
                        FilterValue::DateTime(v) => {
                            let cond: BoxedCond<$table::table> =
                                Box::new($table::$dt_col.eq(*v));
                            Ok(cond)
                        }
                        _ => Err(type_mismatch(field)),
                    }, )*
                    _ => Err(unknown_field(field)),
                },
                Predicate::ContainsI { field, needle } => match field.as_str() {
                    $( $text_field => {
                        let pattern = format!("%{}%", escape_like(needle));
                        let cond: BoxedCond<$table::table> =
                            Box::new($table::$text_col.ilike(pattern));
                        Ok(cond)
                    } )*
                    _ => Err(StoreError::query(format!(
                        "field does not support substring search: {field}"
                    ))),
                },
            }
        }
    };
}

table_condition!(
    /// Interpreter over the cars table; covers filters, search and bulk
    /// update targeting.
    cars_condition, cars,
    text: [
        "name" => name,
        "fuel_type" => fuel_type,
        "engine" => engine,
        "transmission" => transmission,
        "color" => color,
    ],
    int: [
        "id" => id,
        "mileage" => mileage,
        "seat" => seat,
        "rating" => rating,
    ],
    int_nullable: [],
    float: [
        "version" => version,
        "price" => price,
        "power" => power,
    ],
    bool: ["new_arrival" => new_arrival],
    datetime: [],
);

table_condition!(
    /// Interpreter over the shops table.
    shops_condition, shops,
    text: [
        "name" => name,
        "coordinates" => coordinates,
    ],
    int: [
        "id" => id,
        "country_id" => country_id,
        "state_id" => state_id,
        "city_id" => city_id,
    ],
    int_nullable: [],
    float: ["marker_offset" => marker_offset],
    bool: [],
    datetime: [],
);

table_condition!(
    /// Interpreter over the orders table; car and customer links are
    /// nullable because deleting either side keeps the sale record.
    orders_condition, orders,
    text: [
        "payment_method" => payment_method,
        "payment_status" => payment_status,
    ],
    int: ["id" => id],
    int_nullable: [
        "car_id" => car_id,
        "customer_id" => customer_id,
    ],
    float: [],
    bool: [],
    datetime: ["order_date" => order_date],
);

table_condition!(
    /// Interpreter over the test_drives table.
    test_drives_condition, test_drives,
    text: [
        "username" => username,
        "email" => email,
    ],
    int: ["id" => id],
    int_nullable: [],
    float: [],
    bool: [],
    datetime: [],
);
