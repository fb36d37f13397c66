//! Sales domain: orders linking cars to customer accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::accounts::AccountSummary;
use crate::domain::catalog::Car;
use crate::domain::error::DomainError;
use crate::domain::filter::{NormalizedFilter, QueryFilter};

/// Accepted payment channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Cash,
    Netbanking,
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upi => "upi",
            Self::Cash => "cash",
            Self::Netbanking => "netbanking",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upi" => Ok(Self::Upi),
            "cash" => Ok(Self::Cash),
            "netbanking" => Ok(Self::Netbanking),
            other => Err(DomainError::internal(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

/// Settlement state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Complete,
    Failed,
}

impl PaymentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "complete" => Ok(Self::Complete),
            "failed" => Ok(Self::Failed),
            other => Err(DomainError::internal(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// A stored order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub car_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_date: DateTime<Utc>,
}

/// Order joined with its car and customer for responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetails {
    pub id: i32,
    pub car: Option<Car>,
    pub customer: Option<AccountSummary>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_date: DateTime<Utc>,
}

/// Payload for recording a sale.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderDraft {
    pub car: i32,
    pub customer: i32,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Defaults to the current time when omitted.
    pub order_date: Option<DateTime<Utc>>,
}

/// Optional filter over orders.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrderFilter {
    pub id: Option<i32>,
    pub car: Option<i32>,
    pub customer: Option<i32>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub order_date: Option<DateTime<Utc>>,
}

impl QueryFilter for OrderFilter {
    fn normalize(&self) -> NormalizedFilter {
        let mut filter = NormalizedFilter::new();
        filter.insert_opt("id", self.id);
        filter.insert_opt("car_id", self.car);
        filter.insert_opt("customer_id", self.customer);
        filter.insert_opt("payment_method", self.payment_method.map(PaymentMethod::as_str));
        filter.insert_opt("payment_status", self.payment_status.map(PaymentStatus::as_str));
        filter.insert_opt("order_date", self.order_date);
        filter
    }
}

/// Bulk-update payload for orders; all fields optional.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrderUpdate {
    pub car: Option<i32>,
    pub customer: Option<i32>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub order_date: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.car.is_none()
            && self.customer.is_none()
            && self.payment_method.is_none()
            && self.payment_status.is_none()
            && self.order_date.is_none()
    }
}

/// One car's order counts per calendar month, for the sales graph.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalesSeries {
    pub label: String,
    /// Twelve entries, January first.
    pub monthly: Vec<MonthlyCount>,
}

/// A single month's order count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}

/// English month names in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl SalesSeries {
    /// Build a series from (month-number, count) pairs; absent months are 0.
    #[must_use]
    pub fn from_counts(label: impl Into<String>, counts: &[(u32, i64)]) -> Self {
        let monthly = MONTH_NAMES
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let month_number = u32::try_from(index + 1).unwrap_or_default();
                let count = counts
                    .iter()
                    .find(|(month, _)| *month == month_number)
                    .map_or(0, |(_, count)| *count);
                MonthlyCount {
                    month: (*name).to_owned(),
                    count,
                }
            })
            .collect();
        Self {
            label: label.into(),
            monthly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::FilterValue;
    use rstest::rstest;

    #[rstest]
    fn payment_enums_normalize_to_canonical_names() {
        let filter = OrderFilter {
            payment_method: Some(PaymentMethod::Netbanking),
            payment_status: Some(PaymentStatus::Pending),
            ..OrderFilter::default()
        };
        let normalized = filter.normalize();
        assert_eq!(
            normalized.get("payment_method"),
            Some(&FilterValue::Text("netbanking".into()))
        );
        assert_eq!(
            normalized.get("payment_status"),
            Some(&FilterValue::Text("pending".into()))
        );
    }

    #[rstest]
    fn foreign_keys_normalize_under_their_column_names() {
        let filter = OrderFilter {
            car: Some(3),
            customer: Some(7),
            ..OrderFilter::default()
        };
        let normalized = filter.normalize();
        assert_eq!(normalized.get("car_id"), Some(&FilterValue::Int(3)));
        assert_eq!(normalized.get("customer_id"), Some(&FilterValue::Int(7)));
    }

    #[rstest]
    fn sales_series_fills_absent_months_with_zero() {
        let series = SalesSeries::from_counts("GT", &[(1, 2), (12, 5)]);
        assert_eq!(series.monthly.len(), 12);
        assert_eq!(series.monthly[0].count, 2);
        assert_eq!(series.monthly[5].count, 0);
        assert_eq!(series.monthly[11].count, 5);
        assert_eq!(series.monthly[11].month, "December");
    }
}
