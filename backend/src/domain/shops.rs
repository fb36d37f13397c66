//! Shop domain: the country → state → city → shop hierarchy and GST rates.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::filter::{NormalizedFilter, QueryFilter};

/// A country with its national GST rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Country {
    pub id: i32,
    pub name: String,
    pub gst_rate: f64,
}

/// A state within a country, carrying its own GST rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct State {
    pub id: i32,
    pub name: String,
    pub country_id: i32,
    pub gst_rate: f64,
}

/// A city within a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub state_id: i32,
}

/// A dealership location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Shop {
    pub id: i32,
    pub name: String,
    pub country_id: i32,
    pub state_id: i32,
    pub city_id: i32,
    pub marker_offset: f64,
    pub coordinates: String,
}

/// Shop joined with its location hierarchy for responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShopDetails {
    pub id: i32,
    pub name: String,
    pub country: Country,
    pub state: State,
    pub city: City,
    pub marker_offset: f64,
    pub coordinates: String,
}

/// Payload for adding a shop; location fields are foreign ids.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShopDraft {
    pub name: String,
    pub country: i32,
    pub state: i32,
    pub city: i32,
    pub marker_offset: f64,
    pub coordinates: String,
}

/// Optional filter and bulk-update payload over shops.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ShopFilter {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub country: Option<i32>,
    pub state: Option<i32>,
    pub city: Option<i32>,
    pub marker_offset: Option<f64>,
    pub coordinates: Option<String>,
}

impl ShopFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalize().is_empty()
    }
}

impl QueryFilter for ShopFilter {
    fn normalize(&self) -> NormalizedFilter {
        let mut filter = NormalizedFilter::new();
        filter.insert_opt("id", self.id);
        filter.insert_opt("name", self.name.as_deref());
        filter.insert_opt("country_id", self.country);
        filter.insert_opt("state_id", self.state);
        filter.insert_opt("city_id", self.city);
        filter.insert_opt("marker_offset", self.marker_offset);
        filter.insert_opt("coordinates", self.coordinates.as_deref());
        filter
    }
}

/// Per-state GST total: state rate plus its country's rate.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GstBreakdown {
    pub state: String,
    pub gst_rate: f64,
}

impl GstBreakdown {
    #[must_use]
    pub fn new(state: &State, country: &Country) -> Self {
        Self {
            state: state.name.clone(),
            gst_rate: state.gst_rate + country.gst_rate,
        }
    }
}
