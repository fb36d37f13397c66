//! Catalog domain: cars, their enumerated attributes, and filter specs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::filter::{NormalizedFilter, Predicate, QueryFilter, SearchFields, SearchTerm};
use crate::domain::DomainError;

/// Available car colors. Serialized under the canonical lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
    Green,
    Blue,
    White,
}

impl Color {
    /// Canonical external name, as stored and filtered on.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Black => "black",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::White => "white",
        }
    }
}

impl std::str::FromStr for Color {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Self::Red),
            "black" => Ok(Self::Black),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "white" => Ok(Self::White),
            other => Err(DomainError::internal(format!("unknown color: {other}"))),
        }
    }
}

/// Available fuel types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
}

impl FuelType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Petrol => "petrol",
            Self::Diesel => "diesel",
        }
    }
}

impl std::str::FromStr for FuelType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "petrol" => Ok(Self::Petrol),
            "diesel" => Ok(Self::Diesel),
            other => Err(DomainError::internal(format!("unknown fuel type: {other}"))),
        }
    }
}

/// A catalog entry with four image slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Car {
    pub id: i32,
    pub name: String,
    pub version: f64,
    pub price: f64,
    pub fuel_type: FuelType,
    pub mileage: i32,
    pub engine: String,
    pub transmission: String,
    pub seat: i32,
    pub color: Color,
    pub rating: i32,
    pub power: f64,
    pub new_arrival: bool,
    pub image_one: Option<String>,
    pub image_two: Option<String>,
    pub image_three: Option<String>,
    pub image_four: Option<String>,
}

/// Image slots resolved to absolute URLs when shaping responses.
pub const CAR_IMAGE_FIELDS: &[&str] = &["image_one", "image_two", "image_three", "image_four"];

/// Fields the polymorphic catalog search fans out to.
pub const CAR_SEARCH_FIELDS: SearchFields = SearchFields {
    text: &["name", "engine", "transmission"],
    numeric: &["version", "mileage", "seat", "rating", "power"],
};

/// Image references must point at one of these encodings.
const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[".jpeg", ".jpg", ".png"];

/// Payload for creating a car. Image references arrive separately.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CarDraft {
    pub name: String,
    pub version: f64,
    pub price: f64,
    pub fuel_type: FuelType,
    pub mileage: i32,
    pub engine: String,
    pub transmission: String,
    pub seat: i32,
    pub color: Color,
    pub rating: i32,
    pub power: f64,
    #[serde(default)]
    pub new_arrival: bool,
}

impl CarDraft {
    /// Enforce the numeric minima declared on the catalog schema.
    pub fn validate(&self) -> Result<(), DomainError> {
        let checks: &[(&str, bool)] = &[
            ("name", !self.name.trim().is_empty()),
            ("version", self.version >= 1.0),
            ("price", self.price >= 1.0),
            ("mileage", self.mileage >= 1),
            ("engine", !self.engine.trim().is_empty()),
            ("seat", self.seat >= 1),
            ("rating", self.rating >= 0),
            ("power", self.power >= 1.0),
        ];
        for (field, ok) in checks {
            if !ok {
                return Err(DomainError::invalid_request(format!(
                    "{field} is below its minimum or empty"
                ))
                .on_field(*field));
            }
        }
        Ok(())
    }
}

/// Every catalog entry carries exactly four images with supported encodings.
pub fn validate_image_set(images: &[String]) -> Result<(), DomainError> {
    if images.len() != 4 {
        return Err(
            DomainError::invalid_request("please provide 4 image references")
                .on_field("product_image"),
        );
    }
    images.iter().try_for_each(|image| validate_image_ref(image))
}

/// A single image reference must use a supported encoding.
pub fn validate_image_ref(image: &str) -> Result<(), DomainError> {
    let lowered = image.to_lowercase();
    if SUPPORTED_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(ext))
    {
        Ok(())
    } else {
        Err(DomainError::invalid_request(format!(
            "does not support given file type: {image}"
        ))
        .on_field("product_image"))
    }
}

/// Bulk-update payload: every field is optional; empty strings count as
/// unset, mirroring the clean-empty semantics of the update endpoint.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CarUpdate {
    pub name: Option<String>,
    pub version: Option<f64>,
    pub price: Option<f64>,
    pub fuel_type: Option<FuelType>,
    pub mileage: Option<i32>,
    pub engine: Option<String>,
    pub transmission: Option<String>,
    pub seat: Option<i32>,
    pub color: Option<Color>,
    pub rating: Option<i32>,
    pub power: Option<f64>,
    pub new_arrival: Option<bool>,
    pub image_one: Option<String>,
    pub image_two: Option<String>,
    pub image_three: Option<String>,
    pub image_four: Option<String>,
}

impl CarUpdate {
    /// Drop empty-string text fields so they do not overwrite stored values.
    #[must_use]
    pub fn clean_empty(mut self) -> Self {
        for slot in [
            &mut self.name,
            &mut self.engine,
            &mut self.transmission,
            &mut self.image_one,
            &mut self.image_two,
            &mut self.image_three,
            &mut self.image_four,
        ] {
            if slot.as_deref() == Some("") {
                *slot = None;
            }
        }
        self
    }

    /// Supplied image slots, validated for supported encodings.
    pub fn validate_images(&self) -> Result<(), DomainError> {
        [
            &self.image_one,
            &self.image_two,
            &self.image_three,
            &self.image_four,
        ]
        .into_iter()
        .flatten()
        .try_for_each(|image| validate_image_ref(image))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.version.is_none()
            && self.price.is_none()
            && self.fuel_type.is_none()
            && self.mileage.is_none()
            && self.engine.is_none()
            && self.transmission.is_none()
            && self.seat.is_none()
            && self.color.is_none()
            && self.rating.is_none()
            && self.power.is_none()
            && self.new_arrival.is_none()
            && self.image_one.is_none()
            && self.image_two.is_none()
            && self.image_three.is_none()
            && self.image_four.is_none()
    }
}

/// Optional query filter over every car attribute.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CarFilter {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub version: Option<f64>,
    pub price: Option<f64>,
    pub fuel_type: Option<FuelType>,
    pub mileage: Option<i32>,
    pub engine: Option<String>,
    pub transmission: Option<String>,
    pub seat: Option<i32>,
    pub color: Option<Color>,
    pub rating: Option<i32>,
    pub power: Option<f64>,
    pub new_arrival: Option<bool>,
}

impl QueryFilter for CarFilter {
    fn normalize(&self) -> NormalizedFilter {
        let mut filter = NormalizedFilter::new();
        filter.insert_opt("id", self.id);
        filter.insert_opt("name", self.name.as_deref());
        filter.insert_opt("version", self.version);
        filter.insert_opt("price", self.price);
        filter.insert_opt("fuel_type", self.fuel_type.map(FuelType::as_str));
        filter.insert_opt("mileage", self.mileage);
        filter.insert_opt("engine", self.engine.as_deref());
        filter.insert_opt("transmission", self.transmission.as_deref());
        filter.insert_opt("seat", self.seat);
        filter.insert_opt("color", self.color.map(Color::as_str));
        filter.insert_opt("rating", self.rating);
        filter.insert_opt("power", self.power);
        filter.insert_opt("new_arrival", self.new_arrival);
        filter
    }
}

/// Search query: a required polymorphic term plus a filter subset.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CarSearchFilter {
    pub search: String,
    pub color: Option<Color>,
    pub fuel_type: Option<FuelType>,
    pub price: Option<f64>,
}

impl CarSearchFilter {
    /// Compose the search fan-out with the remaining equality constraints.
    #[must_use]
    pub fn predicate(&self) -> Predicate {
        let term = SearchTerm::parse(&self.search);
        let mut rest = NormalizedFilter::new();
        rest.insert_opt("color", self.color.map(Color::as_str));
        rest.insert_opt("fuel_type", self.fuel_type.map(FuelType::as_str));
        rest.insert_opt("price", self.price);
        CAR_SEARCH_FIELDS
            .predicate(&term)
            .and(Predicate::from_filter(&rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Color::Red, "red")]
    #[case(Color::Black, "black")]
    #[case(Color::Green, "green")]
    #[case(Color::Blue, "blue")]
    #[case(Color::White, "white")]
    fn colors_normalize_to_canonical_names(#[case] color: Color, #[case] expected: &str) {
        let filter = CarFilter {
            color: Some(color),
            ..CarFilter::default()
        };
        let normalized = filter.normalize();
        assert_eq!(
            normalized.get("color"),
            Some(&crate::domain::filter::FilterValue::Text(expected.into()))
        );
        // Serde agrees with the canonical name.
        assert_eq!(serde_json::to_value(color).expect("json"), json!(expected));
    }

    #[rstest]
    fn unset_fields_never_reach_the_normalized_filter() {
        let filter = CarFilter {
            color: Some(Color::Red),
            ..CarFilter::default()
        };
        let normalized = filter.normalize();
        assert_eq!(normalized.len(), 1);
    }

    #[rstest]
    fn draft_validation_enforces_minima() {
        let draft = CarDraft {
            name: "GT".into(),
            version: 0.5,
            price: 100.0,
            fuel_type: FuelType::Petrol,
            mileage: 12,
            engine: "V8".into(),
            transmission: "manual".into(),
            seat: 4,
            color: Color::Red,
            rating: 4,
            power: 120.0,
            new_arrival: true,
        };
        let err = draft.validate().expect_err("version below minimum");
        assert_eq!(err.field(), Some("version"));
    }

    #[rstest]
    fn image_set_requires_exactly_four_supported_references() {
        let three = vec!["a.jpg".into(), "b.jpg".into(), "c.png".into()];
        assert!(validate_image_set(&three).is_err());

        let four = vec![
            "a.jpg".into(),
            "b.jpeg".into(),
            "c.png".into(),
            "d.JPG".into(),
        ];
        assert!(validate_image_set(&four).is_ok());

        let bad_type = vec![
            "a.jpg".into(),
            "b.jpg".into(),
            "c.jpg".into(),
            "d.gif".into(),
        ];
        let err = validate_image_set(&bad_type).expect_err("gif unsupported");
        assert_eq!(err.field(), Some("product_image"));
    }

    #[rstest]
    fn update_clean_empty_drops_blank_text_fields() {
        let update = CarUpdate {
            name: Some(String::new()),
            engine: Some("V6".into()),
            ..CarUpdate::default()
        }
        .clean_empty();
        assert!(update.name.is_none());
        assert_eq!(update.engine.as_deref(), Some("V6"));
    }

    #[rstest]
    fn search_filter_composes_term_with_equality_subset() {
        let search = CarSearchFilter {
            search: "v8".into(),
            color: Some(Color::Black),
            fuel_type: None,
            price: None,
        };
        let predicate = search.predicate();
        assert!(predicate.matches(&json!({ "engine": "twin-turbo V8", "color": "black" })));
        assert!(!predicate.matches(&json!({ "engine": "twin-turbo V8", "color": "red" })));
    }
}
