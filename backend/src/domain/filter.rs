//! Dynamic filtering primitives shared by every resource endpoint.
//!
//! Resource filter structs declare optional fields; [`NormalizedFilter`]
//! keeps only the fields a caller actually supplied. [`Predicate`] is the
//! composed query condition as *data* (a tagged tree of field/operator/value
//! leaves) so storage adapters can interpret it per table and tests can
//! evaluate it in memory without a database.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::DomainError;

/// Concrete value carried by a filter entry or predicate leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
}

impl FilterValue {
    /// Canonical JSON rendering, used by the in-memory evaluator.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Bool(b) => Value::Bool(*b),
            Self::DateTime(ts) => Value::String(ts.to_rfc3339()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

/// The non-null subset of a resource filter's fields, in declaration order.
///
/// ## Invariants
/// - No entry holds a null or empty-text value; absence means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFilter {
    entries: Vec<(String, FilterValue)>,
}

impl NormalizedFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a supplied field. Empty text values are dropped to preserve the
    /// no-empty-entries invariant.
    pub fn insert(&mut self, field: &str, value: impl Into<FilterValue>) {
        let value = value.into();
        if let FilterValue::Text(text) = &value {
            if text.is_empty() {
                return;
            }
        }
        self.entries.push((field.to_owned(), value));
    }

    /// Record a field only when the caller supplied it.
    pub fn insert_opt<V: Into<FilterValue>>(&mut self, field: &str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(field, value);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Remove and return an entry, as the search endpoint does with its
    /// `search` key before building the equality set.
    pub fn remove(&mut self, field: &str) -> Option<FilterValue> {
        let index = self.entries.iter().position(|(name, _)| name == field)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Resource filter structs expose their supplied fields through this seam.
pub trait QueryFilter {
    fn normalize(&self) -> NormalizedFilter;
}

/// Composable boolean condition over stored records.
///
/// Adapters translate the tree into backend-native expressions; the
/// [`Predicate::matches`] evaluator gives tests and in-memory doubles the
/// same semantics without a storage engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record; produced by an empty filter.
    All,
    /// Field equality.
    Eq { field: String, value: FilterValue },
    /// Case-insensitive substring match on a text field.
    ContainsI { field: String, needle: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction of equality constraints from a normalized filter.
    #[must_use]
    pub fn from_filter(filter: &NormalizedFilter) -> Self {
        if filter.is_empty() {
            return Self::All;
        }
        let leaves = filter
            .iter()
            .map(|(field, value)| Self::Eq {
                field: field.to_owned(),
                value: value.clone(),
            })
            .collect::<Vec<_>>();
        if leaves.len() == 1 {
            leaves.into_iter().next().unwrap_or(Self::All)
        } else {
            Self::And(leaves)
        }
    }

    /// Conjoin this predicate with another, collapsing `All` operands.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, other) => other,
            (this, Self::All) => this,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), right) => {
                left.push(right);
                Self::And(left)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Evaluate the predicate against a JSON record.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => {
                let Some(actual) = record.get(field) else {
                    return false;
                };
                match (actual, value.as_f64()) {
                    // Numeric comparison is widened so 6 matches 6.0.
                    (Value::Number(n), Some(expected)) => {
                        n.as_f64().is_some_and(|actual| actual == expected)
                    }
                    _ => *actual == value.to_json(),
                }
            }
            Self::ContainsI { field, needle } => record
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
            Self::And(children) => children.iter().all(|child| child.matches(record)),
            Self::Or(children) => children.iter().any(|child| child.matches(record)),
        }
    }
}

/// Polymorphic search term: text terms drive substring search, numeric terms
/// drive exact equality. Any other shape is a contract violation.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchTerm {
    Text(String),
    Number(f64),
}

impl SearchTerm {
    /// Parse a raw query-string value, preferring numeric interpretation.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Ok(int) = raw.parse::<i64>() {
            return Self::Number(int as f64);
        }
        if let Ok(float) = raw.parse::<f64>() {
            return Self::Number(float);
        }
        Self::Text(raw.to_owned())
    }

    /// Accept a term carried in a JSON document, rejecting anything that is
    /// not a string or number. Query-string terms are always textual and go
    /// through [`SearchTerm::parse`]; this guards typed ingestion paths.
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| DomainError::invalid_request("search term is not a finite number")),
            other => Err(DomainError::invalid_request(format!(
                "search term must be a string or number, got {other}"
            ))
            .on_field("search")),
        }
    }
}

/// Per-resource configuration naming which fields a search term fans out to.
#[derive(Debug, Clone, Copy)]
pub struct SearchFields {
    pub text: &'static [&'static str],
    pub numeric: &'static [&'static str],
}

impl SearchFields {
    /// Build the OR fan-out for a term: text terms hit the text fields with
    /// case-insensitive contains, numeric terms hit the numeric fields with
    /// exact equality. Exactly one family is active per search.
    #[must_use]
    pub fn predicate(&self, term: &SearchTerm) -> Predicate {
        let leaves: Vec<Predicate> = match term {
            SearchTerm::Text(needle) => self
                .text
                .iter()
                .map(|field| Predicate::ContainsI {
                    field: (*field).to_owned(),
                    needle: needle.clone(),
                })
                .collect(),
            SearchTerm::Number(number) => self
                .numeric
                .iter()
                .map(|field| Predicate::Eq {
                    field: (*field).to_owned(),
                    value: FilterValue::Float(*number),
                })
                .collect(),
        };
        Predicate::Or(leaves)
    }
}
