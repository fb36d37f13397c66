//! Uniform response envelope and record shaping.
//!
//! Every operation answers with the same wrapper: a logical status code, a
//! field-tagged error map, an optional description, and a data array. Records
//! are shaped through serde and file-backed fields (car images, avatars) are
//! rewritten to absolute retrieval URLs on the way out. Shaping never mutates
//! the source record; it works on an owned JSON projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use utoipa::ToSchema;

use crate::domain::{DomainError, ErrorCode};

/// Logical status carried inside the body; the transport status mirrors it.
const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;
const STATUS_BAD_REQUEST: u16 = 400;
const STATUS_UNAUTHORIZED: u16 = 401;
const STATUS_NOT_FOUND: u16 = 404;
const STATUS_BAD_GATEWAY: u16 = 502;
const STATUS_INTERNAL: u16 = 500;

/// Uniform success/error payload returned by every operation.
///
/// ## Invariants
/// - A non-empty `error` map implies `status_code >= 400`.
/// - `data` is always present, possibly empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Envelope {
    pub status_code: u16,
    pub error: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::ok()
    }
}

impl Envelope {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status_code: STATUS_OK,
            error: BTreeMap::new(),
            description: None,
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn created(description: impl Into<String>) -> Self {
        let mut envelope = Self::ok();
        envelope.status_code = STATUS_CREATED;
        envelope.description = Some(description.into());
        envelope
    }

    /// Fold a domain failure into the envelope, tagging the error map with
    /// the field the failure names (or `detail` when untagged).
    #[must_use]
    pub fn failure(error: &DomainError) -> Self {
        let mut envelope = Self::ok();
        envelope.status_code = status_for(error.code());
        let key = error.field().unwrap_or("detail").to_owned();
        envelope.error.insert(key, error.message().to_owned());
        envelope.description = Some(error.message().to_owned());
        envelope
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<Value>) -> Self {
        self.data = data;
        self
    }

    /// Add a field-tagged error, forcing the status into the failure range.
    pub fn push_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.error.insert(field.into(), message.into());
        if self.status_code < STATUS_BAD_REQUEST {
            self.status_code = STATUS_BAD_REQUEST;
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status_code >= STATUS_BAD_REQUEST
    }
}

fn status_for(code: ErrorCode) -> u16 {
    match code {
        ErrorCode::InvalidRequest => STATUS_BAD_REQUEST,
        ErrorCode::Unauthorized => STATUS_UNAUTHORIZED,
        ErrorCode::NotFound => STATUS_NOT_FOUND,
        ErrorCode::TransportFailure => STATUS_BAD_GATEWAY,
        ErrorCode::InternalError => STATUS_INTERNAL,
    }
}

/// Resolves stored file references (e.g. `car_image/gt.jpg`) into absolute
/// retrieval URLs against the configured media base.
#[derive(Debug, Clone)]
pub struct FileUrlResolver {
    base: Url,
}

impl FileUrlResolver {
    /// The base should end with a `/` so joins append rather than replace.
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    #[must_use]
    pub fn resolve(&self, stored: &str) -> String {
        self.base
            .join(stored)
            .map_or_else(|_| format!("{}{stored}", self.base), Url::into)
    }
}

/// Shape a single record: project through serde and absolutize file fields.
pub fn shape_one<T: Serialize>(
    record: &T,
    file_fields: &[&str],
    resolver: &FileUrlResolver,
) -> Result<Value, DomainError> {
    let mut value = serde_json::to_value(record)
        .map_err(|err| DomainError::internal(format!("record serialization failed: {err}")))?;
    if let Value::Object(map) = &mut value {
        for field in file_fields {
            if let Some(Value::String(stored)) = map.get(*field) {
                if !stored.is_empty() {
                    let resolved = resolver.resolve(stored);
                    map.insert((*field).to_owned(), Value::String(resolved));
                }
            }
        }
    }
    Ok(value)
}

/// Shape a sequence of records.
pub fn shape_many<T: Serialize>(
    records: &[T],
    file_fields: &[&str],
    resolver: &FileUrlResolver,
) -> Result<Vec<Value>, DomainError> {
    records
        .iter()
        .map(|record| shape_one(record, file_fields, resolver))
        .collect()
}

/// Shape an optional single result: empty data when absent.
pub fn shape_optional<T: Serialize>(
    record: Option<&T>,
    file_fields: &[&str],
    resolver: &FileUrlResolver,
) -> Result<Vec<Value>, DomainError> {
    record.map_or_else(
        || Ok(Vec::new()),
        |record| shape_one(record, file_fields, resolver).map(|value| vec![value]),
    )
}
