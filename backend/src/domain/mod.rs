//! Transport-agnostic domain types and the core filtering, shaping, and
//! token mechanisms every endpoint builds on.

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod ports;
pub mod sales;
pub mod shops;

pub use auth::{AuthConfig, Claims, TokenAuthority, TokenError, TokenKind, TokenPair};
pub use envelope::{Envelope, FileUrlResolver};
pub use error::{DomainError, ErrorCode};
pub use filter::{FilterValue, NormalizedFilter, Predicate, QueryFilter, SearchFields, SearchTerm};
