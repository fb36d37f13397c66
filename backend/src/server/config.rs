//! Application configuration read once from the environment.

use std::net::SocketAddr;

use url::Url;

use crate::domain::AuthConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_PUBLIC_BASE: &str = "http://localhost:8080/";
const DEFAULT_ACCESS_TTL_SECS: i64 = 300;
const DEFAULT_REFRESH_EXTENSION_SECS: i64 = 86_400;

/// Configuration failures surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable: {name}")]
    Missing { name: &'static str },
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    /// Public origin used when building verification links.
    pub public_base: Url,
    /// Base URL stored file references resolve against.
    pub media_base: Url,
    pub google_client_id: String,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing { name })
}

fn optional(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
        name,
        reason: err.to_string(),
    })
}

impl AppConfig {
    /// Read the configuration from the process environment.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required; everything else has a
    /// development default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let secret = required("JWT_SECRET")?;

        let bind_raw = optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr: SocketAddr = parse("BIND_ADDR", &bind_raw)?;

        let access_ttl = match optional("JWT_ACCESS_TTL_SECS") {
            Some(raw) => parse("JWT_ACCESS_TTL_SECS", &raw)?,
            None => DEFAULT_ACCESS_TTL_SECS,
        };
        let refresh_extension = match optional("JWT_REFRESH_EXTENSION_SECS") {
            Some(raw) => parse("JWT_REFRESH_EXTENSION_SECS", &raw)?,
            None => DEFAULT_REFRESH_EXTENSION_SECS,
        };

        let public_raw =
            optional("PUBLIC_BASE_URL").unwrap_or_else(|| DEFAULT_PUBLIC_BASE.to_owned());
        let public_base: Url = parse("PUBLIC_BASE_URL", &public_raw)?;
        let media_base = match optional("MEDIA_BASE_URL") {
            Some(raw) => parse("MEDIA_BASE_URL", &raw)?,
            None => public_base
                .join("media/")
                .map_err(|err| ConfigError::Invalid {
                    name: "PUBLIC_BASE_URL",
                    reason: err.to_string(),
                })?,
        };

        let google_client_id = optional("GOOGLE_CLIENT_ID").unwrap_or_default();

        Ok(Self {
            database_url,
            bind_addr,
            auth: AuthConfig::new(secret, access_ttl, refresh_extension),
            public_base,
            media_base,
            google_client_id,
        })
    }
}
