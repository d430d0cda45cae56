use std::env;
use std::net::SocketAddr;

use agent_hunt_service::{LimitsConfig, ListingConfig, ServiceConfig};
use axum::http::{header, HeaderValue, Method};
use blob_store::BlobSource;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::errors::ConfigError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];
const DEFAULT_MOCK_BLOB_URL: &str = "http://localhost:8080/blobs";

/// Where identities, agents and the ledger are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
        run_migrations: bool,
    },
    /// Process-local store; contents are lost on exit.
    Memory,
}

/// Runtime settings of the API server.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub storage: StorageBackend,
    pub blob_source: BlobSource,
    pub service: ServiceConfig,
}

impl Settings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let bind_addr = parse_var("BIND_ADDR", var("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?;

        let storage = match var("STORAGE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => StorageBackend::Postgres {
                database_url: required("DATABASE_URL")?,
                max_connections: parse_var(
                    "DATABASE_MAX_CONNECTIONS",
                    var("DATABASE_MAX_CONNECTIONS"),
                    Some(DEFAULT_MAX_CONNECTIONS),
                )?,
                run_migrations: parse_bool("RUN_MIGRATIONS", var("RUN_MIGRATIONS"), true)?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::invalid(
                    "STORAGE_BACKEND",
                    other,
                    "expected postgres or memory",
                ));
            }
        };

        let blob_source = match var("BLOB_STORE").as_deref().unwrap_or("mock") {
            "mock" => BlobSource::mock(
                var("BLOB_PUBLIC_URL").unwrap_or_else(|| DEFAULT_MOCK_BLOB_URL.to_string()),
            ),
            "http" => BlobSource::http(
                required("BLOB_ENDPOINT")?,
                required("BLOB_BUCKET")?,
                required("BLOB_PUBLIC_URL")?,
                var("BLOB_TOKEN"),
            ),
            other => {
                return Err(ConfigError::invalid("BLOB_STORE", other, "expected mock or http"));
            }
        };

        let site_url = var("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        let cors_origins = match var("CORS_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|origin| origin.to_string()).collect(),
        };

        let defaults = LimitsConfig::default();
        let limits = LimitsConfig::default()
            .with_creation_quota(parse_quota(
                "CREATION_QUOTA",
                var("CREATION_QUOTA"),
                defaults.creation_quota,
            )?)
            .with_action_quota(parse_quota(
                "ACTION_QUOTA",
                var("ACTION_QUOTA"),
                defaults.action_quota,
            )?);

        let page_size: usize = parse_var(
            "PAGE_SIZE",
            var("PAGE_SIZE"),
            Some(ListingConfig::default().page_size),
        )?;
        if page_size == 0 {
            return Err(ConfigError::invalid("PAGE_SIZE", "0", "must be at least 1"));
        }

        Ok(Self {
            bind_addr,
            cors_origins,
            storage,
            blob_source,
            service: ServiceConfig {
                limits,
                listing: ListingConfig::with_page_size(page_size),
                site_url,
                ..ServiceConfig::default()
            },
        })
    }

    /// CORS layer allowing the configured origins.
    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let origins = self
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|_| ConfigError::invalid("CORS_ORIGINS", origin, "not a valid origin"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]))
    }
}

fn parse_var<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::invalid(key, &value, "could not be parsed")),
        None => default.ok_or(ConfigError::Missing(key)),
    }
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.map(|v| v.to_ascii_lowercase()).as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ConfigError::invalid(key, other, "expected true or false")),
    }
}

/// A quota is a non-negative count or `unlimited`.
fn parse_quota(
    key: &'static str,
    value: Option<String>,
    default: Option<u32>,
) -> Result<Option<u32>, ConfigError> {
    match value.as_deref() {
        None => Ok(default),
        Some(v) if v.eq_ignore_ascii_case("unlimited") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid(key, v, "expected a count or unlimited")),
    }
}
