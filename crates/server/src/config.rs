//! Server configuration (bind address, request timeout, lookup settings).

use std::time::Duration;

use otodb_lookup_core::config::{load_config, AppConfig};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the lookup server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host:port to bind (e.g. "127.0.0.1:3030" or "0.0.0.0:3030").
    pub bind: String,
    /// Upper bound on one resolution; exceeding it answers `UNKNOWN`.
    pub request_timeout: Duration,
    /// Upstream endpoints and classifier policy.
    pub lookup: AppConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3030".to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            lookup: AppConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build config from the config file, then environment.
    /// - `OTODB_LOOKUP_BIND`: host:port (default: 127.0.0.1:3030)
    /// - `OTODB_LOOKUP_TIMEOUT_MS`: per-request timeout (default: 10000)
    /// - `OTODB_AGGREGATOR_URL`: otodb API base (default: https://otodb.net/api)
    /// - `OTODB_NICONICO_URL`: Niconico base (default: https://www.nicovideo.jp)
    pub fn from_env() -> Self {
        let mut c = Self {
            lookup: load_config(),
            ..Self::default()
        };
        if let Ok(b) = std::env::var("OTODB_LOOKUP_BIND") {
            c.bind = b;
        }
        if let Ok(ms) = std::env::var("OTODB_LOOKUP_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => c.request_timeout = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %ms, "ignoring invalid OTODB_LOOKUP_TIMEOUT_MS"),
            }
        }
        if let Ok(url) = std::env::var("OTODB_AGGREGATOR_URL") {
            c.lookup.aggregator.base_url = url;
        }
        if let Ok(url) = std::env::var("OTODB_NICONICO_URL") {
            c.lookup.niconico.base_url = url;
        }
        c
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind
    }
}
