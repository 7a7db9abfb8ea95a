//! otodb lookup HTTP server.
//!
//! Exposes the resolver over HTTP: `GET /?q=` answers with the JSON envelope and
//! `GET /xml?q=` with the same result as an XML document. Every resolution
//! outcome is a 200; only rendering failures produce an error status.

pub mod api;
pub mod config;

use std::sync::Arc;

use axum::Router;
use otodb_lookup_core::error::LookupError;
use otodb_lookup_core::resolve::MetadataResolver;

use crate::config::ServerConfig;

/// Shared application state (resolver and config).
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<MetadataResolver>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, LookupError> {
        let resolver = Arc::new(MetadataResolver::from_config(&config.lookup)?);
        tracing::debug!(?resolver, "resolver ready");
        Ok(Self { resolver, config })
    }
}

/// Build API routes with state.
pub fn api_routes(state: AppState) -> Router {
    api::routes(state)
}
