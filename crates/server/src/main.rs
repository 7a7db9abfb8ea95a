//! Binary entry point for the otodb lookup server.
//!
//! Serves `GET /?q=<query>` (JSON) and `GET /xml?q=<query>` (XML).

use otodb_lookup_server::{api_routes, config::ServerConfig, AppState};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("otodb_lookup_server=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let state = AppState::new(config)?;

    let app = api_routes(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = state.config.bind_addr();
    tracing::info!(
        aggregator = %state.config.lookup.aggregator.base_url,
        timeout = ?state.config.request_timeout,
        "Lookup server listening on {}",
        addr
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
