//! HTTP routes: `/` (JSON envelope) and `/xml` (XML document).

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use otodb_lookup_core::envelope::LookupEnvelope;
use otodb_lookup_core::error::RenderError;
use otodb_lookup_core::resolve::{Resolution, ResolutionOutcome};

use crate::AppState;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Query pairs for GET / and GET /xml. Only the first `q` counts.
type QueryPairs = Vec<(String, String)>;

fn first_q(pairs: &QueryPairs) -> Option<&str> {
    pairs.iter().find(|(key, _)| key == "q").map(|(_, value)| value.as_str())
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(lookup_json))
        .route("/xml", get(lookup_xml))
        .with_state(state)
}

async fn lookup_json(State(state): State<AppState>, Query(pairs): Query<QueryPairs>) -> Json<LookupEnvelope> {
    Json(lookup(&state, first_q(&pairs)).await)
}

async fn lookup_xml(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let envelope = lookup(&state, first_q(&pairs)).await;
    let body = envelope.to_xml().map_err(ApiError::Render)?;
    Ok(([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body))
}

async fn lookup(state: &AppState, raw: Option<&str>) -> LookupEnvelope {
    let timeout = state.config.request_timeout;
    let resolution = match tokio::time::timeout(timeout, state.resolver.resolve(raw)).await {
        Ok(resolution) => resolution,
        Err(_) => {
            tracing::warn!(query = raw.unwrap_or_default(), ?timeout, "lookup timed out");
            timed_out(state, raw)
        }
    };
    LookupEnvelope::from(&resolution)
}

/// Resolution reported when the deadline cuts a lookup short.
fn timed_out(state: &AppState, raw: Option<&str>) -> Resolution {
    match raw.filter(|r| !r.is_empty()) {
        None => Resolution::no_query(),
        Some(raw) => match state.resolver.classify(raw) {
            Some(reference) => Resolution::resolved(raw, reference, ResolutionOutcome::Unknown),
            None => Resolution::invalid_query(raw),
        },
    }
}

#[derive(Debug)]
enum ApiError {
    Render(RenderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "failed to render lookup response");
        let (status, body) = match &self {
            ApiError::Render(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, body).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Render(e) => write!(f, "{}", e),
        }
    }
}
