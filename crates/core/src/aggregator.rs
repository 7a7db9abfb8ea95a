//! otodb aggregator client: external id -> work id -> work record.

use serde::Deserialize;

use crate::error::LookupError;
use crate::platform::PlatformReference;
use crate::resolve::ResolvedMetadata;

pub const DEFAULT_BASE_URL: &str = "https://otodb.net/api";

/// otodb's cross-platform work identifier.
pub type WorkId = u64;

#[derive(Debug, Deserialize)]
struct ExternalQueryResponse {
    work_id: WorkId,
}

#[derive(Debug, Deserialize)]
struct WorkResponse {
    id: WorkId,
    title: String,
    thumbnail: String,
}

/// Thin adapter over otodb's work API.
///
/// Both operations collapse every failure (transport, status, body shape) into
/// `None`. The resolver gives the two `None`s different meanings.
#[derive(Debug, Clone)]
pub struct AggregatorClient {
    http: reqwest::Client,
    base_url: String,
}

impl AggregatorClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a platform reference to an otodb work id.
    pub async fn lookup_external_id(&self, reference: &PlatformReference) -> Option<WorkId> {
        match self.query_external(reference).await {
            Ok(work_id) => Some(work_id),
            Err(e) => {
                tracing::debug!(
                    platform = %reference.platform,
                    id = %reference.id,
                    error = %e,
                    "otodb has no work for external id"
                );
                None
            }
        }
    }

    /// Fetch the work record for a known work id.
    pub async fn fetch_work(&self, work_id: WorkId) -> Option<ResolvedMetadata> {
        match self.query_work(work_id).await {
            Ok(work) => {
                if work.id != work_id {
                    tracing::warn!(requested = work_id, returned = work.id, "otodb returned a different work id");
                }
                Some(ResolvedMetadata {
                    title: work.title,
                    thumbnail: work.thumbnail,
                    canonical_id: Some(work_id),
                })
            }
            Err(e) => {
                tracing::warn!(work_id, error = %e, "otodb work record could not be fetched");
                None
            }
        }
    }

    async fn query_external(&self, reference: &PlatformReference) -> Result<WorkId, LookupError> {
        let url = format!("{}/work/query_external", self.base_url);
        let body = self
            .http
            .get(&url)
            .query(&[("platform", reference.platform.as_str()), ("id", reference.id.as_str())])
            .send()
            .await?
            .text()
            .await?;
        let parsed: ExternalQueryResponse = serde_json::from_str(&body)?;
        Ok(parsed.work_id)
    }

    async fn query_work(&self, work_id: WorkId) -> Result<WorkResponse, LookupError> {
        let url = format!("{}/work/work", self.base_url);
        let body = self
            .http
            .get(&url)
            .query(&[("work_id", work_id)])
            .send()
            .await?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
