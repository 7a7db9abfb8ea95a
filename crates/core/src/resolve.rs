//! Resolution pipeline: classify, ask otodb, fall back to the platform if allowed.
//!
//! Order is fixed. otodb is always asked first because only it can attach a
//! cross-platform work id; a platform fallback runs only on an otodb miss and
//! never on a failed work-record fetch.

use std::sync::Arc;

use serde::Serialize;

use crate::aggregator::{AggregatorClient, WorkId};
use crate::classify::QueryClassifier;
use crate::config::AppConfig;
use crate::error::LookupError;
use crate::fallback::niconico::NiconicoGuestWatch;
use crate::fallback::FallbackRegistry;
use crate::platform::{Platform, PlatformReference};

/// Title and thumbnail for a reference. `canonical_id` is set only when otodb
/// produced the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMetadata {
    pub title: String,
    pub thumbnail: String,
    pub canonical_id: Option<WorkId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// No query given.
    NoQuery,
    /// Query did not match any platform.
    InvalidQuery,
    Success(ResolvedMetadata),
    /// otodb had no record and the platform has no (working) fallback.
    CannotFallback,
    /// otodb knows the work id but its record could not be read.
    Unknown,
}

impl ResolutionOutcome {
    /// Envelope `message` value.
    pub fn message(&self) -> &'static str {
        match self {
            ResolutionOutcome::NoQuery => "NO_QUERY",
            ResolutionOutcome::InvalidQuery => "INVALID_QUERY",
            ResolutionOutcome::Success(_) => "SUCCESS",
            ResolutionOutcome::CannotFallback => "CANNOT_FALLBACK",
            ResolutionOutcome::Unknown => "UNKNOWN",
        }
    }

    pub fn metadata(&self) -> Option<&ResolvedMetadata> {
        match self {
            ResolutionOutcome::Success(meta) => Some(meta),
            _ => None,
        }
    }
}

/// A finished resolution together with the query it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub original_query: Option<String>,
    pub parsed_query: Option<PlatformReference>,
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    pub fn no_query() -> Self {
        Self {
            original_query: None,
            parsed_query: None,
            outcome: ResolutionOutcome::NoQuery,
        }
    }

    pub fn invalid_query(raw: &str) -> Self {
        Self {
            original_query: Some(raw.to_string()),
            parsed_query: None,
            outcome: ResolutionOutcome::InvalidQuery,
        }
    }

    pub fn resolved(raw: &str, reference: PlatformReference, outcome: ResolutionOutcome) -> Self {
        Self {
            original_query: Some(raw.to_string()),
            parsed_query: Some(reference),
            outcome,
        }
    }
}

pub struct MetadataResolver {
    classifier: QueryClassifier,
    aggregator: AggregatorClient,
    fallbacks: FallbackRegistry,
}

impl MetadataResolver {
    pub fn new(classifier: QueryClassifier, aggregator: AggregatorClient, fallbacks: FallbackRegistry) -> Self {
        Self {
            classifier,
            aggregator,
            fallbacks,
        }
    }

    /// Build the full pipeline (shared HTTP client, otodb, Niconico fallback) from config.
    pub fn from_config(config: &AppConfig) -> Result<Self, LookupError> {
        let http = config.http.build_client()?;
        let classifier = QueryClassifier::new().with_soundcloud(config.classifier.soundcloud);
        let aggregator = AggregatorClient::with_base_url(http.clone(), config.aggregator.base_url.clone());

        let mut fallbacks = FallbackRegistry::new();
        if config.niconico.enabled {
            let niconico = NiconicoGuestWatch::new(http)
                .with_base_url(config.niconico.base_url.clone())
                .with_frontend(config.niconico.frontend_id.clone(), config.niconico.frontend_version.clone())
                .with_user_agent(config.niconico.user_agent.clone());
            fallbacks.register(Platform::Niconico, Arc::new(niconico));
        }

        Ok(Self::new(classifier, aggregator, fallbacks))
    }

    pub fn classify(&self, raw: &str) -> Option<PlatformReference> {
        self.classifier.classify(raw)
    }

    pub fn fallbacks(&self) -> &FallbackRegistry {
        &self.fallbacks
    }

    /// Resolve a raw query end to end.
    pub async fn resolve(&self, raw: Option<&str>) -> Resolution {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                tracing::info!(outcome = "NO_QUERY", "lookup resolved");
                return Resolution::no_query();
            }
        };

        let Some(reference) = self.classify(raw) else {
            tracing::info!(query = raw, outcome = "INVALID_QUERY", "lookup resolved");
            return Resolution::invalid_query(raw);
        };
        tracing::debug!(query = raw, platform = %reference.platform, id = %reference.id, "query classified");

        let outcome = self.resolve_reference(&reference).await;
        tracing::info!(
            query = raw,
            platform = %reference.platform,
            id = %reference.id,
            outcome = outcome.message(),
            "lookup resolved"
        );
        Resolution::resolved(raw, reference, outcome)
    }

    /// Resolve an already-classified reference.
    pub async fn resolve_reference(&self, reference: &PlatformReference) -> ResolutionOutcome {
        if let Some(work_id) = self.aggregator.lookup_external_id(reference).await {
            tracing::debug!(work_id, "otodb work found");
            return match self.aggregator.fetch_work(work_id).await {
                Some(meta) => ResolutionOutcome::Success(meta),
                None => ResolutionOutcome::Unknown,
            };
        }

        let Some(provider) = self.fallbacks.get(reference.platform) else {
            tracing::debug!(platform = %reference.platform, "no fallback for platform");
            return ResolutionOutcome::CannotFallback;
        };

        tracing::debug!(provider = provider.name(), id = %reference.id, "trying platform fallback");
        match provider.fetch_fallback(&reference.id).await {
            Some(meta) => ResolutionOutcome::Success(ResolvedMetadata {
                title: meta.title,
                thumbnail: meta.thumbnail,
                canonical_id: None,
            }),
            None => ResolutionOutcome::CannotFallback,
        }
    }
}

impl std::fmt::Debug for MetadataResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataResolver")
            .field("classifier", &self.classifier)
            .field("aggregator", &self.aggregator.base_url())
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_messages() {
        assert_eq!(ResolutionOutcome::NoQuery.message(), "NO_QUERY");
        assert_eq!(ResolutionOutcome::InvalidQuery.message(), "INVALID_QUERY");
        assert_eq!(ResolutionOutcome::CannotFallback.message(), "CANNOT_FALLBACK");
        assert_eq!(ResolutionOutcome::Unknown.message(), "UNKNOWN");
        let meta = ResolvedMetadata {
            title: "t".into(),
            thumbnail: "u".into(),
            canonical_id: None,
        };
        let success = ResolutionOutcome::Success(meta.clone());
        assert_eq!(success.message(), "SUCCESS");
        assert_eq!(success.metadata(), Some(&meta));
        assert_eq!(ResolutionOutcome::Unknown.metadata(), None);
    }

    #[test]
    fn test_from_config_registers_niconico_only() {
        let resolver = MetadataResolver::from_config(&AppConfig::default()).unwrap();
        assert_eq!(resolver.fallbacks().platforms(), vec![Platform::Niconico]);

        let mut config = AppConfig::default();
        config.niconico.enabled = false;
        let resolver = MetadataResolver::from_config(&config).unwrap();
        assert!(resolver.fallbacks().platforms().is_empty());
    }

    #[test]
    fn test_from_config_soundcloud_policy() {
        let resolver = MetadataResolver::from_config(&AppConfig::default()).unwrap();
        assert_eq!(resolver.classify("https://soundcloud.com/a/b"), None);

        let mut config = AppConfig::default();
        config.classifier.soundcloud = true;
        let resolver = MetadataResolver::from_config(&config).unwrap();
        assert_eq!(
            resolver.classify("https://soundcloud.com/a/b"),
            Some(PlatformReference::new(Platform::SoundCloud, "a/b"))
        );
    }

    #[tokio::test]
    async fn test_empty_and_missing_queries_short_circuit() {
        let resolver = MetadataResolver::from_config(&AppConfig::default()).unwrap();
        assert_eq!(resolver.resolve(None).await, Resolution::no_query());
        assert_eq!(resolver.resolve(Some("")).await, Resolution::no_query());
        assert_eq!(
            resolver.resolve(Some("https://example.com/x")).await,
            Resolution::invalid_query("https://example.com/x")
        );
    }
}
