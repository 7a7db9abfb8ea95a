//! Platform-native metadata sources, consulted only when otodb has no record.

pub mod niconico;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::platform::Platform;

/// Metadata from a platform's own API. Never carries an otodb work id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackMetadata {
    pub title: String,
    pub thumbnail: String,
}

#[async_trait]
pub trait FallbackProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Look up a platform id. Any failure is `None`; results are never partial.
    async fn fetch_fallback(&self, id: &str) -> Option<FallbackMetadata>;
}

/// Which platforms have a fallback, and which provider serves each.
#[derive(Clone, Default)]
pub struct FallbackRegistry {
    providers: HashMap<Platform, Arc<dyn FallbackProvider>>,
}

impl FallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` for `platform`, returning the one it replaces.
    pub fn register(
        &mut self,
        platform: Platform,
        provider: Arc<dyn FallbackProvider>,
    ) -> Option<Arc<dyn FallbackProvider>> {
        self.providers.insert(platform, provider)
    }

    pub fn with(mut self, platform: Platform, provider: Arc<dyn FallbackProvider>) -> Self {
        self.register(platform, provider);
        self
    }

    pub fn get(&self, platform: Platform) -> Option<&dyn FallbackProvider> {
        self.providers.get(&platform).map(|p| p.as_ref())
    }

    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.providers.contains_key(p))
            .collect()
    }
}

impl std::fmt::Debug for FallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.platforms()
                    .into_iter()
                    .filter_map(|p| self.get(p).map(|provider| (p, provider.name()))),
            )
            .finish()
    }
}
