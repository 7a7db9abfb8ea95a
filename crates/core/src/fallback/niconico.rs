//! Niconico fallback via the guest watch API (`/api/watch/v3_guest/<id>`).

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;

use crate::error::LookupError;
use crate::fallback::{FallbackMetadata, FallbackProvider};

pub const DEFAULT_BASE_URL: &str = "https://www.nicovideo.jp";
pub const DEFAULT_FRONTEND_ID: &str = "6";
pub const DEFAULT_FRONTEND_VERSION: &str = "0";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

const PROVIDER: &str = "niconico";
const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 10;

/// Source of the two variable parts of an `actionTrackId`.
pub trait TrackIdSource: Send + Sync {
    /// Random lowercase base-36 token.
    fn random_token(&self) -> String;
    /// Current unix time in milliseconds.
    fn now_millis(&self) -> i64;
}

/// `rand` + wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrackIdSource;

impl TrackIdSource for SystemTrackIdSource {
    fn random_token(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..TOKEN_LEN)
            .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect()
    }

    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// `<token>_<millis>`, the shape the watch page itself sends.
pub fn action_track_id(source: &dyn TrackIdSource) -> String {
    format!("{}_{}", source.random_token(), source.now_millis())
}

#[derive(Debug, Deserialize)]
struct GuestWatchResponse {
    meta: GuestWatchMeta,
    data: GuestWatchData,
}

#[derive(Debug, Deserialize)]
struct GuestWatchMeta {
    status: u16,
}

#[derive(Debug, Deserialize)]
struct GuestWatchData {
    video: GuestWatchVideo,
}

#[derive(Debug, Deserialize)]
struct GuestWatchVideo {
    id: String,
    title: String,
    thumbnail: GuestWatchThumbnail,
}

#[derive(Debug, Deserialize)]
struct GuestWatchThumbnail {
    ogp: String,
}

pub struct NiconicoGuestWatch {
    http: reqwest::Client,
    base_url: String,
    frontend_id: String,
    frontend_version: String,
    user_agent: String,
    track_ids: Arc<dyn TrackIdSource>,
}

impl NiconicoGuestWatch {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            frontend_id: DEFAULT_FRONTEND_ID.to_string(),
            frontend_version: DEFAULT_FRONTEND_VERSION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            track_ids: Arc::new(SystemTrackIdSource),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_frontend(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.frontend_id = id.into();
        self.frontend_version = version.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_track_ids(mut self, source: Arc<dyn TrackIdSource>) -> Self {
        self.track_ids = source;
        self
    }

    async fn guest_watch(&self, id: &str) -> Result<FallbackMetadata, LookupError> {
        let url = format!("{}/api/watch/v3_guest/{}", self.base_url, id);
        let track_id = action_track_id(self.track_ids.as_ref());
        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("_frontendId", self.frontend_id.as_str()),
                ("_frontendVersion", self.frontend_version.as_str()),
                ("skips", "harmful"),
                ("actionTrackId", track_id.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body = resp.text().await?;
        let parsed: GuestWatchResponse = serde_json::from_str(&body)?;
        if parsed.meta.status != 200 {
            return Err(LookupError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("meta.status {}", parsed.meta.status),
            });
        }

        let video = parsed.data.video;
        tracing::debug!(requested = id, returned = %video.id, "niconico guest watch hit");
        Ok(FallbackMetadata {
            title: video.title,
            thumbnail: video.thumbnail.ogp,
        })
    }
}

impl std::fmt::Debug for NiconicoGuestWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NiconicoGuestWatch")
            .field("base_url", &self.base_url)
            .field("frontend_id", &self.frontend_id)
            .field("frontend_version", &self.frontend_version)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FallbackProvider for NiconicoGuestWatch {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_fallback(&self, id: &str) -> Option<FallbackMetadata> {
        match self.guest_watch(id).await {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!(id, error = %e, "niconico fallback failed");
                None
            }
        }
    }
}
