//! Supported platforms and classified `(platform, id)` references.

use serde::{Deserialize, Serialize};

/// Video/audio platforms a query can point at.
///
/// Variant names are the wire names: they are sent verbatim as the aggregator's
/// `platform` parameter and appear as-is in rendered envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Niconico,
    YouTube,
    Bilibili,
    SoundCloud,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Niconico,
        Platform::YouTube,
        Platform::Bilibili,
        Platform::SoundCloud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Niconico => "Niconico",
            Platform::YouTube => "YouTube",
            Platform::Bilibili => "Bilibili",
            Platform::SoundCloud => "SoundCloud",
        }
    }

    /// Canonical watch page for an id on this platform.
    pub fn watch_url(&self, id: &str) -> String {
        match self {
            Platform::Niconico => format!("https://www.nicovideo.jp/watch/{}", id),
            Platform::YouTube => format!("https://www.youtube.com/watch?v={}", id),
            Platform::Bilibili => format!("https://www.bilibili.com/video/{}", id),
            Platform::SoundCloud => format!("https://soundcloud.com/{}", id),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified query: which platform, and the id in that platform's canonical form.
///
/// The id may be empty when a recognized URL had nothing after the platform's
/// path delimiter (e.g. `https://www.nicovideo.jp/watch/`). Such references are
/// kept rather than rejected; they simply fail to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformReference {
    pub platform: Platform,
    pub id: String,
}

impl PlatformReference {
    pub fn new(platform: Platform, id: impl Into<String>) -> Self {
        Self {
            platform,
            id: id.into(),
        }
    }

    pub fn watch_url(&self) -> String {
        self.platform.watch_url(&self.id)
    }
}

impl std::fmt::Display for PlatformReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.platform, self.id)
    }
}
