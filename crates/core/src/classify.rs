//! Query classification via URL host dispatch and bare-id patterns.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::platform::{Platform, PlatformReference};

// ASCII classes on purpose: `\w` and `\d` are Unicode-aware in `regex`.
static NICONICO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(sm|nm)[0-9]+$").expect("valid niconico id pattern"));
static YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid youtube id pattern"));
static BILIBILI_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^BV[a-zA-Z0-9]{10}$").expect("valid bilibili id pattern"));

/// Turns free-text queries into platform references.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClassifier {
    /// Accept `soundcloud.com/<artist>/<track>` URLs. Off unless configured.
    pub soundcloud: bool,
}

impl QueryClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_soundcloud(mut self, enabled: bool) -> Self {
        self.soundcloud = enabled;
        self
    }

    /// Classify a raw query. Returns `None` for anything unrecognized; never panics.
    pub fn classify(&self, raw: &str) -> Option<PlatformReference> {
        // 1. Absolute URL: dispatch on host
        if let Ok(url) = Url::parse(raw) {
            return self.classify_url(&url);
        }

        // 2. Bare id: first matching pattern wins
        classify_bare_id(raw)
    }

    fn classify_url(&self, url: &Url) -> Option<PlatformReference> {
        let path = url.path();
        match url.host_str()? {
            "nicovideo.jp" | "www.nicovideo.jp" => Some(PlatformReference::new(
                Platform::Niconico,
                path.split("/watch/").nth(1).unwrap_or(""),
            )),
            "youtube.com" | "www.youtube.com" => {
                if path != "/watch" {
                    return None;
                }
                url.query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())
                    .filter(|v| !v.is_empty())
                    .map(|v| PlatformReference::new(Platform::YouTube, v))
            }
            "youtu.be" => Some(PlatformReference::new(
                Platform::YouTube,
                path.strip_prefix('/').unwrap_or(path),
            )),
            "bilibili.com" | "www.bilibili.com" => {
                if !path.starts_with("/video/") {
                    return None;
                }
                Some(PlatformReference::new(
                    Platform::Bilibili,
                    path.split("/video/").nth(1).unwrap_or(""),
                ))
            }
            "soundcloud.com" if self.soundcloud => {
                let segments: Vec<&str> = path.split('/').skip(1).collect();
                if segments.len() != 2 || segments.iter().any(|s| s.is_empty()) {
                    return None;
                }
                Some(PlatformReference::new(
                    Platform::SoundCloud,
                    path.strip_prefix('/').unwrap_or(path),
                ))
            }
            _ => None,
        }
    }
}

/// Classify with the default policy (SoundCloud disabled).
pub fn classify(raw: &str) -> Option<PlatformReference> {
    QueryClassifier::default().classify(raw)
}

fn classify_bare_id(raw: &str) -> Option<PlatformReference> {
    let platform = if NICONICO_ID.is_match(raw) {
        Platform::Niconico
    } else if YOUTUBE_ID.is_match(raw) {
        Platform::YouTube
    } else if BILIBILI_ID.is_match(raw) {
        Platform::Bilibili
    } else {
        return None;
    };
    Some(PlatformReference::new(platform, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference(platform: Platform, id: &str) -> Option<PlatformReference> {
        Some(PlatformReference::new(platform, id))
    }

    #[test]
    fn test_bare_niconico_ids() {
        assert_eq!(classify("sm9"), reference(Platform::Niconico, "sm9"));
        assert_eq!(classify("nm2829323"), reference(Platform::Niconico, "nm2829323"));
        assert_eq!(classify("so12345"), None);
        assert_eq!(classify("sm"), None);
    }

    #[test]
    fn test_bare_youtube_id() {
        assert_eq!(classify("dQw4w9WgXcQ"), reference(Platform::YouTube, "dQw4w9WgXcQ"));
        assert_eq!(classify("a-b_c-d_e-f"), reference(Platform::YouTube, "a-b_c-d_e-f"));
        assert_eq!(classify("dQw4w9WgXc"), None);
    }

    #[test]
    fn test_eleven_char_niconico_id_wins_over_youtube() {
        assert_eq!(classify("sm123456789"), reference(Platform::Niconico, "sm123456789"));
    }

    #[test]
    fn test_bare_bilibili_id() {
        assert_eq!(classify("BV1GJ411x7h7"), reference(Platform::Bilibili, "BV1GJ411x7h7"));
        assert_eq!(classify("BV1GJ411x7h"), reference(Platform::YouTube, "BV1GJ411x7h"));
        assert_eq!(classify("av170001"), None);
    }

    #[test]
    fn test_non_ascii_ids_rejected() {
        assert_eq!(classify("ｓｍ９"), None);
        assert_eq!(classify("dQw4w9WgXcé"), None);
        assert_eq!(classify("sm١٢٣"), None);
    }

    #[test]
    fn test_niconico_urls() {
        assert_eq!(
            classify("https://www.nicovideo.jp/watch/sm9"),
            reference(Platform::Niconico, "sm9")
        );
        assert_eq!(
            classify("https://nicovideo.jp/watch/sm9?ref=search"),
            reference(Platform::Niconico, "sm9")
        );
        assert_eq!(
            classify("HTTPS://WWW.NICOVIDEO.JP/watch/nm2829323"),
            reference(Platform::Niconico, "nm2829323")
        );
    }

    #[test]
    fn test_niconico_url_without_watch_segment_yields_empty_id() {
        assert_eq!(
            classify("https://www.nicovideo.jp/watch/"),
            reference(Platform::Niconico, "")
        );
        assert_eq!(
            classify("https://www.nicovideo.jp/ranking"),
            reference(Platform::Niconico, "")
        );
    }

    #[test]
    fn test_youtube_watch_urls() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            reference(Platform::YouTube, "dQw4w9WgXcQ")
        );
        assert_eq!(
            classify("https://youtube.com/watch?list=PL1&v=dQw4w9WgXcQ&t=42"),
            reference(Platform::YouTube, "dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_youtube_urls_rejected() {
        assert_eq!(classify("https://www.youtube.com/watch"), None);
        assert_eq!(classify("https://www.youtube.com/watch?v="), None);
        assert_eq!(classify("https://www.youtube.com/watch/?v=dQw4w9WgXcQ"), None);
        assert_eq!(classify("https://www.youtube.com/shorts/dQw4w9WgXcQ"), None);
        assert_eq!(classify("https://m.youtube.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_youtu_be_urls() {
        assert_eq!(
            classify("https://youtu.be/dQw4w9WgXcQ"),
            reference(Platform::YouTube, "dQw4w9WgXcQ")
        );
        assert_eq!(
            classify("https://youtu.be/dQw4w9WgXcQ?t=10"),
            reference(Platform::YouTube, "dQw4w9WgXcQ")
        );
        assert_eq!(classify("https://youtu.be"), reference(Platform::YouTube, ""));
    }

    #[test]
    fn test_bilibili_urls() {
        assert_eq!(
            classify("https://www.bilibili.com/video/BV1GJ411x7h7"),
            reference(Platform::Bilibili, "BV1GJ411x7h7")
        );
        assert_eq!(
            classify("https://bilibili.com/video/BV1GJ411x7h7?p=2"),
            reference(Platform::Bilibili, "BV1GJ411x7h7")
        );
        assert_eq!(
            classify("https://www.bilibili.com/video/"),
            reference(Platform::Bilibili, "")
        );
        assert_eq!(classify("https://www.bilibili.com/bangumi/play/ep1"), None);
    }

    #[test]
    fn test_soundcloud_disabled_by_default() {
        assert_eq!(classify("https://soundcloud.com/artist/track"), None);
    }

    #[test]
    fn test_soundcloud_when_enabled() {
        let classifier = QueryClassifier::new().with_soundcloud(true);
        assert_eq!(
            classifier.classify("https://soundcloud.com/artist/track"),
            reference(Platform::SoundCloud, "artist/track")
        );
        assert_eq!(classifier.classify("https://soundcloud.com/artist"), None);
        assert_eq!(classifier.classify("https://soundcloud.com/artist/"), None);
        assert_eq!(classifier.classify("https://soundcloud.com/artist/sets/album"), None);
        assert_eq!(classifier.classify("https://www.soundcloud.com/artist/track"), None);
    }

    #[test]
    fn test_unknown_hosts_and_schemes() {
        assert_eq!(classify("https://example.com/x"), None);
        assert_eq!(classify("https://example.com/watch/sm9"), None);
        assert_eq!(classify("mailto:someone@example.com"), None);
        assert_eq!(classify("file:///watch/sm9"), None);
    }

    #[test]
    fn test_garbage_is_unrecognized() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   "), None);
        assert_eq!(classify("http://"), None);
        assert_eq!(classify("\u{0}\u{1}\u{7f}"), None);
        assert_eq!(classify("sm9 "), None);
    }

    proptest! {
        #[test]
        fn classify_is_total(raw in "\\PC*") {
            let _ = classify(&raw);
            let _ = QueryClassifier::new().with_soundcloud(true).classify(&raw);
        }

        #[test]
        fn bare_niconico_ids_keep_their_text(n in 0u64..u64::MAX, prefix in "sm|nm") {
            let id = format!("{}{}", prefix, n);
            prop_assert_eq!(classify(&id), reference(Platform::Niconico, &id));
        }

        #[test]
        fn bare_youtube_ids_keep_their_text(id in "[A-Za-z0-9_-]{11}") {
            prop_assume!(!NICONICO_ID.is_match(&id));
            prop_assert_eq!(classify(&id), reference(Platform::YouTube, &id));
        }

        #[test]
        fn bare_bilibili_ids_keep_their_text(id in "BV[a-zA-Z0-9]{10}") {
            prop_assert_eq!(classify(&id), reference(Platform::Bilibili, &id));
        }

        #[test]
        fn youtu_be_urls_extract_path(id in "[A-Za-z0-9_-]{11}") {
            let url = format!("https://youtu.be/{}", id);
            prop_assert_eq!(classify(&url), reference(Platform::YouTube, &id));
        }
    }
}
