//! Config file parsing for `~/.config/otodb-lookup/config.toml`.
//!
//! Every section and field is optional; a missing file means defaults.
//! Use `MetadataResolver::from_config` to build the pipeline from a loaded config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LookupError};
use crate::{aggregator, fallback::niconico};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub niconico: NiconicoConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default = "default_aggregator_url")]
    pub base_url: String,
}

fn default_aggregator_url() -> String {
    aggregator::DEFAULT_BASE_URL.to_string()
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_aggregator_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NiconicoConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_niconico_url")]
    pub base_url: String,
    #[serde(default = "default_frontend_id")]
    pub frontend_id: String,
    #[serde(default = "default_frontend_version")]
    pub frontend_version: String,
    #[serde(default = "default_niconico_user_agent")]
    pub user_agent: String,
}

fn default_true() -> bool {
    true
}
fn default_niconico_url() -> String {
    niconico::DEFAULT_BASE_URL.to_string()
}
fn default_frontend_id() -> String {
    niconico::DEFAULT_FRONTEND_ID.to_string()
}
fn default_frontend_version() -> String {
    niconico::DEFAULT_FRONTEND_VERSION.to_string()
}
fn default_niconico_user_agent() -> String {
    niconico::DEFAULT_USER_AGENT.to_string()
}

impl Default for NiconicoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_niconico_url(),
            frontend_id: default_frontend_id(),
            frontend_version: default_frontend_version(),
            user_agent: default_niconico_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Recognize `soundcloud.com/<artist>/<track>` URLs.
    #[serde(default)]
    pub soundcloud: bool,
}

/// Settings for the HTTP client shared by otodb and the fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub user_agent: Option<String>,
    /// Whole-request timeout. Unset means no client-side timeout.
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, LookupError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}

impl AppConfig {
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load config from the default path. Missing or invalid files give defaults.
pub fn load_config() -> AppConfig {
    let Some(path) = config_path() else {
        return AppConfig::default();
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match load_config_from(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
            AppConfig::default()
        }
    }
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Write `config` to `path`, creating parent directories.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)?;
    Ok(())
}

/// Return the default config file path (for init and show).
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("otodb-lookup");
        p.push("config.toml");
        p
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.aggregator.base_url, "https://otodb.net/api");
        assert!(cfg.niconico.enabled);
        assert_eq!(cfg.niconico.frontend_id, "6");
        assert!(!cfg.classifier.soundcloud);
        assert_eq!(cfg.http.timeout_secs, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
[niconico]
enabled = false

[classifier]
soundcloud = true

[http]
timeout_secs = 5
"#,
        )
        .unwrap();
        assert!(!cfg.niconico.enabled);
        assert_eq!(cfg.niconico.base_url, "https://www.nicovideo.jp");
        assert!(cfg.classifier.soundcloud);
        assert_eq!(cfg.http.timeout_secs, Some(5));
        assert_eq!(cfg.aggregator, AggregatorConfig::default());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.aggregator.base_url = "http://localhost:8080/api".to_string();
        cfg.http.user_agent = Some("otodb-lookup-test".to_string());

        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[niconico]\nenabled = \"yes\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn build_client_with_options() {
        let http = HttpConfig {
            user_agent: Some("otodb-lookup".to_string()),
            timeout_secs: Some(3),
        };
        assert!(http.build_client().is_ok());
    }
}
