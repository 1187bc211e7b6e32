//! Dashboard configuration
//!
//! Stored as JSON at `~/.livewatch/config.json`. A missing file yields the
//! defaults; a broken file is logged and replaced by the defaults in memory.
//! `LIVEWATCH_API_URL` and `LIVEWATCH_TOKEN` override the file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = ".livewatch";
const CONFIG_FILENAME: &str = "config.json";

pub const ENV_API_URL: &str = "LIVEWATCH_API_URL";
pub const ENV_TOKEN: &str = "LIVEWATCH_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Service root, without the `/api/v1` suffix
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer credential for authenticated calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Header identifying this client to an intermediary tunnel
    #[serde(default = "default_tunnel_header")]
    pub tunnel_header: (String, String),
    /// Directory the service writes uploads into; prefixes upload-derived sources
    #[serde(default = "default_uploads_root")]
    pub uploads_root: String,
    /// Camera source used until the operator edits it ("0" = first local camera)
    #[serde(default = "default_source")]
    pub default_source: String,
    #[serde(default = "default_detection_interval_ms")]
    pub detection_interval_ms: u64,
    #[serde(default = "default_snapshot_interval_ms")]
    pub snapshot_interval_ms: u64,
    /// Consecutive failed ticks before the feed is reported degraded
    #[serde(default = "default_degraded_after")]
    pub degraded_after_failures: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_tunnel_header() -> (String, String) {
    ("ngrok-skip-browser-warning".to_string(), "true".to_string())
}

fn default_uploads_root() -> String {
    "uploads".to_string()
}

fn default_source() -> String {
    "0".to_string()
}

fn default_detection_interval_ms() -> u64 {
    1000
}

fn default_snapshot_interval_ms() -> u64 {
    200
}

fn default_degraded_after() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            tunnel_header: default_tunnel_header(),
            uploads_root: default_uploads_root(),
            default_source: default_source(),
            detection_interval_ms: default_detection_interval_ms(),
            snapshot_interval_ms: default_snapshot_interval_ms(),
            degraded_after_failures: default_degraded_after(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl WatchConfig {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => {
                    log::info!("WatchConfig: loaded {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("WatchConfig: failed to load {:?}: {:#}", path, e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };
        config.apply_env();
        config
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().context("cannot determine home directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("create config dir")?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.api_url)
            .with_context(|| format!("invalid api_url {:?}", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api_url must be http(s), got {}", url.scheme());
        }
        if self.detection_interval_ms == 0 || self.snapshot_interval_ms == 0 {
            anyhow::bail!("poll intervals must be non-zero");
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(api_url) = std::env::var(ENV_API_URL) {
            if !api_url.trim().is_empty() {
                self.api_url = api_url.trim().to_string();
            }
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            self.token = Some(token).filter(|t| !t.trim().is_empty());
        }
    }

    pub fn detection_interval(&self) -> Duration {
        Duration::from_millis(self.detection_interval_ms)
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `~/.livewatch/config.json`
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR).join(CONFIG_FILENAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_live_view_cadence() {
        let config = WatchConfig::default();
        assert_eq!(config.detection_interval(), Duration::from_secs(1));
        assert_eq!(config.snapshot_interval(), Duration::from_millis(200));
        assert_eq!(config.default_source, "0");
        assert_eq!(config.uploads_root, "uploads");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_url":"https://tunnel.example.dev","token":"abc"}"#).unwrap();

        let config = WatchConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://tunnel.example.dev");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.snapshot_interval_ms, 200);
        assert_eq!(config.tunnel_header.0, "ngrok-skip-browser-warning");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = WatchConfig {
            uploads_root: "/content/uploads".to_string(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(WatchConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_url_and_zero_interval() {
        let bad_url = WatchConfig {
            api_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());

        let ftp = WatchConfig {
            api_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(ftp.validate().is_err());

        let zero = WatchConfig {
            snapshot_interval_ms: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }
}
