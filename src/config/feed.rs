// src/config/feed.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

pub const ENV_FEED_CONFIG_PATH: &str = "FEED_CONFIG_PATH";
pub const ENV_FEED_BASE_URL: &str = "FEED_BASE_URL";
pub const DEFAULT_FEED_CONFIG_PATH: &str = "config/feed.toml";

pub const DEFAULT_POLL_CADENCE_SECS: u32 = 60;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 25;

fn default_base_url() -> String {
    "http://127.0.0.1:8000/cgi-bin".to_string()
}
fn default_feed_path() -> String {
    "/feed".to_string()
}
fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}
fn default_poll_cadence_secs() -> u32 {
    DEFAULT_POLL_CADENCE_SECS
}
fn default_user_agent() -> String {
    concat!("meridian-feed/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_feed_path")]
    pub feed_path: String,
    /// Upper bound for one fetch, connect + body.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Seconds between completed polls.
    #[serde(default = "default_poll_cadence_secs")]
    pub poll_cadence_secs: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            feed_path: default_feed_path(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            poll_cadence_secs: default_poll_cadence_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: FeedConfig = toml::from_str(s).context("parsing feed config TOML")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feed config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolution order:
    /// 1) $FEED_CONFIG_PATH (must exist)
    /// 2) config/feed.toml
    /// 3) built-in defaults
    ///
    /// `$FEED_BASE_URL` overrides `base_url` in every case.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_FEED_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_FEED_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_FEED_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };

        if let Ok(url) = env::var(ENV_FEED_BASE_URL) {
            let url = url.trim();
            if !url.is_empty() {
                cfg.base_url = url.to_string();
            }
        }
        Ok(cfg)
    }

    /// Zero durations make no sense; fall back to defaults.
    fn sanitized(mut self) -> Self {
        if self.fetch_timeout_secs == 0 {
            self.fetch_timeout_secs = default_fetch_timeout_secs();
        }
        if self.poll_cadence_secs == 0 {
            self.poll_cadence_secs = default_poll_cadence_secs();
        }
        self
    }

    pub fn feed_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.feed_path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = FeedConfig::from_toml_str(r#"base_url = "https://intel.example/cgi-bin/""#)
            .unwrap();
        assert_eq!(cfg.feed_url(), "https://intel.example/cgi-bin/feed");
        assert_eq!(cfg.poll_cadence_secs, 60);
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(25));
    }

    #[test]
    fn zero_values_fall_back() {
        let cfg =
            FeedConfig::from_toml_str("fetch_timeout_secs = 0\npoll_cadence_secs = 0").unwrap();
        assert_eq!(cfg.fetch_timeout_secs, 25);
        assert_eq!(cfg.poll_cadence_secs, 60);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD so a real config/ in the repo does not leak in.
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_FEED_CONFIG_PATH);
        env::remove_var(ENV_FEED_BASE_URL);

        let cfg = FeedConfig::load_default().unwrap();
        assert_eq!(cfg, FeedConfig::default());

        let p = tmp.path().join("feed.toml");
        fs::write(&p, "feed_path = \"/feed.py\"\npoll_cadence_secs = 30").unwrap();
        env::set_var(ENV_FEED_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_FEED_BASE_URL, "http://localhost:9000");
        let cfg = FeedConfig::load_default().unwrap();
        assert_eq!(cfg.feed_url(), "http://localhost:9000/feed.py");
        assert_eq!(cfg.poll_cadence_secs, 30);

        env::set_var(ENV_FEED_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(FeedConfig::load_default().is_err());

        env::remove_var(ENV_FEED_CONFIG_PATH);
        env::remove_var(ENV_FEED_BASE_URL);
        env::set_current_dir(&old).unwrap();
    }
}
