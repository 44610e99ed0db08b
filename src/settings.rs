//! TOML settings for the edgepick client.
//!
//! Where the remote engine lives, how long the run connection may take to
//! open, and how the client logs. Every section falls back to defaults, so an
//! empty file (or no file at all) is a working setup.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::session::transport::run_url;

/// File picked up from the working directory when no path is given.
pub const LOCAL_SETTINGS_FILE: &str = "edgepick.toml";

/// Environment variable naming an explicit settings file.
pub const SETTINGS_ENV: &str = "EDGEPICK_CONFIG";

// ---------------------------------------------------------------------------
// Top-level settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl ClientSettings {
    /// Load settings from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse settings file: {}", path.display()))?;
        info!(path = %path.display(), "loaded client settings");
        Ok(settings)
    }

    /// Resolve settings in order:
    /// 1. `explicit` (from `--settings` or `EDGEPICK_CONFIG`); failure is fatal.
    /// 2. `./edgepick.toml`, if present; failure falls back to defaults.
    /// 3. Compiled-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        Ok(Self::load_local_or_default(Path::new(LOCAL_SETTINGS_FILE)))
    }

    fn load_local_or_default(local: &Path) -> Self {
        if local.exists() {
            match Self::load(local) {
                Ok(settings) => return settings,
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local settings file could not be loaded, using defaults"
                    );
                }
            }
        }
        debug!("no settings file found, using compiled-in defaults");
        Self::default()
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.server.base_url)
            .with_context(|| format!("invalid server base url: {}", self.server.base_url))
    }

    /// WebSocket endpoint of the run channel.
    pub fn run_url(&self) -> Result<Url> {
        let base = self.base_url()?;
        run_url(&base, &self.server.run_path).context("cannot derive run channel url")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.session.open_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Location of the remote engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// HTTP base of the configuration API.
    pub base_url: String,
    /// Path of the run channel, relative to `base_url`.
    pub run_path: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            run_path: "/ws/run".to_string(),
            request_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Deadline for the run connection to open, from session creation.
    pub open_timeout_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            open_timeout_ms: 3000,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ClientSettings::default();
        assert_eq!(s.server.base_url, "http://127.0.0.1:8080");
        assert_eq!(s.server.run_path, "/ws/run");
        assert_eq!(s.request_timeout(), Duration::from_secs(30));
        assert_eq!(s.open_timeout(), Duration::from_millis(3000));
        assert_eq!(s.logging.level, "info");
        assert_eq!(s.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[server]
base_url = "https://engine.lan:8443"
run_path = "/ws/run"
request_timeout_secs = 5

[session]
open_timeout_ms = 750

[logging]
level = "debug"
format = "json"
"#;
        let s: ClientSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(s.server.base_url, "https://engine.lan:8443");
        assert_eq!(s.request_timeout(), Duration::from_secs(5));
        assert_eq!(s.open_timeout(), Duration::from_millis(750));
        assert_eq!(s.logging.format, LogFormat::Json);
        assert_eq!(s.run_url().unwrap().as_str(), "wss://engine.lan:8443/ws/run");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let s: ClientSettings = toml::from_str("[session]\nopen_timeout_ms = 100\n").unwrap();
        assert_eq!(s.open_timeout(), Duration::from_millis(100));
        assert_eq!(s.server.base_url, "http://127.0.0.1:8080");
        assert_eq!(s.run_url().unwrap().as_str(), "ws://127.0.0.1:8080/ws/run");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("edgepick.toml");
        std::fs::write(&path, "[server]\nbase_url = \"http://10.1.1.1:9000\"\n").unwrap();

        let s = ClientSettings::resolve(Some(&path)).unwrap();
        assert_eq!(s.server.base_url, "http://10.1.1.1:9000");
    }

    #[test]
    fn test_explicit_path_must_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(ClientSettings::resolve(Some(&missing)).is_err());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[server\nbase_url = 1").unwrap();
        assert!(ClientSettings::resolve(Some(&broken)).is_err());
    }

    #[test]
    fn test_broken_local_file_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let local = dir.path().join(LOCAL_SETTINGS_FILE);
        std::fs::write(&local, "not = [valid").unwrap();

        let s = ClientSettings::load_local_or_default(&local);
        assert_eq!(s.server.base_url, ServerSettings::default().base_url);
    }

    #[test]
    fn test_bad_base_url() {
        let mut s = ClientSettings::default();
        s.server.base_url = "not a url".to_string();
        assert!(s.base_url().is_err());
        assert!(s.run_url().is_err());
    }
}
