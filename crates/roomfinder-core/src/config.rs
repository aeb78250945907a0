//! Configuration resolution for roomfinder.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Config file (`--config`, or ~/.config/roomfinder/settings.json)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::availability::{DEFAULT_VERIFICATION_FLOOR, DEFAULT_WINDOW_SECS};
use crate::error::{Error, Result};

/// Complete roomfinder configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
    #[serde(default)]
    pub geofence: GeofenceConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: Option<PathBuf>,
    /// Directory holding the built frontend, served for unmatched paths.
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
    /// Mark session cookies `Secure` (enable behind HTTPS).
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database_path: None,
            static_dir: None,
            log_level: "info".to_string(),
            secure_cookies: false,
        }
    }
}

/// Report window, verification and live-update timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    pub report_window_secs: u64,
    pub verification_floor: u32,
    pub heartbeat_interval_secs: u64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            report_window_secs: DEFAULT_WINDOW_SECS,
            verification_floor: DEFAULT_VERIFICATION_FLOOR,
            heartbeat_interval_secs: 29,
        }
    }
}

/// Geofence provider configuration. Sync is disabled without a secret key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeofenceConfig {
    pub api_url: String,
    pub secret_key: Option<String>,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.radar.io/v1".to_string(),
            secret_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://localhost:8080".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a sign-in, in seconds. Default: 7 days.
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

/// Load configuration with hierarchical resolution.
///
/// An explicit `config_path` must exist; the default location is optional.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => load_config_file(path)?,
        None => match global_config_path() {
            Some(path) if path.exists() => load_config_file(&path)?,
            _ => Config::default(),
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".roomfinder"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/roomfinder"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("roomfinder"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Get the default config file path.
pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("settings.json"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.parse()
        .map_err(|_| Error::Config(format!("{key} has an invalid value: {val:?}")))
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(val) = var("ROOMFINDER_PORT") {
        config.server.port = parse_env("ROOMFINDER_PORT", &val)?;
    }
    if let Some(val) = var("ROOMFINDER_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(val) = var("ROOMFINDER_REPORT_WINDOW_SECS") {
        config.availability.report_window_secs =
            parse_env("ROOMFINDER_REPORT_WINDOW_SECS", &val)?;
    }
    if let Some(val) = var("RADAR_SECRET_KEY") {
        config.geofence.secret_key = Some(val).filter(|k| !k.is_empty());
    }
    if let Some(val) = var("RADAR_API_URL") {
        config.geofence.api_url = val;
    }
    if let Some(val) = var("ROOMFINDER_CORS_ORIGINS") {
        config.cors.allowed_origins = val
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.availability.report_window_secs, 300);
        assert_eq!(config.availability.verification_floor, 3);
        assert_eq!(config.availability.heartbeat_interval_secs, 29);
        assert_eq!(config.session.ttl_secs, 7 * 24 * 60 * 60);
        assert!(config.geofence.secret_key.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 8000}, "availability": {"verification_floor": 5}}"#)
            .unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.availability.verification_floor, 5);
        assert_eq!(config.availability.report_window_secs, 300);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("ROOMFINDER_PORT", "7000"),
                ("ROOMFINDER_REPORT_WINDOW_SECS", "60"),
                ("RADAR_SECRET_KEY", "prj_test"),
                ("ROOMFINDER_CORS_ORIGINS", "https://a.example, https://b.example,"),
            ]),
        )
        .unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.availability.report_window_secs, 60);
        assert_eq!(config.geofence.secret_key.as_deref(), Some("prj_test"));
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn bad_env_value_is_rejected() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, env(&[("ROOMFINDER_PORT", "lots")]));
        assert!(err.is_err());
    }
}
