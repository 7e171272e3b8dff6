//! Configuration loading and resolution
//!
//! Settings are resolved once at process entry and passed down explicitly;
//! no component reads configuration from a global. Priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`COINMATCH_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default session token lifetime: 8 hours
pub const DEFAULT_TOKEN_EXPIRY_MINUTES: i64 = 8 * 60;

/// Runtime configuration, constructed at process entry
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Bind host for the HTTP server
    pub host: String,
    /// Bind port for the HTTP server
    pub port: u16,
    /// Session token lifetime in minutes
    pub token_expiry_minutes: i64,
    /// Remote JSON source for museum catalog records
    pub museum_source_url: Option<String>,
    /// Remote JSON source for marketplace listings
    pub online_source_url: Option<String>,
    /// Allowed CORS origins for the browser frontend
    pub cors_origins: Vec<String>,
    /// Reject unrecognized decision strings instead of defaulting to Pending
    pub strict_decisions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_data_dir().join("coinmatch.db"),
            host: "127.0.0.1".to_string(),
            port: 8000,
            token_expiry_minutes: DEFAULT_TOKEN_EXPIRY_MINUTES,
            museum_source_url: None,
            online_source_url: None,
            cors_origins: vec![
                "http://127.0.0.1:5173".to_string(),
                "http://localhost:5173".to_string(),
            ],
            strict_decisions: false,
        }
    }
}

/// Optional overrides supplied by the caller (typically parsed from CLI args)
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// TOML config file schema; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token_expiry_minutes: Option<i64>,
    pub museum_source_url: Option<String>,
    pub online_source_url: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub strict_decisions: Option<bool>,
}

impl Settings {
    /// Resolve settings from compiled defaults, TOML file, environment, and
    /// CLI overrides (lowest to highest priority).
    ///
    /// A missing config file is not an error: defaults are used and a
    /// warning is logged. A present-but-malformed config file is an error.
    pub fn load(overrides: &SettingsOverrides) -> Result<Self> {
        let mut settings = Settings::default();

        // Priority 3: TOML config file
        let config_path = overrides
            .config_file
            .clone()
            .or_else(default_config_file);
        if let Some(path) = config_path {
            if path.exists() {
                let toml_config = load_toml_config(&path)?;
                settings.apply_toml(toml_config);
            } else if overrides.config_file.is_some() {
                // Only an explicit --config pointing nowhere is an error
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            } else {
                tracing::warn!("No config file found at {}; using defaults", path.display());
            }
        }

        // Priority 2: environment variables
        settings.apply_env();

        // Priority 1: CLI overrides
        if let Some(path) = &overrides.database_path {
            settings.database_path = path.clone();
        }
        if let Some(host) = &overrides.host {
            settings.host = host.clone();
        }
        if let Some(port) = overrides.port {
            settings.port = port;
        }

        if settings.token_expiry_minutes <= 0 {
            return Err(Error::Config(
                "token_expiry_minutes must be positive".to_string(),
            ));
        }

        Ok(settings)
    }

    fn apply_toml(&mut self, toml_config: TomlConfig) {
        if let Some(v) = toml_config.database_path {
            self.database_path = v;
        }
        if let Some(v) = toml_config.host {
            self.host = v;
        }
        if let Some(v) = toml_config.port {
            self.port = v;
        }
        if let Some(v) = toml_config.token_expiry_minutes {
            self.token_expiry_minutes = v;
        }
        if toml_config.museum_source_url.is_some() {
            self.museum_source_url = toml_config.museum_source_url;
        }
        if toml_config.online_source_url.is_some() {
            self.online_source_url = toml_config.online_source_url;
        }
        if let Some(v) = toml_config.cors_origins {
            self.cors_origins = v;
        }
        if let Some(v) = toml_config.strict_decisions {
            self.strict_decisions = v;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("COINMATCH_DATABASE_PATH") {
            self.database_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("COINMATCH_HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("COINMATCH_PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = std::env::var("COINMATCH_TOKEN_EXPIRY_MINUTES") {
            if let Ok(minutes) = v.parse() {
                self.token_expiry_minutes = minutes;
            }
        }
        if let Ok(v) = std::env::var("COINMATCH_MUSEUM_SOURCE_URL") {
            self.museum_source_url = Some(v);
        }
        if let Ok(v) = std::env::var("COINMATCH_ONLINE_SOURCE_URL") {
            self.online_source_url = Some(v);
        }
        if let Ok(v) = std::env::var("COINMATCH_STRICT_DECISIONS") {
            self.strict_decisions = matches!(v.as_str(), "1" | "true" | "yes");
        }
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Default config file location: ~/.config/coinmatch/config.toml
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("coinmatch").join("config.toml"))
}

/// OS-dependent default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("coinmatch"))
        .unwrap_or_else(|| PathBuf::from("./coinmatch_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.token_expiry_minutes, 480);
        assert!(!settings.strict_decisions);
        assert!(settings.museum_source_url.is_none());
    }

    #[test]
    fn test_toml_overlay_keeps_unset_fields() {
        let mut settings = Settings::default();
        let toml_config: TomlConfig =
            toml::from_str("port = 9000\nstrict_decisions = true").unwrap();
        settings.apply_toml(toml_config);
        assert_eq!(settings.port, 9000);
        assert!(settings.strict_decisions);
        assert_eq!(settings.host, "127.0.0.1");
    }
}
