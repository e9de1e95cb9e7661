//! Configuration management for yaseek.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Desktop browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36";

/// Main application configuration.
///
/// This is loaded from `~/.config/yaseek/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub http: HttpConfig,
    /// Credential file settings
    pub cookies: CookieConfig,
    /// Crawl limits and validation
    pub crawl: CrawlConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, falling back to defaults if absent.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `YASEEK_COOKIES`: Override the cookie-jar path
    /// - `YASEEK_TIMEOUT_SECS`: Override the HTTP timeout
    /// - `YASEEK_MAX_DEPTH`: Override the crawl depth limit
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup function.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("YASEEK_COOKIES") {
            tracing::debug!("Override cookies.path from env: {}", val);
            self.cookies.path = PathBuf::from(val);
        }

        if let Some(val) = lookup("YASEEK_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.http.timeout_secs = secs;
                tracing::debug!("Override http.timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = lookup("YASEEK_MAX_DEPTH") {
            if let Ok(depth) = val.parse() {
                self.crawl.max_depth = depth;
                tracing::debug!("Override crawl.max_depth from env: {}", depth);
            }
        }
    }

    /// Check value ranges and that the username pattern compiles.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.crawl.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "crawl.max_depth".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if let Some(pattern) = &self.crawl.username_pattern {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
                field: "crawl.username_pattern".to_string(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/yaseek/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "yaseek", "yaseek").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Credential file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Netscape-format cookie jar
    pub path: PathBuf,
    /// Skip expired and session-only cookies
    pub strict: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cookies.txt"),
            strict: true,
        }
    }
}

/// Crawl limits and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum nesting of discoveries before the crawl is cut off
    pub max_depth: usize,
    /// Optional regex a username must match before it is looked up
    pub username_pattern: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 50,
            username_pattern: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.crawl.max_depth, 50);
        assert!(config.cookies.strict);
        assert_eq!(config.cookies.path, PathBuf::from("cookies.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[crawl]
max_depth = 5
username_pattern = "^[a-z0-9.-]+$"
"#,
        )
        .expect("write config");

        let config = AppConfig::load_from(&path).expect("load config");
        assert_eq!(config.crawl.max_depth, 5);
        assert_eq!(
            config.crawl.username_pattern.as_deref(),
            Some("^[a-z0-9.-]+$")
        );
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().expect("create temp dir");
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config.crawl.max_depth, 50);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = AppConfig::default();
        config.crawl.username_pattern = Some("([unclosed".to_string());
        let err = config.validate().expect_err("pattern should not compile");
        assert!(err.to_string().contains("crawl.username_pattern"));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut config = AppConfig::default();
        config.crawl.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("YASEEK_COOKIES", "/tmp/jar.txt"),
            ("YASEEK_TIMEOUT_SECS", "7"),
            ("YASEEK_MAX_DEPTH", "not-a-number"),
        ]);

        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.cookies.path, PathBuf::from("/tmp/jar.txt"));
        assert_eq!(config.http.timeout_secs, 7);
        assert_eq!(config.crawl.max_depth, 50);
    }
}
