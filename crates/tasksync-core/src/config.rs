//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/tasksync/config.toml)
//! 3. Environment variables (TASKS_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::controller::SyncOptions;

/// Environment variable prefix
const ENV_PREFIX: &str = "TASKS";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the task API (e.g. http://localhost:3000)
    #[serde(default)]
    pub api_url: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long the "Task deleted" notice stays visible
    #[serde(default = "default_delete_notice_ms")]
    pub delete_notice_ms: u64,

    /// How long the update-confirmed flag stays set
    #[serde(default = "default_update_notice_ms")]
    pub update_notice_ms: u64,

    /// Attempts for a list fetch before giving up
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,

    /// First retry delay for list fetches
    #[serde(default = "default_retry_initial_ms")]
    pub retry_initial_ms: u64,

    /// Maximum retry delay for list fetches
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,

    /// Log file for the TUI (defaults to {data_local_dir}/tasksync/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            delete_notice_ms: default_delete_notice_ms(),
            update_notice_ms: default_update_notice_ms(),
            fetch_attempts: default_fetch_attempts(),
            retry_initial_ms: default_retry_initial_ms(),
            retry_max_ms: default_retry_max_ms(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TASKS_API_URL, TASKS_DELETE_NOTICE_MS, ...)
    /// 2. Config file (~/.config/tasksync/config.toml or TASKS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, using `path` instead of the default file if given
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides and report ignored values
    ///
    /// Warnings go to stderr because configuration is loaded before logging
    /// is set up.
    fn apply_env_overrides(&mut self) {
        for warning in self.env_overrides() {
            eprintln!("Warning: {}", warning);
        }
    }

    /// Apply environment variable overrides, returning a warning per ignored value
    fn env_overrides(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        // TASKS_API_URL
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            self.api_url = if val.is_empty() { None } else { Some(val) };
        }

        warnings.extend(override_number(
            "REQUEST_TIMEOUT_SECS",
            &mut self.request_timeout_secs,
        ));
        warnings.extend(override_number("DELETE_NOTICE_MS", &mut self.delete_notice_ms));
        warnings.extend(override_number("UPDATE_NOTICE_MS", &mut self.update_notice_ms));

        // TASKS_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        warnings
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with TASKS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tasksync")
            .join("config.toml")
    }

    /// The configured API URL, or an error explaining how to set one
    pub fn require_api_url(&self) -> Result<&str> {
        match self.api_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => bail!(
                "Task API URL not configured. Set it with:\n  \
                 tasks config set api_url http://localhost:3000\n\
                 or export {}_API_URL",
                ENV_PREFIX
            ),
        }
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Controller settings derived from this configuration
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            delete_notice: Duration::from_millis(self.delete_notice_ms),
            update_notice: Duration::from_millis(self.update_notice_ms),
            fetch_attempts: self.fetch_attempts.max(1),
            retry_initial_delay: Duration::from_millis(self.retry_initial_ms),
            retry_max_delay: Duration::from_millis(self.retry_max_ms.max(self.retry_initial_ms)),
        }
    }

    /// Log file path, falling back to the default location
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tasksync")
                .join("debug.log")
        })
    }
}

/// Override a numeric field from `TASKS_{suffix}`
///
/// Unparsable values leave the field alone and are returned as a warning.
fn override_number<T: std::str::FromStr>(suffix: &str, field: &mut T) -> Option<String> {
    let name = format!("{}_{}", ENV_PREFIX, suffix);
    let val = std::env::var(&name).ok()?;
    match val.trim().parse() {
        Ok(n) => {
            *field = n;
            None
        }
        Err(_) => Some(format!("Ignoring {}: '{}' is not a number", name, val)),
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_delete_notice_ms() -> u64 {
    3000
}

fn default_update_notice_ms() -> u64 {
    1000
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_retry_initial_ms() -> u64 {
    250
}

fn default_retry_max_ms() -> u64 {
    4000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "TASKS_API_URL",
        "TASKS_REQUEST_TIMEOUT_SECS",
        "TASKS_DELETE_NOTICE_MS",
        "TASKS_UPDATE_NOTICE_MS",
        "TASKS_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_url.is_none());
        assert_eq!(config.delete_notice_ms, 3000);
        assert_eq!(config.update_notice_ms, 1000);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_sync_options_from_config() {
        let config = Config::default();
        assert_eq!(config.sync_options(), SyncOptions::default());

        let config = Config {
            delete_notice_ms: 500,
            fetch_attempts: 0,
            retry_initial_ms: 100,
            retry_max_ms: 10,
            ..Config::default()
        };
        let options = config.sync_options();
        assert_eq!(options.delete_notice, Duration::from_millis(500));
        assert_eq!(options.fetch_attempts, 1);
        assert_eq!(options.retry_max_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_require_api_url() {
        let mut config = Config::default();
        let err = config.require_api_url().unwrap_err().to_string();
        assert!(err.contains("tasks config set api_url"));

        config.api_url = Some("   ".to_string());
        assert!(config.require_api_url().is_err());

        config.api_url = Some("http://localhost:3000".to_string());
        assert_eq!(config.require_api_url().unwrap(), "http://localhost:3000");
    }

    #[test]
    fn test_env_override_api_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("TASKS_API_URL", "http://tasks.internal:8080");
        config.apply_env_overrides();
        assert_eq!(
            config.api_url,
            Some("http://tasks.internal:8080".to_string())
        );

        // Empty string clears it
        env::set_var("TASKS_API_URL", "");
        config.apply_env_overrides();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_env_override_durations() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("TASKS_DELETE_NOTICE_MS", "1500");
        env::set_var("TASKS_UPDATE_NOTICE_MS", "not-a-number");
        let warnings = config.env_overrides();

        assert_eq!(config.delete_notice_ms, 1500);
        // Invalid values are ignored, and reported
        assert_eq!(config.update_notice_ms, 1000);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("TASKS_UPDATE_NOTICE_MS"));
        assert!(warnings[0].contains("not-a-number"));
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            api_url: Some("http://localhost:3000".to_string()),
            delete_notice_ms: 2500,
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("api_url"));
        assert!(toml_str.contains("delete_notice_ms"));

        let parsed = Config::load_from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str(r#"api_url = "http://example.com""#).unwrap();
        assert_eq!(config.api_url, Some("http://example.com".to_string()));
        assert_eq!(config.delete_notice_ms, 3000);
        assert_eq!(config.fetch_attempts, 3);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            api_url: Some("http://localhost:4000".to_string()),
            log_file: Some(PathBuf::from("/tmp/tasks.log")),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.log_file_path(), PathBuf::from("/tmp/tasks.log"));
    }

    #[test]
    fn test_load_invalid_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [not toml").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
