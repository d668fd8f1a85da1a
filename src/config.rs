//! Configuration for the portal client.
//!
//! Read from `~/.config/ngeso/settings.conf` (Linux),
//! `~/Library/Application Support/ngeso/settings.conf` (macOS)
//! or `%LOCALAPPDATA%\ngeso\settings.conf` (Windows). A missing file means
//! defaults; the portal needs no credentials.

use crate::types::{NgEsoError, Result};
use configparser::ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default action API of the ESO data portal.
pub const DEFAULT_BASE_URL: &str = "https://data.nationalgrideso.com/api/3/action";

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "NGESO_BASE_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Action API base URL
    pub base_url: String,
    /// HTTP timeout for a single request
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("ngeso/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Load configuration from the default config file, then apply the
    /// environment override.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific path. Unset keys keep their defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NgEsoError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let mut ini = Ini::new();
        ini.load(path).map_err(NgEsoError::Config)?;

        let mut config = Config::default();
        if let Some(url) = ini.get("default", "base_url").filter(|s| !s.is_empty()) {
            config.base_url = url;
        }
        if let Some(timeout) = ini.get("default", "timeout").filter(|s| !s.is_empty()) {
            let secs: u64 = timeout.trim().parse().map_err(|_| {
                NgEsoError::Config(format!("Invalid timeout '{}': expected seconds", timeout))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = ini.get("default", "user_agent").filter(|s| !s.is_empty()) {
            config.user_agent = agent;
        }

        Ok(config)
    }

    /// Write this configuration to the default config file.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Write this configuration to a specific path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                NgEsoError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut ini = Ini::new();
        ini.set("default", "base_url", Some(self.base_url.clone()));
        ini.set("default", "timeout", Some(self.timeout.as_secs().to_string()));
        ini.set("default", "user_agent", Some(self.user_agent.clone()));
        ini.write(path)?;
        Ok(())
    }

    /// Get the platform-specific config directory.
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            dirs::data_local_dir()
                .map(|p| p.join("ngeso"))
                .ok_or_else(|| NgEsoError::Config("Could not determine config directory".into()))
        }

        #[cfg(not(target_os = "windows"))]
        {
            dirs::config_dir()
                .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
                .map(|p| p.join("ngeso"))
                .ok_or_else(|| NgEsoError::Config("Could not determine config directory".into()))
        }
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.conf"))
    }
}

/// Default config file content template.
pub const DEFAULT_CONFIG: &str = r#"[default]
base_url = https://data.nationalgrideso.com/api/3/action
timeout = 60
user_agent =
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"[default]
base_url = http://localhost:5000/api/3/action
timeout = 5
"#
        )
        .unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:5000/api/3/action");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.user_agent.starts_with("ngeso/"));
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", DEFAULT_CONFIG).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[default]\ntimeout = soon").unwrap();

        let err = Config::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, NgEsoError::Config(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.conf");

        let config = Config {
            base_url: "http://127.0.0.1:8080/api/3/action".to_string(),
            timeout: Duration::from_secs(12),
            user_agent: "test-agent".to_string(),
        };
        config.save_to_path(&path).unwrap();

        assert_eq!(Config::load_from_path(&path).unwrap(), config);
    }

    // dirs::config_dir honours XDG_CONFIG_HOME on Linux only. This is the one
    // test that touches the process environment.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_load_applies_base_url_env() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", dir.path());

        // No file: defaults, overridden by the environment.
        std::env::set_var(BASE_URL_ENV, "http://localhost:9000/api/3/action");
        let config = Config::load().unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/api/3/action");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        // File present: the environment still wins for base_url only.
        let file_config = Config {
            base_url: "http://file.example/api/3/action".to_string(),
            timeout: Duration::from_secs(7),
            ..Config::default()
        };
        file_config
            .save_to_path(&dir.path().join("ngeso").join("settings.conf"))
            .unwrap();
        let config = Config::load().unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/api/3/action");
        assert_eq!(config.timeout, Duration::from_secs(7));

        // Blank value is ignored.
        std::env::set_var(BASE_URL_ENV, "   ");
        assert_eq!(Config::load().unwrap(), file_config);

        std::env::remove_var(BASE_URL_ENV);
        assert_eq!(Config::load().unwrap(), file_config);

        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from_path(&dir.path().join("absent.conf")).unwrap_err();
        assert!(matches!(err, NgEsoError::Config(_)));
    }
}
