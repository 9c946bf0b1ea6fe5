//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/docsmith/config.toml)
//! 3. Environment variables (DOCSMITH_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::template::TemplateId;

/// Environment variable prefix
const ENV_PREFIX: &str = "DOCSMITH";

/// Default quiet period before the shell writes the mirror
pub const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 250;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the mirror and default exports
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Debug log destination, used when DOCSMITH_LOG is set
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Debounce for the interactive shell's mirror writes
    #[serde(default = "default_persist_debounce_ms")]
    pub persist_debounce_ms: u64,

    /// Template active on first run
    #[serde(default)]
    pub default_template: TemplateId,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: None,
            persist_debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
            default_template: TemplateId::default(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (DOCSMITH_DATA_DIR, DOCSMITH_LOG_FILE,
    ///    DOCSMITH_PERSIST_DEBOUNCE_MS)
    /// 2. Config file (~/.config/docsmith/config.toml or DOCSMITH_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from `--config` when given, otherwise from the default location
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

        config.apply_env_overrides()?;
        config.ensure_data_dir();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // DOCSMITH_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // DOCSMITH_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // DOCSMITH_PERSIST_DEBOUNCE_MS
        if let Ok(val) = std::env::var(format!("{}_PERSIST_DEBOUNCE_MS", ENV_PREFIX)) {
            self.persist_debounce_ms = val
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}_PERSIST_DEBOUNCE_MS: {:?}", ENV_PREFIX, val))?;
        }

        Ok(())
    }

    /// Create the data directory if it is missing
    ///
    /// An unusable directory only costs persistence; the storage probe
    /// reports it later.
    fn ensure_data_dir(&self) {
        if let Err(e) = std::fs::create_dir_all(&self.data_dir) {
            warn!("Cannot create data directory {:?}: {}", self.data_dir, e);
        }
    }

    /// Save configuration to the default config file
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
    /// Can be overridden with DOCSMITH_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docsmith")
            .join("config.toml")
    }

    /// Directory of the key-value mirror
    pub fn mirror_dir(&self) -> PathBuf {
        self.data_dir.join("mirror")
    }

    /// Default destination of exported documents
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    /// Log file used when none is configured
    pub fn default_log_path(&self) -> PathBuf {
        self.data_dir.join("debug.log")
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docsmith")
}

fn default_persist_debounce_ms() -> u64 {
    DEFAULT_PERSIST_DEBOUNCE_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::tempdir;

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
            // Clear all the vars
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
        "DOCSMITH_DATA_DIR",
        "DOCSMITH_LOG_FILE",
        "DOCSMITH_PERSIST_DEBOUNCE_MS",
        "DOCSMITH_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data_dir.ends_with("docsmith"));
        assert!(config.log_file.is_none());
        assert_eq!(config.persist_debounce_ms, 250);
        assert_eq!(config.default_template.as_str(), "prd");
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/docsmith"),
            ..Config::default()
        };

        assert_eq!(config.mirror_dir(), PathBuf::from("/data/docsmith/mirror"));
        assert_eq!(config.exports_dir(), PathBuf::from("/data/docsmith/exports"));
        assert!(config.default_log_path().ends_with("debug.log"));
        assert_eq!(config.persist_debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("DOCSMITH_DATA_DIR", "/tmp/docsmith-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/docsmith-test"));
    }

    #[test]
    fn test_env_override_log_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("DOCSMITH_LOG_FILE", "/tmp/docsmith.log");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/docsmith.log")));

        // Empty string clears it
        env::set_var("DOCSMITH_LOG_FILE", "");
        config.apply_env_overrides().unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_env_override_debounce() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("DOCSMITH_PERSIST_DEBOUNCE_MS", "0");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.persist_debounce_ms, 0);

        env::set_var("DOCSMITH_PERSIST_DEBOUNCE_MS", "soon");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/docsmith"),
            log_file: Some(PathBuf::from("/var/log/docsmith.log")),
            persist_debounce_ms: 100,
            default_template: TemplateId::new("srs"),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("persist_debounce_ms = 100"));
        assert!(toml_str.contains("default_template = \"srs\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.log_file, config.log_file);
        assert_eq!(parsed.persist_debounce_ms, 100);
        assert_eq!(parsed.default_template, config.default_template);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            default_template = "hld"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.default_template.as_str(), "hld");
        assert_eq!(config.persist_debounce_ms, DEFAULT_PERSIST_DEBOUNCE_MS);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempdir().unwrap();
        env::set_var("DOCSMITH_DATA_DIR", dir.path().join("data"));

        let config = Config::load_from_path(&dir.path().join("config.toml")).unwrap();
        // Should return defaults when file doesn't exist, creating the data dir
        assert!(config.log_file.is_none());
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn test_load_with_unusable_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        env::set_var("DOCSMITH_DATA_DIR", blocker.join("data"));

        let config = Config::load_from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.data_dir, blocker.join("data"));
    }

    #[test]
    fn test_save_and_load_with_cli_override() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: dir.path().join("data"),
            persist_debounce_ms: 10,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded.data_dir, dir.path().join("data"));
        assert_eq!(loaded.persist_debounce_ms, 10);
    }

    #[test]
    fn test_config_file_path_env_override() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("DOCSMITH_CONFIG", "/etc/docsmith.toml");
        assert_eq!(Config::config_file_path(), PathBuf::from("/etc/docsmith.toml"));
    }
}
