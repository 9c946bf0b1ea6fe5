//! File logging
//!
//! Only active when DOCSMITH_LOG is set (to a level such as `debug`).
//! Output goes to `config.log_file`, or `{data_dir}/debug.log`, so it never
//! interleaves with command output.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use docsmith_core::Config;

/// Environment variable holding the log level
const LOG_ENV: &str = "DOCSMITH_LOG";

/// Where log lines are written
fn log_path(config: &Config) -> PathBuf {
    config
        .log_file
        .clone()
        .unwrap_or_else(|| config.default_log_path())
}

/// Initialize file-based logging if DOCSMITH_LOG is set
pub fn init(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = log_path(config);
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Append, so a shell session and later one-shot commands share one log
    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "docsmith_core={},docsmith_cli={}",
        log_level, log_level
    ));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_defaults_to_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/data/docsmith"),
            ..Config::default()
        };
        assert_eq!(log_path(&config), PathBuf::from("/data/docsmith/debug.log"));

        let config = Config {
            log_file: Some(PathBuf::from("/tmp/docsmith.log")),
            ..config
        };
        assert_eq!(log_path(&config), PathBuf::from("/tmp/docsmith.log"));
    }
}
