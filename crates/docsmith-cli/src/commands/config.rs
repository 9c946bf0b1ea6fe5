//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use docsmith_core::{template, Config, TemplateId};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "log_file": config.log_file,
                    "persist_debounce_ms": config.persist_debounce_ms,
                    "default_template": config.default_template,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:            {}", config.data_dir.display());
            println!(
                "  log_file:            {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  persist_debounce_ms: {}", config.persist_debounce_ms);
            println!("  default_template:    {}", config.default_template);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Assign one key
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        "persist_debounce_ms" => {
            config.persist_debounce_ms = value
                .parse()
                .context("Invalid value for persist_debounce_ms. Use a number of milliseconds.")?;
        }
        "default_template" => {
            let id = TemplateId::parse(value)?;
            match template::lookup(&id) {
                Some(info) if info.is_available() => config.default_template = id,
                _ => bail!("'{}' is not an available template", value),
            }
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, log_file, persist_debounce_ms, default_template",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "persist_debounce_ms", "40").unwrap();
        apply(&mut config, "default_template", "dbdd").unwrap();
        apply(&mut config, "log_file", "/tmp/d.log").unwrap();

        assert_eq!(config.persist_debounce_ms, 40);
        assert_eq!(config.default_template.as_str(), "dbdd");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/d.log")));

        apply(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply(&mut config, "persist_debounce_ms", "soon").is_err());
        assert!(apply(&mut config, "default_template", "brd").is_err());
        assert!(apply(&mut config, "sync_url", "x").is_err());
    }
}
