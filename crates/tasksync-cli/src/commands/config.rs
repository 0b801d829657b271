//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use tasksync_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str = "api_url, request_timeout_secs, delete_notice_ms, update_notice_ms, \
                          fetch_attempts, retry_initial_ms, retry_max_ms, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("Failed to encode configuration")?
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_url.as_deref().unwrap_or(""));
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!(
                "  api_url:              {}",
                config.api_url.as_deref().unwrap_or("(not set)")
            );
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!("  delete_notice_ms:     {}", config.delete_notice_ms);
            println!("  update_notice_ms:     {}", config.update_notice_ms);
            println!("  fetch_attempts:       {}", config.fetch_attempts);
            println!("  retry_initial_ms:     {}", config.retry_initial_ms);
            println!("  retry_max_ms:         {}", config.retry_max_ms);
            println!("  log_file:             {}", config.log_file_path().display());
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

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "api_url" => {
            config.api_url = optional(value).map(|v| v.trim_end_matches('/').to_string());
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = parse_number(key, value)?;
        }
        "delete_notice_ms" => {
            config.delete_notice_ms = parse_number(key, value)?;
        }
        "update_notice_ms" => {
            config.update_notice_ms = parse_number(key, value)?;
        }
        "fetch_attempts" => {
            config.fetch_attempts = parse_number(key, value)?;
        }
        "retry_initial_ms" => {
            config.retry_initial_ms = parse_number(key, value)?;
        }
        "retry_max_ms" => {
            config.retry_max_ms = parse_number(key, value)?;
        }
        "log_file" => {
            config.log_file = optional(value).map(PathBuf::from);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}

/// Empty and "none" unset an optional key
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value for {}: '{}' is not a number", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "api_url", "http://localhost:3000/").unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:3000"));

        apply(&mut config, "delete_notice_ms", "500").unwrap();
        assert_eq!(config.delete_notice_ms, 500);

        apply(&mut config, "log_file", "/tmp/tasks.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/tasks.log")));

        apply(&mut config, "api_url", "none").unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();

        let err = apply(&mut config, "update_notice_ms", "soon").unwrap_err();
        assert!(err.to_string().contains("not a number"));

        let err = apply(&mut config, "sync_url", "x").unwrap_err();
        assert!(err.to_string().contains("Valid keys"));
    }

    #[test]
    fn test_set_writes_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set(
            "api_url".to_string(),
            "http://tasks.local".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let saved = Config::load_from_path(&path).unwrap();
        assert_eq!(saved.api_url.as_deref(), Some("http://tasks.local"));
    }
}
