//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use slambook_core::config::DEFAULT_SHARE_BASE_URL;
use slambook_core::Config;

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
                    "share_base_url": config.share_base_url,
                    "log_file": config.log_file
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
            println!("  data_dir:       {}", config.data_dir.display());
            println!("  share_base_url: {}", config.share_base_url);
            println!(
                "  log_file:       {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
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
    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);

    // Environment overrides stay out of the saved file
    let mut config = Config::load_file(&save_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";
    match key {
        "data_dir" => {
            if unset {
                bail!("data_dir cannot be empty");
            }
            config.data_dir = value.into();
        }
        "share_base_url" => {
            config.share_base_url = if unset {
                DEFAULT_SHARE_BASE_URL.to_string()
            } else {
                value.to_string()
            };
        }
        "log_file" => {
            config.log_file = if unset { None } else { Some(value.into()) };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, share_base_url, log_file",
                key
            );
        }
    }
    Ok(())
}
