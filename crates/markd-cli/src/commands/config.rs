//! Config command handlers

use anyhow::{bail, Context, Result};

use markd_core::Config;

use crate::output::Output;

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "service_url": config.service_url,
                "feed_url": config.feed_url,
                "api_key_set": config.api_key.is_some(),
                "owner": config.owner,
            })
        );
    } else {
        println!("Config file: {}", Config::config_file_path().display());
        println!();
        println!(
            "service_url: {}",
            config.service_url.as_deref().unwrap_or("(not set)")
        );
        println!(
            "feed_url:    {}",
            config.feed_url.as_deref().unwrap_or("(not set)")
        );
        println!(
            "api_key:     {}",
            if config.api_key.is_some() {
                "(set)"
            } else {
                "(not set)"
            }
        );
        println!(
            "owner:       {}",
            config.owner.as_deref().unwrap_or("(not set)")
        );
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    let value = if value.is_empty() { None } else { Some(value) };

    match key.as_str() {
        "service_url" => config.service_url = value,
        "feed_url" => config.feed_url = value,
        "api_key" => config.api_key = value,
        "owner" => config.owner = value,
        _ => bail!(
            "Unknown configuration key: {}. Valid keys: service_url, feed_url, api_key, owner",
            key
        ),
    }

    config.save().context("Failed to save configuration")?;
    output.success(&format!("Set {}", key));

    Ok(())
}
