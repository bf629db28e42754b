//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "defaults.geocoder")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[defaults]");
    println!("geocoder = \"{}\"", config.defaults.geocoder);
    println!("lat = {}", config.defaults.lat);
    println!("lng = {}", config.defaults.lng);
    println!("zoom = {}", config.defaults.zoom);
    println!("format = \"{}\"", config.defaults.format);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!();

    println!("[location]");
    println!("source = \"{}\"", config.location.source);
    println!("watch_interval_secs = {}", config.location.watch_interval_secs);
    println!();

    println!("[url]");
    println!("default = \"{}\"", config.url.default);
    println!();

    println!("[url.providers]");
    for (name, template) in &config.url.providers {
        println!("{} = \"{}\"", name, template);
    }
    println!();

    println!("[api_keys]");
    println!("opencage = {}", key_status(&config.api_keys.opencage, config.opencage_key().is_some()));
    println!(
        "openrouteservice = {}",
        key_status(&config.api_keys.openrouteservice, config.openrouteservice_key().is_some())
    );
}

/// Masked description of an API key
fn key_status(configured: &str, effective: bool) -> &'static str {
    match (configured.trim().is_empty(), effective) {
        (false, _) => "\"***\" # configured",
        (true, true) => "\"\" # set via environment",
        (true, false) => "\"\" # not configured",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_status_masks_keys() {
        assert_eq!(key_status("secret", true), "\"***\" # configured");
        assert_eq!(key_status("", true), "\"\" # set via environment");
        assert_eq!(key_status("  ", false), "\"\" # not configured");
    }
}
