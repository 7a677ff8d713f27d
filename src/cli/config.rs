//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "geocoder.base_url")
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
            let value = config.get(key).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown config key: {}\n\nAvailable keys:\n  {}",
                    key,
                    Config::available_keys().join("\n  ")
                ))
            })?;
            println!("{}", value);
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[geocoder]");
    println!("base_url = \"{}\"", config.geocoder.base_url);
    println!("user_agent = \"{}\"", config.geocoder.user_agent);
    println!("timeout_secs = {}", config.geocoder.timeout_secs);
    println!("search_limit = {}", config.geocoder.search_limit);
    println!();

    println!("[resolver]");
    println!("debounce_ms = {}", config.resolver.debounce_ms);
    println!();

    println!("[map]");
    println!("center_lat = {}", config.map.center_lat);
    println!("center_lng = {}", config.map.center_lng);
    println!("zoom = {}", config.map.zoom);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!("session_ttl_secs = {}", config.server.session_ttl_secs);
    println!();

    println!("[url]");
    println!("default = \"{}\"", config.url.default);
    println!();

    println!("[url.providers]");
    let mut providers: Vec<_> = config.url.providers.iter().collect();
    providers.sort();
    for (name, template) in providers {
        println!("{} = \"{}\"", name, template);
    }
}
