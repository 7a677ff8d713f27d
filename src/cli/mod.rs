//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod lookup;
pub mod pick;
pub mod serve;
pub mod session;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Address picker backed by a geocoding service
#[derive(Parser)]
#[command(name = "geopick")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick an address interactively (commands on stdin)
    Pick(pick::PickArgs),

    /// Reverse geocode a position
    Reverse(lookup::ReverseArgs),

    /// Search addresses by free text
    Search(lookup::SearchArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show or change the logged-in user
    Session(session::SessionArgs),
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    init_logging(match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    });

    match cli.command {
        Commands::Pick(args) => pick::run(args).await,
        Commands::Reverse(args) => lookup::reverse(args).await,
        Commands::Search(args) => lookup::search(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Session(args) => session::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_reverse_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["geopick", "reverse", "-33.8688", "-151.2093"]).unwrap();
        match cli.command {
            Commands::Reverse(args) => {
                assert_eq!(args.lat, -33.8688);
                assert_eq!(args.lng, -151.2093);
            }
            _ => panic!("expected reverse command"),
        }
    }

    #[test]
    fn test_search_limit_flag() {
        let cli = Cli::try_parse_from(["geopick", "search", "rue de rivoli", "--limit", "3"]).unwrap();
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "rue de rivoli");
                assert_eq!(args.limit, Some(3));
            }
            _ => panic!("expected search command"),
        }
    }
}
