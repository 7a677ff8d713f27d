//! geopick CLI entry point
//!
//! Address picker - CLI + web app

use geopick::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
