//! Reverse and search command handlers
//!
//! One-shot calls to the geocoding service, without a resolver.

use crate::config::Config;
use crate::error::Result;
use crate::format::text::render_suggestions;
use crate::geo::nominatim::NominatimClient;
use crate::geo::{Geocoder, Placemark, Position};
use clap::Args;

/// Reverse command arguments
#[derive(Args)]
pub struct ReverseArgs {
    /// Latitude
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude
    #[arg(allow_negative_numbers = true)]
    pub lng: f64,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Free-text address query
    pub query: String,

    /// Maximum number of candidates
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

fn render_placemark(placemark: &Placemark) -> String {
    let mut output = String::new();
    if let Some(name) = &placemark.display_name {
        output.push_str(&format!("{}\n", name));
    }
    let address = &placemark.address;
    for (label, value) in [
        ("Street", address.street()),
        ("City", address.locality()),
        ("Postal code", address.postal_code()),
    ] {
        if !value.is_empty() {
            output.push_str(&format!("  {}: {}\n", label, value));
        }
    }
    output
}

/// Run the reverse command
pub async fn reverse(args: ReverseArgs) -> Result<()> {
    Position::new(args.lat, args.lng).validate()?;

    let config = Config::load()?;
    let client = NominatimClient::new(&config.geocoder)?;
    let placemark = client.reverse_lookup(args.lat, args.lng).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&placemark)?);
    } else {
        print!("{}", render_placemark(&placemark));
    }

    Ok(())
}

/// Run the search command
pub async fn search(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let client = NominatimClient::new(&config.geocoder)?;
    let limit = args.limit.unwrap_or(config.geocoder.search_limit);
    let suggestions = client.forward_search(&args.query, limit).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        println!("No results for \"{}\"", args.query);
    } else {
        print!("{}", render_suggestions(&suggestions));
    }

    Ok(())
}
