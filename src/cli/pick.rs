//! Pick command handler
//!
//! Runs an address widget in the terminal. Each stdin line is one user
//! interaction; the confirmed address is printed on exit.

use crate::address::Field;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::text::{render_suggestions, TextFormatter};
use crate::format::{available_formats, get_formatter, OutputFormatter};
use crate::geo::nominatim::NominatimClient;
use crate::geo::Suggestion;
use crate::resolver::{
    channel_host, AddressResolver, HostNotification, ResolverSettings, UserEvent,
};
use clap::Args;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

/// How often the terminal checks for suggestions from a finished search
const SUGGESTION_POLL: Duration = Duration::from_millis(200);

const HELP: &str = "\
Commands:
  click LAT LNG     pick a position on the map
  street TEXT       edit the street address
  city TEXT         edit the city
  postcode TEXT     edit the postal code
  pick N            choose suggestion N
  show              print the widget
  confirm           commit the address and exit
  cancel            exit without an address
  help              print this message
Suggestions are printed as soon as a search returns.";

/// Pick command arguments
#[derive(Args)]
pub struct PickArgs {
    /// Output format for the confirmed address
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Debounce window override in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// One line typed by the user
#[derive(Debug, Clone, PartialEq)]
enum PickCommand {
    Event(UserEvent),
    Show,
    Help,
}

fn parse_command(line: &str) -> std::result::Result<PickCommand, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match word.to_lowercase().as_str() {
        "click" => {
            let coords: Vec<&str> = rest.split_whitespace().collect();
            let [lat, lng] = coords.as_slice() else {
                return Err("usage: click LAT LNG".to_string());
            };
            let lat = lat.parse().map_err(|_| format!("invalid latitude: {}", lat))?;
            let lng = lng.parse().map_err(|_| format!("invalid longitude: {}", lng))?;
            Ok(PickCommand::Event(UserEvent::MapClicked { lat, lng }))
        }
        "pick" => {
            let index = rest
                .parse()
                .map_err(|_| format!("invalid suggestion number: {}", rest))?;
            Ok(PickCommand::Event(UserEvent::SuggestionPicked { index }))
        }
        "show" => Ok(PickCommand::Show),
        "confirm" => Ok(PickCommand::Event(UserEvent::ConfirmPressed)),
        "cancel" => Ok(PickCommand::Event(UserEvent::CancelPressed)),
        "help" | "?" => Ok(PickCommand::Help),
        other => match Field::from_str(other) {
            Ok(field) => Ok(PickCommand::Event(UserEvent::FieldEdited {
                field,
                value: rest.to_string(),
            })),
            Err(_) => Err(format!("unknown command: {} (try 'help')", other)),
        },
    }
}

/// Run the pick command
pub async fn run(args: PickArgs) -> Result<()> {
    if args.list_formats {
        println!("Available formats:");
        for f in available_formats() {
            println!("  {:<6} {}", f.name, f.description);
        }
        return Ok(());
    }

    let config = Config::load()?;
    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let mut settings = ResolverSettings::from_config(&config);
    if let Some(ms) = args.debounce_ms {
        settings.debounce = Duration::from_millis(ms);
    }

    let geocoder = Arc::new(NominatimClient::new(&config.geocoder)?);
    let (host, mut notifications) = channel_host();
    let handle = AddressResolver::spawn(geocoder, host, settings);

    eprintln!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut refresh = tokio::time::interval(SUGGESTION_POLL);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shown = Vec::new();
    let mut selected = None;

    'input: loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = refresh.tick() => {
                // Debounced searches finish between keystrokes
                let snapshot = handle.snapshot().await?;
                if let Some(list) = announce_suggestions(&mut shown, &snapshot.suggestions) {
                    eprint!("{}", list);
                }
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(PickCommand::Event(event)) => handle.send(event)?,
            Ok(PickCommand::Show) => {
                let snapshot = handle.snapshot().await?;
                eprint!("{}", TextFormatter.format_snapshot(&snapshot, &config)?);
                continue;
            }
            Ok(PickCommand::Help) => {
                eprintln!("{}", HELP);
                continue;
            }
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        }

        // Replies only after the event is applied, so notifications are queued
        let snapshot = handle.snapshot().await?;
        while let Ok(notification) = notifications.try_recv() {
            match notification {
                HostNotification::AddressSelected(address) => selected = Some(address),
                HostNotification::RequestClose => break 'input,
            }
        }
        if let Some(list) = announce_suggestions(&mut shown, &snapshot.suggestions) {
            eprint!("{}", list);
        }
    }

    handle.close().await?;

    match selected {
        Some(address) => print!("{}", ensure_newline(formatter.format_address(&address, &config)?)),
        None => eprintln!("No address selected"),
    }

    Ok(())
}

/// Rendered list when the suggestions differ from the ones last shown
fn announce_suggestions(shown: &mut Vec<Suggestion>, current: &[Suggestion]) -> Option<String> {
    if shown.as_slice() == current {
        return None;
    }
    *shown = current.to_vec();
    (!current.is_empty()).then(|| format!("Suggestions:\n{}", render_suggestions(current)))
}

fn ensure_newline(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}
