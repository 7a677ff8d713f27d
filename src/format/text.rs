//! Human-readable text output formatter

use crate::address::ResolvedAddress;
use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::geo::{Position, Suggestion};
use crate::resolver::ResolverSnapshot;

/// Text formatter - what the widget would display
pub struct TextFormatter;

fn format_position(position: Position) -> String {
    format!("({:.6}, {:.6})", position.lat, position.lng)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Numbered suggestion list, in the order the service ranked them
pub fn render_suggestions(suggestions: &[Suggestion]) -> String {
    suggestions
        .iter()
        .enumerate()
        .map(|(index, suggestion)| format!("  [{}] {}\n", index, suggestion.display_name))
        .collect()
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format_snapshot(&self, snapshot: &ResolverSnapshot, _config: &Config) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("Phase: {:?}\n", snapshot.phase));
        match snapshot.position {
            Some(position) => output.push_str(&format!("Position: {}\n", format_position(position))),
            None => output.push_str(&format!(
                "Map center: {}\n",
                format_position(snapshot.map_center)
            )),
        }
        if !snapshot.display_address.is_empty() {
            output.push_str(&format!("Detected address: {}\n", snapshot.display_address));
        }

        output.push_str(&format!("Street: {}\n", or_dash(&snapshot.fields.street_address)));
        output.push_str(&format!("City: {}\n", or_dash(&snapshot.fields.city)));
        output.push_str(&format!("Postal code: {}\n", or_dash(&snapshot.fields.postal_code)));

        if !snapshot.suggestions.is_empty() {
            output.push_str("Suggestions:\n");
            output.push_str(&render_suggestions(&snapshot.suggestions));
        }

        output.push_str(if snapshot.can_confirm {
            "Confirm: available\n"
        } else {
            "Confirm: unavailable\n"
        });

        Ok(output)
    }

    fn format_address(&self, address: &ResolvedAddress, _config: &Config) -> Result<String> {
        let mut output = format!("Address: {}\n", address.display_address);
        if let Some(position) = address.position {
            output.push_str(&format!("Position: {}\n", format_position(position)));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Field;
    use crate::geo::AddressComponents;
    use crate::resolver::{Event, ResolverState, UserEvent};

    fn suggestion(name: &str) -> Suggestion {
        Suggestion {
            display_name: name.to_string(),
            position: Position::new(48.86, 2.33),
            address: AddressComponents::default(),
        }
    }

    #[test]
    fn test_render_suggestions_keeps_order() {
        let rendered = render_suggestions(&[suggestion("B first"), suggestion("A second")]);
        assert_eq!(rendered, "  [0] B first\n  [1] A second\n");
    }

    #[test]
    fn test_text_snapshot() {
        let mut state = ResolverState::new(5);
        state.apply(Event::User(UserEvent::FieldEdited {
            field: Field::City,
            value: "Paris".to_string(),
        }));

        let output = TextFormatter
            .format_snapshot(&state.snapshot(), &Config::default())
            .unwrap();

        assert!(output.contains("Map center: (48.856600, 2.352200)"));
        assert!(output.contains("City: Paris"));
        assert!(output.contains("Street: -"));
        assert!(output.contains("Confirm: unavailable"));
        assert!(!output.contains("Suggestions:"));
    }

    #[test]
    fn test_text_address() {
        let address = ResolvedAddress {
            position: None,
            display_address: "1 Main St, 75001, Paris".to_string(),
        };
        let output = TextFormatter.format_address(&address, &Config::default()).unwrap();
        assert_eq!(output, "Address: 1 Main St, 75001, Paris\n");
    }

    #[test]
    fn test_text_formatter_info() {
        assert_eq!(TextFormatter.name(), "text");
        assert!(!TextFormatter.description().is_empty());
    }
}
