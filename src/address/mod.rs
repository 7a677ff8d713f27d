//! Address records
//!
//! The three free-text fields a user can edit, and the canonical
//! `ResolvedAddress` the widget hands to its host on confirmation.

use crate::geo::{AddressComponents, Position};
use serde::{Deserialize, Serialize};

/// One of the manually editable address fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    StreetAddress,
    City,
    PostalCode,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StreetAddress => write!(f, "street_address"),
            Self::City => write!(f, "city"),
            Self::PostalCode => write!(f, "postal_code"),
        }
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "street" | "street_address" | "street-address" => Ok(Self::StreetAddress),
            "city" => Ok(Self::City),
            "postcode" | "postal_code" | "postal-code" | "zip" => Ok(Self::PostalCode),
            _ => Err(format!("Unknown address field: {}", s)),
        }
    }
}

/// Manually entered address fields
///
/// The empty string means "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualFields {
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
}

impl ManualFields {
    /// Fill all three fields from a service address decomposition
    pub fn from_components(address: &AddressComponents) -> Self {
        Self {
            street_address: address.street().to_string(),
            city: address.locality().to_string(),
            postal_code: address.postal_code().to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::StreetAddress => &self.street_address,
            Field::City => &self.city,
            Field::PostalCode => &self.postal_code,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::StreetAddress => &mut self.street_address,
            Field::City => &mut self.city,
            Field::PostalCode => &mut self.postal_code,
        };
        *slot = value.into();
    }

    /// Non-empty fields in street, postal code, city order
    fn filled(&self) -> impl Iterator<Item = &str> {
        [
            self.street_address.as_str(),
            self.postal_code.as_str(),
            self.city.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
    }

    /// True when every field has a value
    pub fn is_complete(&self) -> bool {
        self.filled().count() == 3
    }

    pub fn is_empty(&self) -> bool {
        self.filled().next().is_none()
    }

    /// Forward-search query: non-empty fields joined with ", "
    pub fn search_query(&self) -> String {
        self.filled().collect::<Vec<_>>().join(", ")
    }

    /// Display string composed when the service provided none
    ///
    /// Always "{street}, {postal code}, {city}", empty fields included.
    pub fn compose_display(&self) -> String {
        format!("{}, {}, {}", self.street_address, self.postal_code, self.city)
    }
}

/// The finalized address committed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub position: Option<Position>,
    pub display_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(street: &str, postal: &str, city: &str) -> ManualFields {
        ManualFields {
            street_address: street.to_string(),
            city: city.to_string(),
            postal_code: postal.to_string(),
        }
    }

    #[test]
    fn test_search_query_skips_empty_fields() {
        assert_eq!(fields("10 rue", "", "Paris").search_query(), "10 rue, Paris");
        assert_eq!(fields("", "75001", "").search_query(), "75001");
        assert_eq!(fields("", "", "").search_query(), "");
    }

    #[test]
    fn test_compose_display_order() {
        let composed = fields("1 Main St", "75001", "Paris").compose_display();
        assert_eq!(composed, "1 Main St, 75001, Paris");
    }

    #[test]
    fn test_compose_display_keeps_empty_slots() {
        assert_eq!(fields("", "", "Paris").compose_display(), ", , Paris");
        assert_eq!(fields("", "", "").compose_display(), ", , ");
        assert_eq!(fields("10 rue", "", "Paris").search_query(), "10 rue, Paris");
    }

    #[test]
    fn test_is_complete() {
        assert!(fields("1 Main St", "75001", "Paris").is_complete());
        assert!(!fields("1 Main St", "", "Paris").is_complete());
        assert!(fields("", "", "").is_empty());
    }

    #[test]
    fn test_get_set() {
        let mut manual = ManualFields::default();
        manual.set(Field::City, "Lyon");
        manual.set(Field::PostalCode, "69001");
        assert_eq!(manual.get(Field::City), "Lyon");
        assert_eq!(manual.get(Field::PostalCode), "69001");
        assert_eq!(manual.get(Field::StreetAddress), "");
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("street".parse::<Field>().unwrap(), Field::StreetAddress);
        assert_eq!("POSTCODE".parse::<Field>().unwrap(), Field::PostalCode);
        assert!("country".parse::<Field>().is_err());
    }

    #[test]
    fn test_from_components() {
        let address = AddressComponents {
            road: Some("Rue de Rivoli".to_string()),
            village: Some("Giverny".to_string()),
            ..AddressComponents::default()
        };
        let manual = ManualFields::from_components(&address);
        assert_eq!(manual, fields("Rue de Rivoli", "", "Giverny"));
    }
}
