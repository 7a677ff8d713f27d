//! geopick: address picking backed by a geocoding service
//!
//! A library and CLI tool that reconciles a map click, manually typed
//! address fields and ranked search suggestions into one confirmed address.
//!
//! ## Features
//!
//! - Nominatim-compatible geocoding client (reverse lookup, forward search)
//! - Address resolver with debounced search and stale-response supersession
//! - Confirm guard and once-only emission to the host
//! - HTTP picker sessions + interactive CLI picker
//!
//! ## Quick Start
//!
//! ```rust
//! use geopick::address::Field;
//! use geopick::resolver::{Effect, Phase, ResolverState, UserEvent};
//!
//! let mut state = ResolverState::new(5);
//!
//! // Typing starts the debounce timer
//! let effects = state.apply(UserEvent::FieldEdited {
//!     field: Field::City,
//!     value: "Paris".to_string(),
//! }.into());
//! assert!(matches!(effects[0], Effect::StartDebounce { .. }));
//!
//! // A map click asks for a reverse lookup and enables confirm
//! state.apply(UserEvent::MapClicked { lat: 48.8606, lng: 2.3376 }.into());
//! assert_eq!(state.phase(), Phase::PendingReverseLookup);
//! assert!(state.can_confirm());
//! ```

pub mod address;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod geo;
pub mod resolver;
pub mod server;

// Re-export commonly used types
pub use address::{Field, ManualFields, ResolvedAddress};
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{Geocoder, Placemark, Position, Suggestion};
pub use resolver::{AddressResolver, ResolverHandle, ResolverSnapshot, UserEvent};
