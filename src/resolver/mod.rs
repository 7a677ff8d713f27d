//! Address resolution widget
//!
//! Reconciles three independent input channels into one canonical address:
//! - map clicks (reverse lookup of the clicked position)
//! - manual field edits (debounced forward search for suggestions)
//! - suggestion picks (atomic fill from the chosen candidate)
//!
//! `state` holds the pure transition function, `driver` runs it on tokio
//! against a [`Geocoder`](crate::geo::Geocoder), `host` is the boundary to
//! whoever opened the widget.

pub mod driver;
pub mod host;
pub mod state;


pub use driver::{AddressResolver, ResolverHandle, ResolverSettings};
pub use host::{channel_host, AddressHost, HostNotification};
pub use state::{Effect, Event, Phase, ResolverSnapshot, ResolverState, UserEvent};
