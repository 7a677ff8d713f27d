//! Address resolver state machine
//!
//! A pure reducer: every input (user interaction, timer expiry, geocoding
//! completion) is an [`Event`] applied by [`ResolverState::apply`], which
//! mutates the state in one step and returns the [`Effect`]s the driver must
//! carry out. Nothing here touches the network or the clock.
//!
//! Supersession: every timer and request gets an id from one monotonically
//! increasing counter. A timer expiry or completion is applied only when its
//! id is the latest one issued on its channel; anything older is dropped.

use crate::address::{Field, ManualFields, ResolvedAddress};
use crate::constants::map;
use crate::error::Error;
use crate::geo::{Placemark, Position, Suggestion};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Widget phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing entered yet
    Idle,
    /// Map clicked, waiting for the reverse lookup
    PendingReverseLookup,
    /// Position and/or address populated
    Resolved,
    /// Debounce fired, waiting for forward search
    Searching,
    /// A non-empty suggestion list is shown
    SuggestionsShown,
    /// Address emitted to the host (terminal)
    Confirmed,
    /// Closed without emitting (terminal)
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Confirmed | Phase::Cancelled)
    }
}

/// Interactions coming from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    MapClicked { lat: f64, lng: f64 },
    FieldEdited { field: Field, value: String },
    SuggestionPicked { index: usize },
    ConfirmPressed,
    CancelPressed,
}

/// Everything the reducer reacts to
#[derive(Debug)]
pub enum Event {
    User(UserEvent),
    /// A debounce timer ran to completion
    DebounceElapsed { ticket: u64 },
    ReverseCompleted {
        request: u64,
        outcome: Result<Placemark, Error>,
    },
    SearchCompleted {
        request: u64,
        outcome: Result<Vec<Suggestion>, Error>,
    },
}

impl From<UserEvent> for Event {
    fn from(event: UserEvent) -> Self {
        Event::User(event)
    }
}

/// Work the driver performs on behalf of the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)start the single debounce timer; any running timer is dropped
    StartDebounce { ticket: u64 },
    CancelDebounce,
    ReverseLookup { request: u64, position: Position },
    ForwardSearch { request: u64, query: String, limit: usize },
    /// onAddressSelected
    AddressSelected(ResolvedAddress),
    /// onRequestClose
    RequestClose,
}

/// Observable view of the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverSnapshot {
    pub phase: Phase,
    pub position: Option<Position>,
    pub fields: ManualFields,
    pub display_address: String,
    pub suggestions: Vec<Suggestion>,
    pub can_confirm: bool,
    /// Where the map is centered: the position, else the default view
    pub map_center: Position,
}

/// Reconciliation state for one open/close cycle of the widget
#[derive(Debug, Clone)]
pub struct ResolverState {
    phase: Phase,
    position: Option<Position>,
    fields: ManualFields,
    display_address: String,
    suggestions: Vec<Suggestion>,
    suggestion_limit: usize,
    map_center: Position,
    confirmed: Option<ResolvedAddress>,

    next_id: u64,
    debounce_ticket: Option<u64>,
    latest_reverse: u64,
    reverse_in_flight: bool,
    latest_search: u64,
    search_in_flight: bool,
}

impl ResolverState {
    /// Fresh state, as when the widget opens
    pub fn new(suggestion_limit: usize) -> Self {
        Self {
            phase: Phase::Idle,
            position: None,
            fields: ManualFields::default(),
            display_address: String::new(),
            suggestions: Vec::new(),
            suggestion_limit: suggestion_limit.max(1),
            map_center: Position::new(map::CENTER_LAT, map::CENTER_LNG),
            confirmed: None,
            next_id: 0,
            debounce_ticket: None,
            latest_reverse: 0,
            reverse_in_flight: false,
            latest_search: 0,
            search_in_flight: false,
        }
    }

    /// Use a different default map view
    pub fn with_map_center(mut self, center: Position) -> Self {
        self.map_center = center;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn fields(&self) -> &ManualFields {
        &self.fields
    }

    pub fn display_address(&self) -> &str {
        &self.display_address
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Address emitted on confirmation, if any
    pub fn confirmed(&self) -> Option<&ResolvedAddress> {
        self.confirmed.as_ref()
    }

    /// Confirm guard: a position, or all three manual fields filled
    pub fn can_confirm(&self) -> bool {
        !self.phase.is_terminal() && (self.position.is_some() || self.fields.is_complete())
    }

    /// Display address to emit: the service string, else the composed fields
    pub fn final_display_address(&self) -> String {
        if self.display_address.is_empty() {
            self.fields.compose_display()
        } else {
            self.display_address.clone()
        }
    }

    pub fn snapshot(&self) -> ResolverSnapshot {
        ResolverSnapshot {
            phase: self.phase,
            position: self.position,
            fields: self.fields.clone(),
            display_address: self.display_address.clone(),
            suggestions: self.suggestions.clone(),
            can_confirm: self.can_confirm(),
            map_center: self.position.unwrap_or(self.map_center),
        }
    }

    fn issue_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Make any in-flight forward search stale
    fn invalidate_search(&mut self) {
        self.latest_search = self.issue_id();
        self.search_in_flight = false;
    }

    /// Make any in-flight reverse lookup stale
    fn invalidate_reverse(&mut self) {
        self.latest_reverse = self.issue_id();
        self.reverse_in_flight = false;
    }

    /// Derive the non-terminal phase from the current data
    fn settle(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = if self.reverse_in_flight {
            Phase::PendingReverseLookup
        } else if self.search_in_flight {
            Phase::Searching
        } else if !self.suggestions.is_empty() {
            Phase::SuggestionsShown
        } else if self.position.is_some()
            || !self.fields.is_empty()
            || !self.display_address.is_empty()
        {
            Phase::Resolved
        } else {
            Phase::Idle
        };
    }

    /// Apply one event, returning the effects to perform
    ///
    /// Once the state is terminal every event is ignored, so the host is
    /// notified at most once per open/close cycle.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        if self.phase.is_terminal() {
            debug!(phase = ?self.phase, ?event, "ignoring event after close");
            return Vec::new();
        }

        let effects = match event {
            Event::User(UserEvent::MapClicked { lat, lng }) => self.on_map_clicked(Position::new(lat, lng)),
            Event::User(UserEvent::FieldEdited { field, value }) => self.on_field_edited(field, value),
            Event::User(UserEvent::SuggestionPicked { index }) => self.on_suggestion_picked(index),
            Event::User(UserEvent::ConfirmPressed) => self.on_confirm(),
            Event::User(UserEvent::CancelPressed) => self.on_cancel(),
            Event::DebounceElapsed { ticket } => self.on_debounce_elapsed(ticket),
            Event::ReverseCompleted { request, outcome } => self.on_reverse_completed(request, outcome),
            Event::SearchCompleted { request, outcome } => self.on_search_completed(request, outcome),
        };

        self.settle();
        effects
    }

    fn on_map_clicked(&mut self, position: Position) -> Vec<Effect> {
        if let Err(e) = position.validate() {
            warn!("ignoring map click: {}", e);
            return Vec::new();
        }

        self.position = Some(position);
        let request = self.issue_id();
        self.latest_reverse = request;
        self.reverse_in_flight = true;

        vec![Effect::ReverseLookup { request, position }]
    }

    fn on_field_edited(&mut self, field: Field, value: String) -> Vec<Effect> {
        self.fields.set(field, value);

        let ticket = self.issue_id();
        self.debounce_ticket = Some(ticket);

        vec![Effect::StartDebounce { ticket }]
    }

    fn on_debounce_elapsed(&mut self, ticket: u64) -> Vec<Effect> {
        if self.debounce_ticket != Some(ticket) {
            debug!(ticket, "dropping superseded debounce timer");
            return Vec::new();
        }
        self.debounce_ticket = None;

        let query = self.fields.search_query();
        if query.trim().is_empty() {
            self.invalidate_search();
            self.suggestions.clear();
            return Vec::new();
        }

        let request = self.issue_id();
        self.latest_search = request;
        self.search_in_flight = true;

        vec![Effect::ForwardSearch {
            request,
            query,
            limit: self.suggestion_limit,
        }]
    }

    fn on_reverse_completed(&mut self, request: u64, outcome: Result<Placemark, Error>) -> Vec<Effect> {
        if request != self.latest_reverse {
            debug!(request, latest = self.latest_reverse, "dropping stale reverse lookup");
            return Vec::new();
        }
        self.reverse_in_flight = false;

        match outcome {
            Ok(placemark) => {
                self.fields = ManualFields::from_components(&placemark.address);
                self.display_address = placemark.display_name.unwrap_or_default();
            }
            Err(e) => warn!("reverse lookup failed: {}", e),
        }

        Vec::new()
    }

    fn on_search_completed(&mut self, request: u64, outcome: Result<Vec<Suggestion>, Error>) -> Vec<Effect> {
        if request != self.latest_search {
            debug!(request, latest = self.latest_search, "dropping stale search results");
            return Vec::new();
        }
        self.search_in_flight = false;

        match outcome {
            Ok(suggestions) => self.suggestions = suggestions,
            Err(e) => warn!("forward search failed: {}", e),
        }

        Vec::new()
    }

    fn on_suggestion_picked(&mut self, index: usize) -> Vec<Effect> {
        if index >= self.suggestions.len() {
            warn!(index, available = self.suggestions.len(), "ignoring pick of missing suggestion");
            return Vec::new();
        }

        let picked = self.suggestions.swap_remove(index);
        self.position = Some(picked.position);
        self.fields = ManualFields::from_components(&picked.address);
        self.display_address = picked.display_name;
        self.suggestions.clear();

        self.debounce_ticket = None;
        self.invalidate_search();
        self.invalidate_reverse();

        vec![Effect::CancelDebounce]
    }

    fn on_confirm(&mut self) -> Vec<Effect> {
        if !self.can_confirm() {
            debug!("confirm pressed without a position or complete fields");
            return Vec::new();
        }

        let resolved = ResolvedAddress {
            position: self.position,
            display_address: self.final_display_address(),
        };

        self.debounce_ticket = None;
        self.invalidate_search();
        self.invalidate_reverse();
        self.confirmed = Some(resolved.clone());
        self.phase = Phase::Confirmed;

        vec![
            Effect::CancelDebounce,
            Effect::AddressSelected(resolved),
            Effect::RequestClose,
        ]
    }

    fn on_cancel(&mut self) -> Vec<Effect> {
        let next_id = self.next_id;
        *self = Self::new(self.suggestion_limit).with_map_center(self.map_center);
        self.next_id = next_id;
        self.phase = Phase::Cancelled;

        vec![Effect::CancelDebounce, Effect::RequestClose]
    }
}
