//! Address resolver runtime
//!
//! Runs one [`ResolverState`] on its own tokio task. User events and
//! geocoding completions are funnelled through channels into that single
//! task, so the state has exactly one writer and needs no locking. The task
//! owns the debounce timer and the in-flight geocoding calls, and aborts
//! them all when the widget is closed.

use crate::address::ResolvedAddress;
use crate::config::Config;
use crate::constants;
use crate::error::{Error, Result};
use crate::geo::{Geocoder, Position};
use crate::resolver::host::AddressHost;
use crate::resolver::state::{Effect, Event, ResolverSnapshot, ResolverState, UserEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Tunables for one resolver instance
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Quiet window after the last field edit
    pub debounce: Duration,
    /// Suggestions requested per search
    pub suggestion_limit: usize,
    /// Map center while no position is chosen
    pub map_center: Position,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(constants::resolver::DEBOUNCE_MS),
            suggestion_limit: constants::resolver::SEARCH_LIMIT,
            map_center: Position::new(constants::map::CENTER_LAT, constants::map::CENTER_LNG),
        }
    }
}

impl ResolverSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            suggestion_limit: config.geocoder.search_limit,
            map_center: config.map.center(),
        }
    }
}

enum Command {
    Event(UserEvent),
    Snapshot(oneshot::Sender<ResolverSnapshot>),
    Close,
}

/// Handle held by the host while the widget is open
#[derive(Debug)]
pub struct ResolverHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<Option<ResolvedAddress>>,
}

impl ResolverHandle {
    /// Forward a user interaction to the resolver
    pub fn send(&self, event: UserEvent) -> Result<()> {
        self.commands
            .send(Command::Event(event))
            .map_err(|_| Error::Session("address resolver is closed".to_string()))
    }

    /// Current view of the widget, after every previously sent event
    pub async fn snapshot(&self) -> Result<ResolverSnapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply))
            .map_err(|_| Error::Session("address resolver is closed".to_string()))?;
        response
            .await
            .map_err(|_| Error::Session("address resolver stopped before replying".to_string()))
    }

    /// False once the resolver task has stopped
    pub fn is_open(&self) -> bool {
        !self.task.is_finished()
    }

    /// Ask the resolver to stop without waiting for it
    ///
    /// Pending timers and calls are dropped by the task itself.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Close);
    }

    /// The parent requests close: pending timers and calls are dropped
    ///
    /// Returns the confirmed address, if the user confirmed one.
    pub async fn close(self) -> Result<Option<ResolvedAddress>> {
        let _ = self.commands.send(Command::Close);
        self.task
            .await
            .map_err(|e| Error::Session(format!("address resolver task failed: {}", e)))
    }
}

/// Single-task owner of a [`ResolverState`]
pub struct AddressResolver<G, H> {
    state: ResolverState,
    geocoder: Arc<G>,
    host: H,
    debounce: Duration,
    completions: mpsc::UnboundedSender<Event>,
    debounce_timer: Option<JoinHandle<()>>,
    in_flight: Vec<JoinHandle<()>>,
}

impl<G, H> AddressResolver<G, H>
where
    G: Geocoder + 'static,
    H: AddressHost,
{
    /// Open a widget: spawn its resolver task and return the host's handle
    pub fn spawn(geocoder: Arc<G>, host: H, settings: ResolverSettings) -> ResolverHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let resolver = Self {
            state: ResolverState::new(settings.suggestion_limit).with_map_center(settings.map_center),
            geocoder,
            host,
            debounce: settings.debounce,
            completions: completions_tx,
            debounce_timer: None,
            in_flight: Vec::new(),
        };

        let task = tokio::spawn(resolver.run(commands_rx, completions_rx));

        ResolverHandle {
            commands: commands_tx,
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Event>,
    ) -> Option<ResolvedAddress> {
        info!("address resolver opened");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Event(event)) => self.dispatch(event.into()),
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(self.state.snapshot());
                    }
                    Some(Command::Close) | None => break,
                },
                Some(event) = completions.recv() => self.dispatch(event),
            }
        }

        self.teardown();
        info!(phase = ?self.state.phase(), "address resolver closed");
        self.state.confirmed().cloned()
    }

    fn dispatch(&mut self, event: Event) {
        for effect in self.state.apply(event) {
            match effect {
                Effect::StartDebounce { ticket } => {
                    self.cancel_debounce();
                    let completions = self.completions.clone();
                    let delay = self.debounce;
                    self.debounce_timer = Some(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = completions.send(Event::DebounceElapsed { ticket });
                    }));
                }
                Effect::CancelDebounce => self.cancel_debounce(),
                Effect::ReverseLookup { request, position } => {
                    debug!(request, lat = position.lat, lng = position.lng, "reverse lookup");
                    let geocoder = Arc::clone(&self.geocoder);
                    let completions = self.completions.clone();
                    self.track(tokio::spawn(async move {
                        let outcome = geocoder.reverse_lookup(position.lat, position.lng).await;
                        let _ = completions.send(Event::ReverseCompleted { request, outcome });
                    }));
                }
                Effect::ForwardSearch { request, query, limit } => {
                    debug!(request, %query, limit, "forward search");
                    let geocoder = Arc::clone(&self.geocoder);
                    let completions = self.completions.clone();
                    self.track(tokio::spawn(async move {
                        let outcome = geocoder.forward_search(&query, limit).await;
                        let _ = completions.send(Event::SearchCompleted { request, outcome });
                    }));
                }
                Effect::AddressSelected(address) => {
                    info!(address = %address.display_address, "address confirmed");
                    self.host.address_selected(address);
                }
                Effect::RequestClose => self.host.request_close(),
            }
        }
    }

    fn cancel_debounce(&mut self) {
        if let Some(timer) = self.debounce_timer.take() {
            timer.abort();
        }
    }

    fn track(&mut self, call: JoinHandle<()>) {
        self.in_flight.retain(|call| !call.is_finished());
        self.in_flight.push(call);
    }

    fn teardown(&mut self) {
        self.cancel_debounce();
        for call in self.in_flight.drain(..) {
            call.abort();
        }
    }
}
