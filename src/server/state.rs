//! Server shared state
//!
//! Holds configuration, the geocoder shared by every request, and the open
//! picker sessions. Each picker session is one address resolver task; the
//! server is the host that receives its notifications.
//!
//! The session table lock only guards lookups and removals. Round trips to
//! a resolver happen under that session's own lock, so a busy picker never
//! stalls the others.

use crate::address::ResolvedAddress;
use crate::config::Config;
use crate::error::Result;
use crate::geo::Geocoder;
use crate::resolver::{
    channel_host, AddressResolver, HostNotification, ResolverHandle, ResolverSettings,
    ResolverSnapshot, UserEvent,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// One open address widget
struct PickerSession {
    handle: ResolverHandle,
    notifications: mpsc::UnboundedReceiver<HostNotification>,
    opened_at: DateTime<Utc>,
    last_active: Instant,
}

type SharedSession = Arc<Mutex<PickerSession>>;

/// What the host observed after forwarding one user event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerUpdate {
    pub snapshot: ResolverSnapshot,
    /// Address emitted by the widget, if it confirmed
    pub selected: Option<ResolvedAddress>,
    /// The widget asked to be closed and the session is gone
    pub closed: bool,
}

/// Shared state for the HTTP server
pub struct AppState<G> {
    /// Configuration
    pub config: Config,

    geocoder: Arc<G>,
    sessions: Mutex<HashMap<Uuid, SharedSession>>,
    started_at: std::time::Instant,
}

impl<G: Geocoder + 'static> AppState<G> {
    /// Create new application state
    pub fn new(config: Config, geocoder: Arc<G>) -> Self {
        Self {
            config,
            geocoder,
            sessions: Mutex::new(HashMap::new()),
            started_at: std::time::Instant::now(),
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Number of open picker sessions
    pub async fn open_pickers(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn session(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Open a new picker session
    pub async fn open_picker(&self) -> Result<(Uuid, ResolverSnapshot)> {
        let (host, notifications) = channel_host();
        let handle = AddressResolver::spawn(
            Arc::clone(&self.geocoder),
            host,
            ResolverSettings::from_config(&self.config),
        );
        let snapshot = handle.snapshot().await?;

        let id = Uuid::new_v4();
        let session = PickerSession {
            handle,
            notifications,
            opened_at: Utc::now(),
            last_active: Instant::now(),
        };
        self.sessions
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        info!(%id, "picker opened");

        Ok((id, snapshot))
    }

    /// Current snapshot of a picker, `None` if no such session
    pub async fn picker_snapshot(&self, id: Uuid) -> Result<Option<ResolverSnapshot>> {
        let Some(session) = self.session(id).await else {
            return Ok(None);
        };

        let mut session = session.lock().await;
        session.last_active = Instant::now();
        Ok(Some(session.handle.snapshot().await?))
    }

    /// Forward a user event to a picker, `None` if no such session
    ///
    /// When the widget requests close the session is closed and removed.
    pub async fn send_event(&self, id: Uuid, event: UserEvent) -> Result<Option<PickerUpdate>> {
        let Some(shared) = self.session(id).await else {
            return Ok(None);
        };

        let update = {
            let mut session = shared.lock().await;
            session.last_active = Instant::now();
            session.handle.send(event)?;
            // The snapshot reply is sent after the event is applied, so every
            // notification it produced is already queued.
            let snapshot = session.handle.snapshot().await?;

            let mut selected = None;
            let mut closed = false;
            while let Ok(notification) = session.notifications.try_recv() {
                match notification {
                    HostNotification::AddressSelected(address) => selected = Some(address),
                    HostNotification::RequestClose => closed = true,
                }
            }

            PickerUpdate {
                snapshot,
                selected,
                closed,
            }
        };

        if update.closed {
            let removed = self.sessions.lock().await.remove(&id);
            if let Some(session) = removed {
                Self::shutdown(id, &session, "closed by widget").await;
            }
        }

        Ok(Some(update))
    }

    /// Close a picker on behalf of the parent, returns false if unknown
    pub async fn close_picker(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id);
        match removed {
            Some(session) => {
                Self::shutdown(id, &session, "closed by parent").await;
                true
            }
            None => false,
        }
    }

    /// Close every session untouched for at least `ttl`, returns how many
    ///
    /// Sessions busy with a request are skipped.
    pub async fn reap_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let expired: Vec<(Uuid, SharedSession)> = {
            let mut sessions = self.sessions.lock().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, session)| {
                    session
                        .try_lock()
                        .map(|session| now.duration_since(session.last_active) >= ttl)
                        .unwrap_or(false)
                })
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|session| (id, session)))
                .collect()
        };

        for (id, session) in &expired {
            Self::shutdown(*id, session, "idle").await;
        }
        expired.len()
    }

    /// Periodically reap idle sessions, `None` when the TTL is disabled
    ///
    /// The task stops once the state is dropped.
    pub fn spawn_reaper(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let ttl = self.config.server.session_ttl()?;
        let period = (ttl / 4).max(Duration::from_secs(1));
        let state = Arc::downgrade(self);

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let Some(state) = state.upgrade() else {
                    break;
                };
                let reaped = state.reap_idle(ttl).await;
                if reaped > 0 {
                    debug!(reaped, "idle pickers reaped");
                }
            }
        }))
    }

    async fn shutdown(id: Uuid, session: &SharedSession, reason: &str) {
        let session = session.lock().await;
        session.handle.shutdown();
        let open_secs = (Utc::now() - session.opened_at).num_seconds();
        info!(%id, open_secs, reason, "picker closed");
    }
}
