use std::sync::{Arc, Weak};

use ata_settings::SettingsProvider;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::error::{Result, SessionError};
use super::events::RegistryEvent;
use super::gateway::{Gateway, OutputReceiver};
use super::history::CommandHistory;
use super::session::{Session, SessionId, SessionInfo, TerminalSize};
use super::{DEFAULT_BUFFER_LIMIT, EVENT_CHANNEL_CAPACITY};

/// Tunables for a registry instance
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Size given to new sessions when the caller passes no hint
    pub default_size: TerminalSize,
    /// Per-session output limit in bytes; `None` keeps everything
    pub buffer_limit: Option<usize>,
    /// Capacity of the change notification channel
    pub event_capacity: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            default_size: TerminalSize::default(),
            buffer_limit: Some(DEFAULT_BUFFER_LIMIT),
            event_capacity: EVENT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Default)]
struct RegistryState {
    // Insertion order matters: closing the active session activates the first one
    sessions: Vec<Session>,
    active_id: Option<SessionId>,
    history: CommandHistory,
    titles_issued: usize,
    connected: bool,
}

impl RegistryState {
    fn position(&self, id: &SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| &s.id == id)
    }

    fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| &s.id == id)
    }

    fn contains(&self, id: &SessionId) -> bool {
        self.position(id).is_some()
    }
}

/// Owns the set of terminal sessions, the active-session pointer and the
/// shared command history, and mediates every lifecycle operation through
/// the gateway.
///
/// Registry state sits behind a synchronous mutex that is never held across
/// an await. Gateway calls for the same session are serialized by that
/// session's operation lock.
pub struct SessionRegistry {
    gateway: Arc<dyn Gateway>,
    settings: Arc<dyn SettingsProvider>,
    options: RegistryOptions,
    state: Arc<Mutex<RegistryState>>,
    events: broadcast::Sender<RegistryEvent>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SessionRegistry")
            .field("gateway", &self.gateway.gateway_name())
            .field("sessions", &state.sessions.len())
            .field("active_id", &state.active_id)
            .field("options", &self.options)
            .finish()
    }
}

impl SessionRegistry {
    pub fn new(gateway: Arc<dyn Gateway>, settings: Arc<dyn SettingsProvider>) -> Self {
        Self::with_options(gateway, settings, RegistryOptions::default())
    }

    pub fn with_options(
        gateway: Arc<dyn Gateway>,
        settings: Arc<dyn SettingsProvider>,
        options: RegistryOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        debug!(gateway = gateway.gateway_name(), "session registry created");
        Self {
            gateway,
            settings,
            options,
            state: Arc::new(Mutex::new(RegistryState::default())),
            events,
        }
    }

    /// Receive a notification after every state change
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: RegistryEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    fn op_lock(&self, id: &SessionId) -> Option<Arc<tokio::sync::Mutex<()>>> {
        self.state.lock().get(id).map(Session::op_lock)
    }

    fn contains(&self, id: &SessionId) -> bool {
        self.state.lock().contains(id)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create a session with the default size and make it active
    pub async fn create_session(&self) -> Result<SessionId> {
        self.create_session_with_size(None).await
    }

    /// Create a session, make it active and return its gateway-issued id.
    /// Nothing is inserted when the gateway call fails.
    pub async fn create_session_with_size(&self, size: Option<TerminalSize>) -> Result<SessionId> {
        let size = size.unwrap_or(self.options.default_size);
        let created = self.gateway.create(Some(size)).await.map_err(|e| {
            warn!(error = %e, "failed to create session");
            SessionError::from(e)
        })?;
        let settings = self.settings.terminal_settings();
        let id = created.id;

        let title = {
            let mut state = self.state.lock();
            if state.contains(&id) {
                warn!(session = %id, "gateway issued an id that is already registered");
                return Err(SessionError::GatewayError {
                    status: None,
                    message: format!("gateway issued duplicate session id '{}'", id),
                });
            }
            state.titles_issued += 1;
            let title = format!("Terminal {}", state.titles_issued);
            state.sessions.push(Session::new(
                id.clone(),
                title.clone(),
                size,
                settings,
                self.options.buffer_limit,
            ));
            state.active_id = Some(id.clone());
            title
        };

        debug!(session = %id, %title, %size, "session created");
        self.emit(RegistryEvent::SessionCreated {
            id: id.clone(),
            title,
        });
        Ok(id)
    }

    /// Close a session through the gateway and drop it locally.
    /// If it was active, the first remaining session becomes active.
    pub async fn close_session(&self, id: &SessionId) -> Result<()> {
        let op_lock = self
            .op_lock(id)
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))?;
        let _guard = op_lock.lock().await;

        // A concurrent close may have won the race while we waited
        if !self.contains(id) {
            return Err(SessionError::SessionNotFound(id.clone()));
        }

        self.gateway.close(id).await.map_err(|e| {
            warn!(session = %id, error = %e, "failed to close session");
            SessionError::from(e)
        })?;

        let active_id = {
            let mut state = self.state.lock();
            let Some(index) = state.position(id) else {
                return Err(SessionError::SessionNotFound(id.clone()));
            };
            state.sessions.remove(index);
            if state.active_id.as_ref() == Some(id) {
                state.active_id = state.sessions.first().map(|s| s.id.clone());
            }
            state.active_id.clone()
        };

        debug!(session = %id, active = ?active_id, "session closed");
        self.emit(RegistryEvent::SessionClosed {
            id: id.clone(),
            active_id,
        });
        Ok(())
    }

    /// Focus a session. Unknown ids are ignored so that a switch racing a
    /// close does not fail.
    pub fn set_active_session(&self, id: &SessionId) -> bool {
        {
            let mut state = self.state.lock();
            if !state.contains(id) {
                trace!(session = %id, "ignoring switch to unknown session");
                return false;
            }
            state.active_id = Some(id.clone());
        }
        self.emit(RegistryEvent::ActiveChanged {
            active_id: Some(id.clone()),
        });
        true
    }

    /// Send a command to the active session and record it in history.
    /// History is untouched when anything fails.
    pub async fn send_command(&self, command: &str) -> Result<()> {
        let (id, op_lock) = {
            let state = self.state.lock();
            let id = state.active_id.clone().ok_or(SessionError::NoActiveSession)?;
            let op_lock = state
                .get(&id)
                .map(Session::op_lock)
                .ok_or_else(|| SessionError::SessionNotFound(id.clone()))?;
            (id, op_lock)
        };
        if command.is_empty() {
            return Err(SessionError::EmptyCommand);
        }

        let _guard = op_lock.lock().await;
        if !self.contains(&id) {
            return Err(SessionError::SessionNotFound(id));
        }

        self.gateway.send_command(&id, command).await.map_err(|e| {
            warn!(session = %id, error = %e, "failed to send command");
            SessionError::from(e)
        })?;

        {
            let mut state = self.state.lock();
            if !state.contains(&id) {
                return Err(SessionError::SessionNotFound(id));
            }
            state.history.record(command);
        }

        debug!(session = %id, command, "command sent");
        self.emit(RegistryEvent::CommandSent {
            id,
            command: command.to_string(),
        });
        Ok(())
    }

    /// Append pushed output to a session's buffer.
    /// Output for a session that no longer exists is dropped.
    pub fn append_output(&self, id: &SessionId, data: &str) -> bool {
        {
            let mut state = self.state.lock();
            match state.get_mut(id) {
                Some(session) => session.buffer.push(data),
                None => {
                    trace!(session = %id, bytes = data.len(), "dropping output for unknown session");
                    return false;
                }
            }
        }
        self.emit(RegistryEvent::OutputAppended {
            id: id.clone(),
            data: data.to_string(),
        });
        true
    }

    pub fn clear_buffer(&self, id: &SessionId) -> bool {
        {
            let mut state = self.state.lock();
            match state.get_mut(id) {
                Some(session) => session.buffer.clear(),
                None => return false,
            }
        }
        self.emit(RegistryEvent::BufferCleared { id: id.clone() });
        true
    }

    /// Update a session's dimensions right away and notify the gateway in
    /// the background.
    ///
    /// The notification sends whatever size the session has once it holds
    /// the operation lock, so back-to-back resizes leave the remote terminal
    /// at the newest size. Returns `None` for an unknown session, or when
    /// no tokio runtime is available to carry the notification; the handle
    /// may be dropped.
    pub fn resize(&self, id: &SessionId, size: TerminalSize) -> Option<JoinHandle<()>> {
        let op_lock = {
            let mut state = self.state.lock();
            let session = state.get_mut(id)?;
            session.size = size;
            session.op_lock()
        };
        debug!(session = %id, %size, "session resized");
        self.emit(RegistryEvent::Resized {
            id: id.clone(),
            size,
        });

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(session = %id, %size, "no async runtime, resize applied locally only");
            return None;
        };

        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);
        let id = id.clone();
        Some(runtime.spawn(async move {
            let _guard = op_lock.lock().await;
            let current = state.lock().get(&id).map(|s| s.size);
            let Some(current) = current else {
                trace!(session = %id, "session closed before resize was sent");
                return;
            };
            if let Err(e) = gateway.resize(&id, current).await {
                warn!(session = %id, error = %e, "resize notification failed");
            }
        }))
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Re-read the settings provider into one existing session
    pub fn reapply_settings(&self, id: &SessionId) -> bool {
        let settings = self.settings.terminal_settings();
        {
            let mut state = self.state.lock();
            match state.get_mut(id) {
                Some(session) => session.settings = settings,
                None => return false,
            }
        }
        self.emit(RegistryEvent::SettingsApplied {
            ids: vec![id.clone()],
        });
        true
    }

    /// Re-read the settings provider into every session; returns how many
    pub fn reapply_settings_all(&self) -> usize {
        let settings = self.settings.terminal_settings();
        let ids: Vec<SessionId> = {
            let mut state = self.state.lock();
            state
                .sessions
                .iter_mut()
                .map(|session| {
                    session.settings = settings.clone();
                    session.id.clone()
                })
                .collect()
        };
        let count = ids.len();
        self.emit(RegistryEvent::SettingsApplied { ids });
        count
    }

    // ------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------

    pub fn set_connection_status(&self, connected: bool) {
        let changed = {
            let mut state = self.state.lock();
            let changed = state.connected != connected;
            state.connected = connected;
            changed
        };
        if changed {
            debug!(connected, "connection status changed");
            self.emit(RegistryEvent::ConnectionChanged { connected });
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Probe the gateway and record the outcome as the connection status
    pub async fn check_connection(&self) -> bool {
        let connected = match self.gateway.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "gateway health check failed");
                false
            }
        };
        self.set_connection_status(connected);
        connected
    }

    // ------------------------------------------------------------------
    // Push channel
    // ------------------------------------------------------------------

    /// Drain the gateway's push channel into session buffers until the
    /// channel closes or the registry is dropped
    pub fn spawn_output_pump(self: &Arc<Self>, mut rx: OutputReceiver) -> JoinHandle<()> {
        let registry: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                registry.append_output(&chunk.id, &chunk.data);
            }
            debug!("output pump stopped");
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn active_id(&self) -> Option<SessionId> {
        self.state.lock().active_id.clone()
    }

    pub fn active_session(&self) -> Option<SessionInfo> {
        let state = self.state.lock();
        let id = state.active_id.as_ref()?;
        state.get(id).map(Session::info)
    }

    pub fn session(&self, id: &SessionId) -> Option<SessionInfo> {
        self.state.lock().get(id).map(Session::info)
    }

    /// All sessions in insertion order
    pub fn sessions(&self) -> Vec<SessionInfo> {
        self.state.lock().sessions.iter().map(Session::info).collect()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.state.lock().sessions.iter().map(|s| s.id.clone()).collect()
    }

    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    pub fn has_sessions(&self) -> bool {
        !self.state.lock().sessions.is_empty()
    }

    pub fn buffer(&self, id: &SessionId) -> Option<String> {
        self.state.lock().get(id).map(|s| s.buffer.as_str().to_string())
    }

    /// Buffer contents with escape sequences removed
    pub fn plain_text(&self, id: &SessionId) -> Option<String> {
        self.state.lock().get(id).map(|s| s.buffer.plain_text())
    }

    /// Visible screen of a session, rendered at its current size
    pub fn screen(&self, id: &SessionId) -> Option<String> {
        self.state
            .lock()
            .get(id)
            .map(|s| s.buffer.render_screen(s.size))
    }

    pub fn history(&self) -> Vec<String> {
        self.state.lock().history.entries().to_vec()
    }

    pub fn previous_command(&self) -> String {
        self.state.lock().history.previous().to_string()
    }

    pub fn next_command(&self) -> String {
        self.state.lock().history.next().to_string()
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }
}
