use crate::session::{SessionId, TerminalSize};

/// Change notification emitted at the end of each mutating registry operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    SessionCreated {
        id: SessionId,
        title: String,
    },
    SessionClosed {
        id: SessionId,
        /// Active session after the close
        active_id: Option<SessionId>,
    },
    ActiveChanged {
        active_id: Option<SessionId>,
    },
    CommandSent {
        id: SessionId,
        command: String,
    },
    OutputAppended {
        id: SessionId,
        data: String,
    },
    BufferCleared {
        id: SessionId,
    },
    Resized {
        id: SessionId,
        size: TerminalSize,
    },
    SettingsApplied {
        ids: Vec<SessionId>,
    },
    ConnectionChanged {
        connected: bool,
    },
}
