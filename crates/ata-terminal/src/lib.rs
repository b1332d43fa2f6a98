// Client-side terminal session model
//
// This module tracks the terminal sessions that live on the remote execution
// service: which sessions exist, which one is active, what output each has
// received, and the command history shared by all of them.

mod buffer;
mod error;
mod events;
pub mod gateway;
mod history;
mod registry;
mod session;

// Re-export public API
pub use buffer::{strip_ansi, OutputBuffer};
pub use error::{GatewayError, Result, SessionError};
pub use events::RegistryEvent;
pub use gateway::{output_channel, CreatedSession, Gateway, OutputChunk, OutputReceiver, OutputSender};
pub use history::CommandHistory;
pub use registry::{RegistryOptions, SessionRegistry};
pub use session::{SessionId, SessionInfo, TerminalSize};

// Constants
pub const DEFAULT_ROWS: u16 = 24;
pub const DEFAULT_COLS: u16 = 80;
pub const DEFAULT_BUFFER_LIMIT: usize = 1024 * 1024; // 1 MiB per session
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
