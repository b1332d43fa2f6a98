//! Settings for the ata terminal client
//!
//! This crate provides the typed configuration consumed by terminal sessions
//! (font, cursor, color palette) and the other sections of the settings panel,
//! together with explicit merge functions for partial updates and a store that
//! synchronizes with the remote settings endpoint.

mod sections;
mod store;
mod terminal;

pub use sections::{
    AiSettings, AiSettingsPatch, ShortcutSettings, ShortcutSettingsPatch, SystemSettings,
    SystemSettingsPatch,
};
pub use store::{
    AppSettings, RemoteSettings, SettingsBackend, SettingsError, SettingsProvider, SettingsStore,
};
pub use terminal::{ColorPalette, CursorStyle, TerminalSettings, TerminalSettingsPatch};
