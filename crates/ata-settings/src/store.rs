use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::sections::{
    AiSettings, AiSettingsPatch, ShortcutSettings, ShortcutSettingsPatch, SystemSettings,
    SystemSettingsPatch,
};
use crate::terminal::{TerminalSettings, TerminalSettingsPatch};

/// Errors raised while synchronizing settings with the server
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings backend failed: {0}")]
    Backend(String),
    #[error("settings document could not be decoded: {0}")]
    Decode(String),
}

/// Every settings section, as shown in the settings panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub terminal: TerminalSettings,
    #[serde(default)]
    pub system: SystemSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub shortcuts: ShortcutSettings,
}

/// Settings document as returned by the server; any section may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub terminal: Option<TerminalSettingsPatch>,
    #[serde(default)]
    pub system: Option<SystemSettingsPatch>,
    #[serde(default)]
    pub ai: Option<AiSettingsPatch>,
    #[serde(default)]
    pub shortcuts: Option<ShortcutSettingsPatch>,
}

/// Source of the terminal display configuration read at session creation
pub trait SettingsProvider: Send + Sync {
    fn terminal_settings(&self) -> TerminalSettings;
}

impl SettingsProvider for TerminalSettings {
    fn terminal_settings(&self) -> TerminalSettings {
        self.clone()
    }
}

/// Remote persistence for settings
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn load_settings(&self) -> Result<RemoteSettings, SettingsError>;

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), SettingsError>;
}

/// Holds the current settings of one application instance
#[derive(Debug, Default)]
pub struct SettingsStore {
    settings: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Snapshot of all sections
    pub fn current(&self) -> AppSettings {
        self.settings.read().clone()
    }

    pub fn terminal(&self) -> TerminalSettings {
        self.settings.read().terminal.clone()
    }

    pub fn update_terminal(&self, patch: &TerminalSettingsPatch) {
        self.settings.write().terminal.merge(patch);
    }

    pub fn update_system(&self, patch: &SystemSettingsPatch) {
        self.settings.write().system.merge(patch);
    }

    pub fn update_ai(&self, patch: &AiSettingsPatch) {
        self.settings.write().ai.merge(patch);
    }

    pub fn update_shortcuts(&self, patch: &ShortcutSettingsPatch) {
        self.settings.write().shortcuts.merge(patch);
    }

    /// Restore every section to its defaults
    pub fn reset(&self) {
        *self.settings.write() = AppSettings::default();
    }

    /// Fetch settings from the backend.
    ///
    /// Each section present in the remote document replaces the local one,
    /// merged over that section's defaults. Absent sections keep their
    /// current value.
    pub async fn load(&self, backend: &dyn SettingsBackend) -> Result<(), SettingsError> {
        let remote = backend.load_settings().await?;

        let mut settings = self.settings.write();
        if let Some(ref patch) = remote.terminal {
            settings.terminal = TerminalSettings::default().merged(patch);
        }
        if let Some(ref patch) = remote.system {
            let mut system = SystemSettings::default();
            system.merge(patch);
            settings.system = system;
        }
        if let Some(ref patch) = remote.ai {
            let mut ai = AiSettings::default();
            ai.merge(patch);
            settings.ai = ai;
        }
        if let Some(ref patch) = remote.shortcuts {
            let mut shortcuts = ShortcutSettings::default();
            shortcuts.merge(patch);
            settings.shortcuts = shortcuts;
        }
        debug!("settings loaded from backend");
        Ok(())
    }

    /// Persist `settings` remotely, then adopt them locally
    pub async fn save(
        &self,
        backend: &dyn SettingsBackend,
        settings: AppSettings,
    ) -> Result<(), SettingsError> {
        backend.save_settings(&settings).await?;
        *self.settings.write() = settings;
        debug!("settings saved to backend");
        Ok(())
    }
}

impl SettingsProvider for SettingsStore {
    fn terminal_settings(&self) -> TerminalSettings {
        self.terminal()
    }
}
