use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// System
// ============================================================================

fn default_update_interval() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Client behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    /// Refresh interval of the monitoring view, in seconds (default 5)
    #[serde(default = "default_update_interval")]
    pub update_interval: u32,
    /// Log level name (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Start with the desktop session (default false)
    #[serde(default)]
    pub auto_start: bool,
    /// Show notifications (default true)
    #[serde(default = "default_true")]
    pub notifications: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            update_interval: default_update_interval(),
            log_level: default_log_level(),
            auto_start: false,
            notifications: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
}

impl SystemSettings {
    /// Monitoring refresh period; zero is treated as one second
    pub fn update_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.update_interval.max(1)))
    }

    pub fn merge(&mut self, patch: &SystemSettingsPatch) {
        if let Some(interval) = patch.update_interval {
            self.update_interval = interval;
        }
        if let Some(ref level) = patch.log_level {
            self.log_level = level.clone();
        }
        if let Some(auto_start) = patch.auto_start {
            self.auto_start = auto_start;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
    }
}

// ============================================================================
// AI assistant
// ============================================================================

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_model() -> String {
    "deepseek-coder".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

/// AI provider settings forwarded to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    /// Provider name (default "deepseek")
    #[serde(default = "default_provider")]
    pub provider: String,
    /// API key (default empty)
    #[serde(default)]
    pub api_key: String,
    /// Model name (default "deepseek-coder")
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature (default 0.7)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl AiSettings {
    pub fn merge(&mut self, patch: &AiSettingsPatch) {
        if let Some(ref provider) = patch.provider {
            self.provider = provider.clone();
        }
        if let Some(ref key) = patch.api_key {
            self.api_key = key.clone();
        }
        if let Some(ref model) = patch.model {
            self.model = model.clone();
        }
        if let Some(temperature) = patch.temperature {
            self.temperature = temperature;
        }
    }
}

// ============================================================================
// Shortcuts
// ============================================================================

fn default_execute() -> String {
    "Enter".to_string()
}

fn default_clear() -> String {
    "Ctrl + L".to_string()
}

fn default_copy() -> String {
    "Ctrl + C".to_string()
}

fn default_paste() -> String {
    "Ctrl + V".to_string()
}

/// Key bindings shown in the settings panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutSettings {
    #[serde(default = "default_execute")]
    pub execute: String,
    #[serde(default = "default_clear")]
    pub clear: String,
    #[serde(default = "default_copy")]
    pub copy: String,
    #[serde(default = "default_paste")]
    pub paste: String,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            execute: default_execute(),
            clear: default_clear(),
            copy: default_copy(),
            paste: default_paste(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paste: Option<String>,
}

impl ShortcutSettings {
    pub fn merge(&mut self, patch: &ShortcutSettingsPatch) {
        if let Some(ref execute) = patch.execute {
            self.execute = execute.clone();
        }
        if let Some(ref clear) = patch.clear {
            self.clear = clear.clone();
        }
        if let Some(ref copy) = patch.copy {
            self.copy = copy.clone();
        }
        if let Some(ref paste) = patch.paste {
            self.paste = paste.clone();
        }
    }
}
