use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cursor shape used by the terminal view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    #[default]
    Block,
    Underline,
    Bar,
}

impl std::fmt::Display for CursorStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorStyle::Block => write!(f, "block"),
            CursorStyle::Underline => write!(f, "underline"),
            CursorStyle::Bar => write!(f, "bar"),
        }
    }
}

impl std::str::FromStr for CursorStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "block" => Ok(CursorStyle::Block),
            "underline" => Ok(CursorStyle::Underline),
            "bar" => Ok(CursorStyle::Bar),
            _ => Err(format!(
                "Invalid cursor style: '{}'. Valid options: 'block', 'underline', 'bar'",
                s
            )),
        }
    }
}

/// Default palette slots, in the order the terminal view expects them
const DEFAULT_PALETTE: &[(&str, &str)] = &[
    ("background", "#1E1E1E"),
    ("foreground", "#FFFFFF"),
    ("cursor", "#FFFFFF"),
    ("selection", "#264F78"),
    ("black", "#000000"),
    ("red", "#CD3131"),
    ("green", "#0DBC79"),
    ("yellow", "#E5E510"),
    ("blue", "#2472C8"),
    ("magenta", "#BC3FBC"),
    ("cyan", "#11A8CD"),
    ("white", "#E5E5E5"),
    ("brightBlack", "#666666"),
    ("brightRed", "#F14C4C"),
    ("brightGreen", "#23D18B"),
    ("brightYellow", "#F5F543"),
    ("brightBlue", "#3B8EEA"),
    ("brightMagenta", "#D670D6"),
    ("brightCyan", "#29B8DB"),
    ("brightWhite", "#E5E5E5"),
];

/// Mapping of named color slots (`background`, `brightRed`, ...) to color values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorPalette(BTreeMap<String, String>);

impl ColorPalette {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.0.get(slot).map(String::as_str)
    }

    pub fn set(&mut self, slot: impl Into<String>, color: impl Into<String>) {
        self.0.insert(slot.into(), color.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overwrite the slots present in `other`, keeping every other slot
    pub fn merge(&mut self, other: &ColorPalette) {
        for (slot, color) in &other.0 {
            self.0.insert(slot.clone(), color.clone());
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self(
            DEFAULT_PALETTE
                .iter()
                .map(|(slot, color)| (slot.to_string(), color.to_string()))
                .collect(),
        )
    }
}

fn default_font_size() -> u16 {
    14
}

fn default_font_family() -> String {
    "Consolas, monospace".to_string()
}

fn default_cursor_blink() -> bool {
    true
}

/// Display configuration read by a session when it is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalSettings {
    /// Font size in points (default 14)
    #[serde(default = "default_font_size")]
    pub font_size: u16,
    /// CSS-style font family list (default "Consolas, monospace")
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Cursor shape (default block)
    #[serde(default)]
    pub cursor_style: CursorStyle,
    /// Whether the cursor blinks (default true)
    #[serde(default = "default_cursor_blink")]
    pub cursor_blink: bool,
    /// Named color slots (default: the dark palette)
    #[serde(default)]
    pub color_palette: ColorPalette,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            font_family: default_font_family(),
            cursor_style: CursorStyle::default(),
            cursor_blink: default_cursor_blink(),
            color_palette: ColorPalette::default(),
        }
    }
}

impl TerminalSettings {
    /// Apply a partial update. Palette slots are merged one by one.
    pub fn merge(&mut self, patch: &TerminalSettingsPatch) {
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(ref family) = patch.font_family {
            self.font_family = family.clone();
        }
        if let Some(style) = patch.cursor_style {
            self.cursor_style = style;
        }
        if let Some(blink) = patch.cursor_blink {
            self.cursor_blink = blink;
        }
        if let Some(ref palette) = patch.color_palette {
            self.color_palette.merge(palette);
        }
    }

    pub fn merged(mut self, patch: &TerminalSettingsPatch) -> Self {
        self.merge(patch);
        self
    }
}

/// Partial terminal settings; `None` fields leave the current value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_style: Option<CursorStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_blink: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<ColorPalette>,
}

impl TerminalSettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
