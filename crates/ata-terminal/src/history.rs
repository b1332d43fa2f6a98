/// Ordered log of submitted commands with a recall cursor.
///
/// The cursor ranges over `[0, len]`; `len` means "past the end", so the
/// next `previous()` yields the most recent entry.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command and move the cursor past the end
    pub fn record(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
        self.cursor = self.entries.len();
    }

    /// Step back one entry; `""` once the oldest entry has been reached
    pub fn previous(&mut self) -> &str {
        if self.cursor > 0 {
            self.cursor -= 1;
            return &self.entries[self.cursor];
        }
        ""
    }

    /// Step forward one entry; `""` when already at the newest entry
    pub fn next(&mut self) -> &str {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            return &self.entries[self.cursor];
        }
        ""
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
