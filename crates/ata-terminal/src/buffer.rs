use once_cell::sync::Lazy;
use regex::Regex;
use vt100::Parser;

use super::session::TerminalSize;

// CSI sequences, OSC sequences terminated by BEL or ST, and two-byte escapes
static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")
        .expect("ANSI escape pattern is valid")
});

/// Remove ANSI escape sequences from terminal output
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Append-only output accumulator for one session.
///
/// With a byte limit the oldest output is discarded once the limit is
/// exceeded; the cut always lands on a UTF-8 character boundary.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    data: String,
    limit: Option<usize>,
    dropped: usize,
}

impl OutputBuffer {
    /// `None` or `Some(0)` means unbounded
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            data: String::new(),
            limit: limit.filter(|&l| l > 0),
            dropped: 0,
        }
    }

    pub fn push(&mut self, chunk: &str) {
        self.data.push_str(chunk);
        self.trim();
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Total bytes discarded from the front since creation
    pub fn dropped_bytes(&self) -> usize {
        self.dropped
    }

    /// Buffer contents without escape sequences
    pub fn plain_text(&self) -> String {
        strip_ansi(&self.data)
    }

    /// Replay the buffer through a VT100 parser and return the visible screen
    pub fn render_screen(&self, size: TerminalSize) -> String {
        let mut parser = Parser::new(size.rows.max(1), size.cols.max(1), 0);
        parser.process(self.data.as_bytes());
        parser.screen().contents()
    }

    fn trim(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        if self.data.len() <= limit {
            return;
        }

        let mut cut = self.data.len() - limit;
        while !self.data.is_char_boundary(cut) {
            cut += 1;
        }
        self.data.drain(..cut);
        self.dropped += cut;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_buffer_keeps_everything() {
        let mut buffer = OutputBuffer::new(None);
        buffer.push("hello ");
        buffer.push("world");
        assert_eq!(buffer.as_str(), "hello world");
        assert_eq!(buffer.dropped_bytes(), 0);

        let zero = OutputBuffer::new(Some(0));
        assert_eq!(zero.limit(), None);
    }

    #[test]
    fn test_bounded_buffer_drops_oldest_bytes() {
        let mut buffer = OutputBuffer::new(Some(8));
        buffer.push("0123456789");
        assert_eq!(buffer.as_str(), "23456789");
        assert_eq!(buffer.dropped_bytes(), 2);

        buffer.push("ab");
        assert_eq!(buffer.as_str(), "456789ab");
        assert_eq!(buffer.dropped_bytes(), 4);
    }

    #[test]
    fn test_trim_respects_char_boundaries() {
        let mut buffer = OutputBuffer::new(Some(4));
        // "é" is two bytes; a cut at byte 1 would split it
        buffer.push("éabc");
        assert_eq!(buffer.as_str(), "abc");
        assert_eq!(buffer.dropped_bytes(), 2);

        buffer.push("d");
        assert_eq!(buffer.as_str(), "abcd");
        assert_eq!(buffer.dropped_bytes(), 2);
    }

    #[test]
    fn test_clear_keeps_drop_counter() {
        let mut buffer = OutputBuffer::new(Some(2));
        buffer.push("abc");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.dropped_bytes(), 1);
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m plain"), "red plain");
        assert_eq!(strip_ansi("\x1b[1;32mbold green\x1b[m"), "bold green");
        assert_eq!(strip_ansi("\x1b]0;title\x07prompt$ "), "prompt$ ");
        assert_eq!(strip_ansi("no escapes"), "no escapes");
    }

    #[test]
    fn test_render_screen_interprets_escapes() {
        let mut buffer = OutputBuffer::new(None);
        buffer.push("first\r\n\x1b[32msecond\x1b[0m");
        let screen = buffer.render_screen(TerminalSize::new(4, 20));
        assert!(screen.starts_with("first\nsecond"));
        assert!(!screen.contains('\x1b'));
    }
}
