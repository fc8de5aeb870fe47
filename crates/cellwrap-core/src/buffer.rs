#![forbid(unsafe_code)]

//! String buffer aware of escape sequences.
//!
//! [`AnsiBuffer`] keeps its printable width up to date as characters are
//! pushed, so callers never re-scan the contents to measure them.

use std::fmt;

use crate::ansi::{AnsiScanner, CharClass};
use crate::text_width::{char_width, char_width_cjk, display_width, display_width_cjk};

/// A `String` that tracks its display width, ignoring escape sequences.
///
/// The escape scanner state is part of the buffer: a sequence opened by one
/// push is still open for the next, and [`clear`](Self::clear) keeps it.
#[derive(Clone, Debug, Default)]
pub struct AnsiBuffer {
    text: String,
    width: usize,
    scanner: AnsiScanner,
    cjk_width: bool,
}

impl AnsiBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer that measures ambiguous-width characters as 2.
    #[must_use]
    pub fn with_cjk_width(cjk_width: bool) -> Self {
        Self {
            cjk_width,
            ..Self::default()
        }
    }

    /// Append one character, returning how it was classified.
    #[inline]
    pub fn push(&mut self, c: char) -> CharClass {
        let class = self.scanner.advance(c);
        if class == CharClass::Printable {
            self.width += if self.cjk_width {
                char_width_cjk(c)
            } else {
                char_width(c)
            };
        }
        self.text.push(c);
        class
    }

    /// Append a string.
    pub fn push_str(&mut self, s: &str) {
        for c in s.chars() {
            self.push(c);
        }
    }

    /// Cell width of everything pushed since the last clear.
    #[inline]
    #[must_use]
    pub fn printable_width(&self) -> usize {
        self.width
    }

    /// Returns `true` if the last pushed character left a sequence open.
    #[inline]
    #[must_use]
    pub fn in_escape(&self) -> bool {
        self.scanner.in_escape()
    }

    /// Contents as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if nothing has been pushed since the last clear.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Drop the contents, keeping the scanner state.
    pub fn clear(&mut self) {
        self.text.clear();
        self.width = 0;
    }

    /// Drop the contents and close any open sequence.
    pub fn reset(&mut self) {
        self.clear();
        self.scanner.reset();
    }

    /// Consume the buffer and return the contents.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Write for AnsiBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.push(c);
        Ok(())
    }
}

impl fmt::Display for AnsiBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for AnsiBuffer {
    fn from(s: &str) -> Self {
        let mut buffer = Self::new();
        buffer.push_str(s);
        buffer
    }
}

impl AsRef<str> for AnsiBuffer {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Recompute the width of `text` from scratch with the buffer's policy.
///
/// Used to cross-check the incremental count.
#[must_use]
pub fn measure(text: &str, cjk_width: bool) -> usize {
    if cjk_width {
        display_width_cjk(text)
    } else {
        display_width(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    #[test]
    fn tracks_width_incrementally() {
        let mut buf = AnsiBuffer::new();
        buf.push_str("foo");
        assert_eq!(buf.printable_width(), 3);
        buf.push_str("\x1b[31m");
        assert_eq!(buf.printable_width(), 3);
        buf.push_str("你");
        assert_eq!(buf.printable_width(), 5);
        assert_eq!(buf.as_str(), "foo\x1b[31m你");
    }

    #[test]
    fn push_reports_class() {
        let mut buf = AnsiBuffer::new();
        assert_eq!(buf.push('\x1b'), CharClass::Escape);
        assert_eq!(buf.push('['), CharClass::Escape);
        assert_eq!(buf.push('m'), CharClass::Escape);
        assert_eq!(buf.push('a'), CharClass::Printable);
    }

    #[test]
    fn sequence_split_across_pushes() {
        let mut buf = AnsiBuffer::new();
        buf.push_str("\x1b[38;2;");
        assert!(buf.in_escape());
        buf.push_str("1;2;3mok");
        assert!(!buf.in_escape());
        assert_eq!(buf.printable_width(), 2);
    }

    #[test]
    fn clear_keeps_open_sequence() {
        let mut buf = AnsiBuffer::new();
        buf.push_str("ab\x1b[3");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.printable_width(), 0);
        buf.push_str("1mc");
        assert_eq!(buf.printable_width(), 1);
    }

    #[test]
    fn reset_closes_sequence() {
        let mut buf = AnsiBuffer::new();
        buf.push_str("\x1b[3");
        buf.reset();
        buf.push_str("1m");
        assert_eq!(buf.printable_width(), 2);
    }

    #[test]
    fn fmt_write_and_display() {
        let mut buf = AnsiBuffer::new();
        write!(buf, "{}-{}", "a", 1).unwrap();
        assert_eq!(buf.to_string(), "a-1");
        assert_eq!(buf.printable_width(), 3);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn cjk_policy_applies() {
        let mut buf = AnsiBuffer::with_cjk_width(true);
        buf.push_str("°");
        assert_eq!(buf.printable_width(), 2);
        assert_eq!(measure(buf.as_str(), true), 2);
        assert_eq!(measure(buf.as_str(), false), 1);
    }

    #[test]
    fn incremental_matches_full_scan() {
        let text = "\x1B[38;2;249;38;114m(\x1B[0mjust 另一个 test\x1B[0m";
        let buf = AnsiBuffer::from(text);
        assert_eq!(buf.printable_width(), measure(text, false));
        assert_eq!(buf.into_string(), text);
    }
}
