#![forbid(unsafe_code)]

//! Escape sequence scanning.
//!
//! A sequence starts at [`MARKER`] (ESC) and runs up to and including the
//! first terminator character (`@`..=`Z` or `a`..=`z`). Everything in
//! between is invisible to layout. The scanner does not validate the
//! sequence body; it only tracks whether it is currently inside one.
//!
//! The same [`AnsiScanner`] drives width measurement, [`AnsiBuffer`] and the
//! wrapping engine, so all three agree on which characters are visible.
//!
//! [`AnsiBuffer`]: crate::buffer::AnsiBuffer
//!
//! # Example
//! ```
//! use cellwrap_core::ansi::{AnsiScanner, CharClass};
//!
//! let mut scanner = AnsiScanner::new();
//! let visible: String = "\x1b[31mred\x1b[0m"
//!     .chars()
//!     .filter(|&c| scanner.advance(c) == CharClass::Printable)
//!     .collect();
//! assert_eq!(visible, "red");
//! ```

use std::borrow::Cow;

/// Character that opens an escape sequence.
pub const MARKER: char = '\x1B';

/// Returns `true` if `c` ends an escape sequence.
#[inline]
#[must_use]
pub const fn is_terminator(c: char) -> bool {
    matches!(c, '\x40'..='\x5A' | '\x61'..='\x7A')
}

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Outside any escape sequence.
    #[default]
    Normal,
    /// Between a marker and its terminator.
    InEscape,
}

/// Classification of a single character by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Marker, sequence body, or terminator. Zero width.
    Escape,
    /// Visible content.
    Printable,
}

/// Incremental escape sequence scanner.
///
/// State survives between calls, so a sequence split across chunks is still
/// recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnsiScanner {
    state: ScanState,
}

impl AnsiScanner {
    /// Create a scanner in the [`ScanState::Normal`] state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ScanState::Normal,
        }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// Returns `true` while a sequence is open.
    #[inline]
    #[must_use]
    pub const fn in_escape(&self) -> bool {
        matches!(self.state, ScanState::InEscape)
    }

    /// Feed one character and classify it.
    #[inline]
    pub fn advance(&mut self, c: char) -> CharClass {
        if c == MARKER {
            self.state = ScanState::InEscape;
            return CharClass::Escape;
        }
        match self.state {
            ScanState::InEscape => {
                if is_terminator(c) {
                    self.state = ScanState::Normal;
                }
                CharClass::Escape
            }
            ScanState::Normal => CharClass::Printable,
        }
    }

    /// Return to [`ScanState::Normal`].
    #[inline]
    pub fn reset(&mut self) {
        self.state = ScanState::Normal;
    }
}

/// Returns `true` if `s` contains an escape marker.
#[inline]
#[must_use]
pub fn has_escapes(s: &str) -> bool {
    s.contains(MARKER)
}

/// Remove escape sequences from a string.
///
/// Returns `Cow::Borrowed` when `s` contains no marker. An unterminated
/// sequence swallows the rest of the input.
#[must_use]
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !has_escapes(s) {
        return Cow::Borrowed(s);
    }

    let mut scanner = AnsiScanner::new();
    let stripped = s
        .chars()
        .filter(|&c| scanner.advance(c) == CharClass::Printable)
        .collect();
    Cow::Owned(stripped)
}
