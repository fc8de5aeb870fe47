#![forbid(unsafe_code)]

//! Word wrapping with escape-sequence transparency.
//!
//! This module provides width-correct wrapping that respects:
//! - Cell widths (CJK characters are 2 cells wide)
//! - Escape sequences (zero width, never split, glued to adjacent words)
//!
//! An escape sequence standing alone between whitespace is a zero-width
//! word of its own. It keeps the whitespace before it on the line, so such
//! text can wrap differently from the same text with the escape removed:
//! `"foo \x1b[31m bar"` at 4 gives `"foo \x1b[31m\nbar"`.
//! - Word boundaries: lines break at whitespace or after a breakpoint
//!   character, never inside a word
//!
//! Input can be fed in one shot ([`wrap`]) or in arbitrary chunks through
//! [`WordWrap`]; both produce the same output for the same text.
//!
//! # Example
//! ```
//! use cellwrap_text::wrap::{WordWrap, WrapOptions, wrap, wrap_with_options};
//!
//! assert_eq!(wrap("foo-foobar", 4), "foo-\nfoobar");
//!
//! let folded = wrap_with_options(
//!     "\nfoo bar\n\n\nfoo\n",
//!     &WrapOptions::new(4).keep_newlines(false),
//! );
//! assert_eq!(folded, "foo\nbar\nfoo");
//!
//! let mut ww = WordWrap::new(7);
//! ww.write_str("\x1b[31mfoo\x1b[0m ");
//! ww.write_str("bar");
//! ww.close().unwrap();
//! assert_eq!(ww.as_str(), "\x1b[31mfoo\x1b[0m bar");
//! ```

use std::fmt;
use std::io;

use cellwrap_core::ansi::MARKER;
use cellwrap_core::buffer::{self, AnsiBuffer};
use cellwrap_core::text_width::{char_width, char_width_cjk, cjk_width_from_env};
use smallvec::{SmallVec, smallvec};

use crate::error::WrapError;

/// Chunks at least this large are logged at debug level.
const LARGE_CHUNK: usize = 64 * 1024;

/// Options for word wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapOptions {
    /// Maximum line width in cells. `0` disables wrapping.
    pub limit: usize,
    /// Keep newlines in the input as hard breaks. When `false` they are
    /// folded into ordinary whitespace.
    pub keep_newlines: bool,
    /// Characters after which a line may break without whitespace.
    pub breakpoints: SmallVec<[char; 4]>,
    /// Character treated as (and emitted for) a line break.
    pub newline: char,
    /// Count East Asian ambiguous-width characters as two cells.
    pub cjk_width: bool,
}

impl WrapOptions {
    /// Create new wrap options with the given limit.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            keep_newlines: true,
            breakpoints: smallvec!['-'],
            newline: '\n',
            cjk_width: false,
        }
    }

    /// Create options with the width policy taken from the process
    /// environment (`CELLWRAP_CJK_WIDTH`, then `LC_CTYPE`/`LANG`).
    #[must_use]
    pub fn from_env(limit: usize) -> Self {
        Self::new(limit).cjk_width(cjk_width_from_env(|key| std::env::var(key).ok()))
    }

    /// Set the limit.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set whether explicit newlines survive as hard breaks.
    #[must_use]
    pub fn keep_newlines(mut self, keep: bool) -> Self {
        self.keep_newlines = keep;
        self
    }

    /// Replace the breakpoint set.
    #[must_use]
    pub fn breakpoints<I>(mut self, breakpoints: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        self.breakpoints = breakpoints.into_iter().collect();
        self
    }

    /// Set the newline character.
    #[must_use]
    pub fn newline(mut self, newline: char) -> Self {
        self.newline = newline;
        self
    }

    /// Set the ambiguous-width policy.
    #[must_use]
    pub fn cjk_width(mut self, cjk: bool) -> Self {
        self.cjk_width = cjk;
        self
    }

    #[inline]
    fn is_breakpoint(&self, c: char) -> bool {
        self.breakpoints.contains(&c)
    }
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Wrap `text` to `limit` cells with the default policy.
///
/// Explicit newlines are kept, `-` is a breakpoint, and words longer than
/// the limit pass through unbroken.
#[must_use]
pub fn wrap(text: &str, limit: usize) -> String {
    wrap_with_options(text, &WrapOptions::new(limit))
}

/// Wrap `text` with full options.
#[must_use]
pub fn wrap_with_options(text: &str, options: &WrapOptions) -> String {
    let _span = tracing::debug_span!(
        "wrap",
        limit = options.limit,
        keep_newlines = options.keep_newlines,
        len = text.len()
    )
    .entered();

    let mut ww = WordWrap::with_options(options.clone());
    ww.write_str(text);
    ww.finish();
    ww.into_string()
}

/// Incremental word-wrapping engine.
///
/// Feed text with [`write_str`](Self::write_str),
/// [`write_bytes`](Self::write_bytes) or the `fmt::Write`/`io::Write`
/// impls, then call [`close`](Self::close) to flush the pending word and
/// whitespace. Chunk boundaries never affect the output.
///
/// Committed output is final: it can be read with [`as_str`](Self::as_str)
/// at any time or drained with [`take_output`](Self::take_output).
#[derive(Debug, Clone)]
pub struct WordWrap {
    options: WrapOptions,
    /// Committed output.
    buf: String,
    /// Pending word, including any escape sequences glued to it.
    word: AnsiBuffer,
    /// Pending whitespace run.
    space: String,
    space_width: usize,
    /// Cells committed to the current output line.
    line_width: usize,
    /// Nothing has been committed since the last hard break.
    forceful_newline: bool,
    /// Some content has been committed.
    started: bool,
    /// Incomplete UTF-8 sequence carried between byte writes.
    partial: SmallVec<[u8; 4]>,
}

impl WordWrap {
    /// Create an engine with the default policy.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self::with_options(WrapOptions::new(limit))
    }

    /// Create an engine with explicit options.
    #[must_use]
    pub fn with_options(options: WrapOptions) -> Self {
        let word = AnsiBuffer::with_cjk_width(options.cjk_width);
        Self {
            options,
            buf: String::new(),
            word,
            space: String::new(),
            space_width: 0,
            line_width: 0,
            forceful_newline: false,
            started: false,
            partial: SmallVec::new(),
        }
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &WrapOptions {
        &self.options
    }

    /// Feed a chunk of text.
    pub fn write_str(&mut self, text: &str) {
        if text.len() >= LARGE_CHUNK {
            tracing::debug!(len = text.len(), "word wrap large chunk");
        }
        for c in text.chars() {
            self.push_char(c);
        }
    }

    /// Feed a chunk of raw bytes.
    ///
    /// A UTF-8 sequence split across chunks is held back until its
    /// remaining bytes arrive. Returns the number of bytes accepted, which
    /// is always the full chunk on success.
    ///
    /// # Errors
    /// [`WrapError::InvalidUtf8`] if the chunk is not UTF-8. The chunk is
    /// rejected whole and the engine is left exactly as it was, so the call
    /// can be retried with corrected input.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, WrapError> {
        let carried = self.partial.len();
        let joined: Vec<u8>;
        let input: &[u8] = if carried == 0 {
            bytes
        } else {
            joined = [self.partial.as_slice(), bytes].concat();
            &joined
        };

        let (text, tail) = split_utf8(input).map_err(|valid_up_to| {
            tracing::debug!(valid_up_to, len = bytes.len(), "rejected non UTF-8 chunk");
            WrapError::InvalidUtf8 {
                valid_up_to: valid_up_to.saturating_sub(carried),
            }
        })?;

        let tail = SmallVec::from_slice(tail);
        self.write_str(text);
        self.partial = tail;
        Ok(bytes.len())
    }

    /// Flush the pending word and whitespace.
    ///
    /// Calling `close` again is harmless: there is nothing left to flush.
    ///
    /// # Errors
    /// [`WrapError::TruncatedUtf8`] if byte input stopped inside a UTF-8
    /// sequence. The text before it is still flushed and the dangling bytes
    /// are dropped.
    pub fn close(&mut self) -> Result<(), WrapError> {
        self.finish();
        let dangling = self.partial.len();
        if dangling > 0 {
            self.partial.clear();
            return Err(WrapError::TruncatedUtf8 { len: dangling });
        }
        Ok(())
    }

    /// Committed output.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the engine, returning committed output.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Drain committed output, leaving the line state untouched.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }

    /// Cells committed to the current line.
    #[must_use]
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    // -------------------------------------------------------------------------
    // Per-character processing
    // -------------------------------------------------------------------------

    fn push_char(&mut self, c: char) {
        let newline = c == self.options.newline;

        if self.options.limit == 0 {
            if newline && !self.options.keep_newlines {
                self.buf.push(' ');
            } else {
                self.buf.push(c);
            }
            return;
        }

        if c == MARKER || self.word.in_escape() {
            self.word.push(c);
        } else if newline && self.options.keep_newlines {
            self.commit_word();
            if self.fits(self.space_width) {
                self.commit_space();
            } else {
                self.discard_space();
            }
            self.buf.push(self.options.newline);
            self.line_width = 0;
            self.forceful_newline = true;
        } else if newline || c.is_whitespace() {
            self.commit_word();
            // Folded newlines trim the input like leading whitespace.
            if !self.options.keep_newlines && !self.started {
                return;
            }
            let c = if newline { ' ' } else { c };
            self.space.push(c);
            self.space_width += self.whitespace_width(c);
        } else if self.options.is_breakpoint(c) {
            self.word.push(c);
            self.commit_word();
        } else {
            self.word.push(c);
        }
    }

    /// Whitespace occupies at least one cell while pending.
    #[inline]
    fn whitespace_width(&self, c: char) -> usize {
        let width = if self.options.cjk_width {
            char_width_cjk(c)
        } else {
            char_width(c)
        };
        width.max(1)
    }

    #[inline]
    fn fits(&self, extra: usize) -> bool {
        self.line_width + extra <= self.options.limit
    }

    /// End the current word, breaking the line first if it does not fit.
    fn commit_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let word_width = self.word.printable_width();
        debug_assert_eq!(
            word_width,
            buffer::measure(self.word.as_str(), self.options.cjk_width)
        );

        if self.line_width > 0 && !self.fits(self.space_width + word_width) {
            if word_width > 0 {
                self.break_line();
            } else {
                // Escape-only token: keep it on this line, lose the gap.
                self.discard_space();
            }
        }

        self.commit_space();
        self.buf.push_str(self.word.as_str());
        self.word.clear();
        self.line_width += word_width;
        self.forceful_newline = false;
        self.started = true;
    }

    fn commit_space(&mut self) {
        if self.space.is_empty() {
            return;
        }
        self.buf.push_str(&self.space);
        self.line_width += self.space_width;
        self.space.clear();
        self.space_width = 0;
        self.forceful_newline = false;
    }

    fn discard_space(&mut self) {
        self.space.clear();
        self.space_width = 0;
    }

    /// Soft break inserted by the wrapper.
    fn break_line(&mut self) {
        self.buf.push(self.options.newline);
        self.line_width = 0;
        self.discard_space();
    }

    /// End-of-input flush.
    fn finish(&mut self) {
        if self.options.limit > 0 {
            self.commit_word();
            if !self.space.is_empty() {
                let keep = self.options.keep_newlines
                    && (self.forceful_newline || self.fits(self.space_width));
                if keep {
                    self.commit_space();
                } else {
                    self.discard_space();
                }
            }
        }
        tracing::trace!(
            limit = self.options.limit,
            bytes = self.buf.len(),
            "word wrap flushed"
        );
    }
}

/// Split `bytes` into the longest valid UTF-8 prefix and an incomplete
/// trailing sequence. Fails with the offset of the first invalid byte.
fn split_utf8(bytes: &[u8]) -> Result<(&str, &[u8]), usize> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok((text, &[])),
        Err(err) if err.error_len().is_none() => {
            let (head, tail) = bytes.split_at(err.valid_up_to());
            std::str::from_utf8(head)
                .map(|text| (text, tail))
                .map_err(|e| e.valid_up_to())
        }
        Err(err) => Err(err.valid_up_to()),
    }
}

impl fmt::Write for WordWrap {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        WordWrap::write_str(self, s);
        Ok(())
    }
}

impl io::Write for WordWrap {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Display for WordWrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use cellwrap_core::ansi::strip_ansi;
    use cellwrap_core::text_width::display_width;
    use proptest::prelude::*;

    fn colored_word() -> impl Strategy<Value = String> {
        (
            "[a-z]{1,6}",
            proptest::option::of(Just("\x1b[31m")),
            proptest::option::of(Just("\x1b[0m")),
        )
            .prop_map(|(word, open, close)| {
                format!("{}{}{}", open.unwrap_or(""), word, close.unwrap_or(""))
            })
    }

    proptest! {
        #[test]
        fn chunking_is_invisible(s in "[a-c \\-\n你]{0,60}", limit in 0usize..12, split in 0usize..=200) {
            let bytes = s.as_bytes();
            let split = split.min(bytes.len());
            let mut ww = WordWrap::new(limit);
            ww.write_bytes(&bytes[..split]).unwrap();
            ww.write_bytes(&bytes[split..]).unwrap();
            ww.close().unwrap();
            prop_assert_eq!(ww.as_str(), wrap(&s, limit));
        }

        #[test]
        fn chunking_is_invisible_when_folding(s in "[a-c \\-\n]{0,60}", limit in 1usize..12, split in 0usize..=60) {
            let opts = WrapOptions::new(limit).keep_newlines(false);
            let split = split.min(s.len());
            let mut ww = WordWrap::with_options(opts.clone());
            ww.write_str(&s[..split]);
            ww.write_str(&s[split..]);
            ww.close().unwrap();
            prop_assert_eq!(ww.as_str(), wrap_with_options(&s, &opts));
        }

        #[test]
        fn rewrap_is_idempotent(s in "[a-c \\-\n]{0,60}", limit in 1usize..12) {
            let once = wrap(&s, limit);
            prop_assert_eq!(wrap(&once, limit), once);
        }

        #[test]
        fn words_are_never_split(word in "[a-z你]{1,30}", limit in 1usize..10) {
            prop_assert_eq!(wrap(&word, limit), word);
        }

        #[test]
        fn lines_fit_unless_single_word(s in "[a-z]{1,8}( [a-z]{1,8}){0,12}", limit in 8usize..30) {
            for line in wrap(&s, limit).lines() {
                prop_assert!(display_width(line) <= limit, "line '{}' exceeds {}", line, limit);
            }
        }

        // Escapes glued to words only; a standalone escape is a zero-width
        // word and may keep a space the plain text would lose.
        #[test]
        fn escapes_do_not_change_decisions(
            words in proptest::collection::vec(colored_word(), 1..12),
            limit in 1usize..16,
        ) {
            let colored = words.join(" ");
            let plain = strip_ansi(&colored).into_owned();
            let wrapped = wrap(&colored, limit);
            prop_assert_eq!(strip_ansi(&wrapped).into_owned(), wrap(&plain, limit));
        }

        #[test]
        fn content_is_preserved(s in "[a-z]{1,6}( {1,3}[a-z]{1,6}){0,10}", limit in 1usize..20) {
            let wrapped = wrap(&s, limit);
            let original: Vec<&str> = s.split_whitespace().collect();
            let result: Vec<&str> = wrapped.split_whitespace().collect();
            prop_assert_eq!(original, result);
        }
    }
}
