#![forbid(unsafe_code)]

//! Display width helpers.
//!
//! Widths are computed per code point using the Unicode East Asian Width
//! tables from `unicode-width`, with escape sequences contributing nothing.
//! Layout and wrapping both go through these functions so they stay in
//! lockstep.
//!
//! # Example
//! ```
//! use cellwrap_core::text_width::display_width;
//!
//! assert_eq!(display_width("hello"), 5);
//! assert_eq!(display_width("\x1b[1m你好\x1b[0m"), 4);
//! ```

use unicode_width::UnicodeWidthChar;

use crate::ansi::{AnsiScanner, CharClass};

/// Environment variable forcing the CJK width policy on or off.
pub const CJK_WIDTH_ENV: &str = "CELLWRAP_CJK_WIDTH";

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[inline]
fn is_cjk_locale(locale: &str) -> bool {
    let lower = locale.trim().to_ascii_lowercase();
    lower.starts_with("ja") || lower.starts_with("zh") || lower.starts_with("ko")
}

/// Decide whether ambiguous-width characters should be double width.
///
/// `CELLWRAP_CJK_WIDTH` wins when set; otherwise a Japanese, Chinese or
/// Korean `LC_CTYPE`/`LANG` locale enables the policy. The lookup is
/// injected so callers (and tests) control where values come from.
pub fn cjk_width_from_env<F>(get_env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = get_env(CJK_WIDTH_ENV) {
        return env_flag(&value);
    }
    if let Some(locale) = get_env("LC_CTYPE").or_else(|| get_env("LANG")) {
        return is_cjk_locale(&locale);
    }
    false
}

/// Width of a single code point in terminal cells.
///
/// - `0` for ASCII controls, combining marks and other zero-width characters
/// - `1` for ordinary characters
/// - `2` for wide characters (CJK ideographs, fullwidth forms, most emoji)
#[inline]
#[must_use]
pub fn char_width(c: char) -> usize {
    if c.is_ascii() {
        return usize::from(matches!(c, ' '..='~'));
    }
    c.width().unwrap_or(0)
}

/// Like [`char_width`], but East Asian ambiguous characters count as 2.
#[inline]
#[must_use]
pub fn char_width_cjk(c: char) -> usize {
    if c.is_ascii() {
        return usize::from(matches!(c, ' '..='~'));
    }
    c.width_cjk().unwrap_or(0)
}

/// Fast-path width for printable ASCII without escape sequences.
#[inline]
fn ascii_width(text: &str) -> Option<usize> {
    if text.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        Some(text.len())
    } else {
        None
    }
}

#[inline]
fn printable_width(text: &str, width_of: fn(char) -> usize) -> usize {
    let mut scanner = AnsiScanner::new();
    text.chars()
        .filter(|&c| scanner.advance(c) == CharClass::Printable)
        .map(width_of)
        .sum()
}

/// Width of a string in terminal cells, skipping escape sequences.
///
/// An unterminated sequence makes the rest of the string zero-width.
///
/// # Performance
/// - Printable ASCII: byte length, no decoding
/// - Everything else: one pass with the escape scanner
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    // ESC is a control byte, so the fast path never sees a sequence.
    if let Some(width) = ascii_width(text) {
        return width;
    }
    printable_width(text, char_width)
}

/// Like [`display_width`], using [`char_width_cjk`].
#[inline]
#[must_use]
pub fn display_width_cjk(text: &str) -> usize {
    if let Some(width) = ascii_width(text) {
        return width;
    }
    printable_width(text, char_width_cjk)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ansi::strip_ansi;
    use proptest::prelude::*;

    fn escape() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("\x1b[0m".to_string()),
            Just("\x1b[1m".to_string()),
            (0u8..=255, 0u8..=255, 0u8..=255)
                .prop_map(|(r, g, b)| format!("\x1b[38;2;{r};{g};{b}m")),
        ]
    }

    proptest! {
        #[test]
        fn escape_only_strings_have_zero_width(seqs in proptest::collection::vec(escape(), 0..8)) {
            let s: String = seqs.concat();
            prop_assert_eq!(display_width(&s), 0);
        }

        #[test]
        fn width_ignores_interleaved_escapes(
            parts in proptest::collection::vec(("[a-z你好 ]{0,6}", escape()), 0..8),
        ) {
            let mut colored = String::new();
            for (text, seq) in &parts {
                colored.push_str(seq);
                colored.push_str(text);
            }
            prop_assert_eq!(display_width(&colored), display_width(&strip_ansi(&colored)));
        }

        #[test]
        fn width_is_additive_over_plain_splits(a in "[a-zA-Z0-9你好 ]{0,20}", b in "[a-zA-Z0-9你好 ]{0,20}") {
            let joined = format!("{a}{b}");
            prop_assert_eq!(display_width(&joined), display_width(&a) + display_width(&b));
        }
    }
}
