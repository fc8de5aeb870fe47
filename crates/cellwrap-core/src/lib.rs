#![forbid(unsafe_code)]

//! Core: escape-sequence scanning and display width measurement.
//!
//! # Role in cellwrap
//! `cellwrap-core` is the measuring layer. It decides which characters belong
//! to terminal escape sequences and how many cells every other character
//! occupies. The wrapping engine (`cellwrap-text`) builds on these helpers so
//! that measuring and wrapping never disagree about what is visible.
//!
//! # Primary responsibilities
//! - **AnsiScanner**: two-state machine locating escape sequences.
//! - **text_width**: per-char and per-string cell widths, escape-transparent.
//! - **AnsiBuffer**: a string buffer that keeps its printable width current.

pub mod ansi;
pub mod buffer;
pub mod text_width;

pub use ansi::{
    AnsiScanner, CharClass, MARKER, ScanState, has_escapes, is_terminator, strip_ansi,
};
pub use buffer::AnsiBuffer;
pub use text_width::{char_width, char_width_cjk, display_width, display_width_cjk};
