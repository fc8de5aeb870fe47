#![forbid(unsafe_code)]

//! Escape-aware word wrapping measured in terminal cells.
//!
//! # Role in cellwrap
//! `cellwrap-text` owns the wrapping engine. It consumes text in one shot or
//! in arbitrary chunks, measures it with `cellwrap-core`, and emits lines no
//! wider than the configured limit. Escape sequences ride along with the
//! words they touch and never cause or suffer a break.
//!
//! # Example
//! ```
//! use cellwrap_text::{WordWrap, wrap};
//!
//! assert_eq!(wrap("foo bar foo", 4), "foo\nbar\nfoo");
//!
//! let mut ww = WordWrap::new(4);
//! ww.write_str("foo b");
//! ww.write_str("ar foo");
//! ww.close().unwrap();
//! assert_eq!(ww.as_str(), "foo\nbar\nfoo");
//! ```

pub mod error;
pub mod wrap;
pub mod writer;

pub use cellwrap_core::text_width::display_width;
pub use error::WrapError;
pub use wrap::{WordWrap, WrapOptions, wrap, wrap_with_options};
pub use writer::WrapWriter;
