#![forbid(unsafe_code)]

//! Errors raised while feeding bytes to the wrapping engine.

use std::io;

/// Errors from byte-oriented input.
///
/// String input cannot fail; only raw bytes need decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapError {
    /// A chunk contained bytes that are not UTF-8. Nothing from the chunk
    /// was consumed.
    InvalidUtf8 {
        /// Offset of the first bad byte within the chunk.
        valid_up_to: usize,
    },
    /// Input ended in the middle of a UTF-8 sequence. The dangling bytes
    /// were discarded.
    TruncatedUtf8 {
        /// Number of dangling bytes.
        len: usize,
    },
}

impl core::fmt::Display for WrapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidUtf8 { valid_up_to } => {
                write!(f, "invalid UTF-8 after {valid_up_to} bytes")
            }
            Self::TruncatedUtf8 { len } => {
                write!(f, "input ended inside a UTF-8 sequence ({len} dangling bytes)")
            }
        }
    }
}

impl std::error::Error for WrapError {}

impl From<WrapError> for io::Error {
    fn from(err: WrapError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}
