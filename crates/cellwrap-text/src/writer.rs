#![forbid(unsafe_code)]

//! Streaming adapter that wraps text on its way to an `io::Write` sink.
//!
//! [`WrapWriter`] forwards each piece of wrapped output as soon as the
//! engine commits it. Errors from the sink come back unchanged. A `write`
//! that returns an error has consumed nothing, so it can simply be retried;
//! output the sink refused after input was already accepted stays staged and
//! is retried on the next `write`, `flush` or [`close`](WrapWriter::close).
//! A failed `close` can be repeated the same way.
//!
//! # Example
//! ```
//! use std::io::Write;
//! use cellwrap_text::{WrapOptions, WrapWriter};
//!
//! let mut out = WrapWriter::new(Vec::new(), WrapOptions::new(4));
//! out.write_all(b"foo bar foo").unwrap();
//! out.close().unwrap();
//! assert_eq!(out.into_inner(), b"foo\nbar\nfoo");
//! ```

use std::io::{self, Write};

use crate::error::WrapError;
use crate::wrap::{WordWrap, WrapOptions};

/// Word-wrapping writer over an inner sink.
#[derive(Debug)]
pub struct WrapWriter<W: Write> {
    inner: W,
    engine: WordWrap,
    /// Wrapped bytes not yet accepted by `inner`.
    staged: Vec<u8>,
    /// Input error from the engine, reported once staged output is delivered.
    deferred: Option<WrapError>,
}

impl<W: Write> WrapWriter<W> {
    /// Create a writer wrapping to `options`.
    pub fn new(inner: W, options: WrapOptions) -> Self {
        Self {
            inner,
            engine: WordWrap::with_options(options),
            staged: Vec::new(),
            deferred: None,
        }
    }

    /// Shared access to the sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutable access to the sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Bytes waiting for the sink.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Flush the engine and everything staged, then flush the sink.
    ///
    /// If the sink fails, the undelivered output stays staged and `close`
    /// can be called again. Once it succeeds, further calls do nothing.
    ///
    /// # Errors
    /// Sink errors unchanged, or the engine's
    /// [`TruncatedUtf8`](crate::WrapError::TruncatedUtf8) as
    /// `io::ErrorKind::InvalidData` after the rest has been delivered.
    pub fn close(&mut self) -> io::Result<()> {
        if let Err(err) = self.engine.close() {
            self.deferred = Some(err);
        }
        self.stage();
        self.drain()?;
        self.inner.flush()?;
        match self.deferred.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Return the sink.
    ///
    /// Call [`close`](Self::close) first: the pending word and anything
    /// still staged are dropped here.
    pub fn into_inner(self) -> W {
        if !self.staged.is_empty() {
            tracing::debug!(staged = self.staged.len(), "wrap writer dropped staged output");
        }
        self.inner
    }

    fn stage(&mut self) {
        let out = self.engine.take_output();
        self.staged.extend_from_slice(out.as_bytes());
    }

    /// Push staged bytes into the sink until it is empty or the sink fails.
    fn drain(&mut self) -> io::Result<()> {
        let mut written = 0;
        let result = loop {
            if written == self.staged.len() {
                break Ok(());
            }
            match self.inner.write(&self.staged[written..]) {
                Ok(0) => {
                    break Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write wrapped output",
                    ));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };
        self.staged.drain(..written);
        if let Err(e) = &result {
            tracing::warn!(
                error = %e,
                staged = self.staged.len(),
                "wrap writer sink refused output"
            );
        }
        result
    }
}

impl<W: Write> Write for WrapWriter<W> {
    /// Wrap `buf` and pass committed output to the sink.
    ///
    /// Errors from output left over by earlier calls are returned before
    /// anything from `buf` is read. Once `buf` is accepted, a sink failure
    /// leaves the new output staged and still returns `Ok`, as `BufWriter`
    /// does; [`flush`](Write::flush) or [`close`](WrapWriter::close) report it.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Earlier output first; on failure nothing from `buf` is consumed.
        self.drain()?;
        let n = self.engine.write_bytes(buf)?;
        self.stage();
        // The input is already accepted; leftovers wait for the next call.
        let _ = self.drain();
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.inner.flush()
    }
}
