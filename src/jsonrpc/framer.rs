// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Newline-delimited message framing.
//!
//! One JSON value per line in each direction. Each written line is flushed
//! immediately so the peer sees every response as soon as it is produced.

use std::io::{self, BufRead, Write};

/// Reads one raw message per line from a buffered byte stream.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    /// Reads the next non-blank line, without its terminator.
    ///
    /// Returns `Ok(None)` on clean end of stream. A final line without a
    /// trailing newline is still returned. Invalid UTF-8 is replaced rather
    /// than treated as a read failure, so it surfaces later as a parse error.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for any read failure other than
    /// end of stream.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            self.buf.clear();
            let read = match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if read == 0 {
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&self.buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(line.to_string()));
        }
    }
}

/// Writes one raw message per line, flushing after each.
pub struct LineWriter<W> {
    inner: W,
}

impl<W: Write> LineWriter<W> {
    /// Wraps a writer.
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes `line` followed by a newline and flushes.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write or flush fails.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
