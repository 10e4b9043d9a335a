//! Output Sink
//!
//! Append-only destination for emitted text, over any `io::Write` (a
//! caller-owned file handle, a `Vec<u8>`, or the process stdout).
//!
//! Two write paths:
//! - the *formatted* path stages each `write!` through a fixed-size line
//!   buffer, bounding per-call stack usage the same way on a build host
//!   and on a constrained target. Overflow is silently truncated;
//!   emission sites are designed to fit well under the limit.
//! - the *raw* path writes straight through and must be used for
//!   free-form strings whose length is not under the emitter's control.

use std::fmt;
use std::io;

/// Capacity of the formatted line buffer
pub const LINE_BUFFER_SIZE: usize = 768;

/// Fixed-capacity staging buffer; `fmt::Write` that never fails and
/// silently drops bytes past capacity.
struct LineBuf {
    buf: [u8; LINE_BUFFER_SIZE],
    len: usize,
}

impl LineBuf {
    fn new() -> Self {
        LineBuf {
            buf: [0; LINE_BUFFER_SIZE],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl fmt::Write for LineBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = LINE_BUFFER_SIZE - self.len;
        let take = room.min(s.len());
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// Append-only text sink
pub struct Sink<'w> {
    out: &'w mut dyn io::Write,
}

impl<'w> Sink<'w> {
    pub fn new(out: &'w mut dyn io::Write) -> Self {
        Sink { out }
    }

    /// Formatted path. Inherent method so `write!(sink, ...)` works.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        let mut line = LineBuf::new();
        let _ = fmt::Write::write_fmt(&mut line, args);
        self.out.write_all(line.as_bytes())
    }

    /// Unformatted path for unbounded-length content
    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }
}
