//! Bounded byte buffer shared by inbound reads and outbound composition.
//!
//! One allocation of [`MAX_LINE_LEN`] bytes, reused for every read. The
//! buffer tracks how many bytes are valid; nothing past that is ever
//! inspected, so stale bytes from an earlier read can't leak into a later one.

use tokio::io::{AsyncRead, AsyncReadExt};

/// Maximum length of one protocol line, terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Two-byte line terminator used on the wire.
pub const CRLF: &[u8; 2] = b"\r\n";

/// Fixed-capacity buffer with an explicit valid length.
#[derive(Debug)]
pub struct LineBuffer {
    bytes: Box<[u8]>,
    len: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; MAX_LINE_LEN].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Replace the contents with `src`, keeping at most `capacity()` bytes.
    /// Returns how many bytes were kept.
    pub fn fill_from(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.capacity());
        self.bytes[..n].copy_from_slice(&src[..n]);
        self.len = n;
        n
    }

    /// One read from `reader` into the whole buffer. A return of `0` means
    /// the peer closed its side.
    pub async fn read_from<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        self.len = 0;
        let n = reader.read(&mut self.bytes).await?;
        self.len = n;
        Ok(n)
    }

    /// Cut the valid slice at the first CR, LF or NUL.
    pub fn truncate_at_terminator(&mut self) -> Option<Truncation> {
        let t = find_terminator(self.as_slice())?;
        self.len = t.at;
        Some(t)
    }
}

/// Which byte ended a message early and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub at: usize,
    pub byte: u8,
}

impl Truncation {
    /// A bare LF is the normal end of a typed line and isn't worth reporting.
    pub fn is_notable(&self) -> bool {
        self.byte != b'\n'
    }
}

/// Position of the first CR, LF or NUL in `bytes`.
pub fn find_terminator(bytes: &[u8]) -> Option<Truncation> {
    bytes
        .iter()
        .position(|&b| matches!(b, b'\r' | b'\n' | 0))
        .map(|at| Truncation { at, byte: bytes[at] })
}
