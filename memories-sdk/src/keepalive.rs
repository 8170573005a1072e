//! Incremental PING/PONG responder.
//!
//! Recognises keep-alive probes of the form
//!
//! ```text
//! [':' <prefix> <spaces>] 'PING' <spaces> <payload> CR LF
//! ```
//!
//! one byte at a time. Reads arrive in arbitrary chunks, so the state is
//! kept between calls and a probe may be split anywhere. Once `PING ` is
//! confirmed the literal `PONG ` is produced and every following byte of
//! the line, CRLF included, is echoed back unchanged.
//!
//! Any byte that breaks the grammar outside the echo phase sends the
//! machine to [`State::SkipLine`], which discards input up to the next
//! CRLF and then starts over.

const SPACE: u8 = b' ';
const COLON: u8 = b':';
const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Literal written as soon as `PING ` is recognised.
pub const PONG_PREFIX: &[u8; 5] = b"PONG ";

/// Position within the probe grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Start of a line: `:`, `P`, or a stray CR.
    #[default]
    LineStart,
    /// Just saw `:`; the prefix needs at least one byte.
    PrefixStart,
    /// Inside the sender prefix.
    Prefix,
    /// Spaces after the prefix.
    PrefixGap,
    ExpectI,
    ExpectN,
    ExpectG,
    /// `PING` seen, need a space.
    ExpectSpace,
    /// Echoing the payload.
    Echo,
    /// Echoed a CR, waiting for LF.
    EchoLf,
    /// Discarding a non-matching line.
    SkipLine,
    /// Saw CR in a discarded line, waiting for LF.
    SkipLf,
}

/// Output of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    None,
    /// Write [`PONG_PREFIX`].
    Prefix,
    /// Write this byte.
    Byte(u8),
}

/// Pure transition function.
pub fn step(state: State, byte: u8) -> (State, Reply) {
    use State::*;

    // Outside the echo phase a CR always means "wait for LF, then restart".
    let resync = if byte == CR { SkipLf } else { SkipLine };

    match state {
        LineStart => match byte {
            COLON => (PrefixStart, Reply::None),
            b'P' => (ExpectI, Reply::None),
            _ => (resync, Reply::None),
        },
        PrefixStart => match byte {
            SPACE | CR => (resync, Reply::None),
            _ => (Prefix, Reply::None),
        },
        Prefix => match byte {
            SPACE => (PrefixGap, Reply::None),
            CR => (SkipLf, Reply::None),
            _ => (Prefix, Reply::None),
        },
        PrefixGap => match byte {
            SPACE => (PrefixGap, Reply::None),
            b'P' => (ExpectI, Reply::None),
            _ => (resync, Reply::None),
        },
        ExpectI => expect(byte, b'I', ExpectN),
        ExpectN => expect(byte, b'N', ExpectG),
        ExpectG => expect(byte, b'G', ExpectSpace),
        ExpectSpace => match byte {
            SPACE => (Echo, Reply::Prefix),
            _ => (resync, Reply::None),
        },
        Echo => match byte {
            CR => (EchoLf, Reply::Byte(byte)),
            _ => (Echo, Reply::Byte(byte)),
        },
        EchoLf => match byte {
            LF => (LineStart, Reply::Byte(byte)),
            CR => (EchoLf, Reply::Byte(byte)),
            _ => (Echo, Reply::Byte(byte)),
        },
        SkipLine => match byte {
            CR => (SkipLf, Reply::None),
            _ => (SkipLine, Reply::None),
        },
        SkipLf => match byte {
            LF => (LineStart, Reply::None),
            CR => (SkipLf, Reply::None),
            _ => (SkipLine, Reply::None),
        },
    }
}

fn expect(byte: u8, wanted: u8, next: State) -> (State, Reply) {
    if byte == wanted {
        (next, Reply::None)
    } else if byte == CR {
        (State::SkipLf, Reply::None)
    } else {
        (State::SkipLine, Reply::None)
    }
}

/// Stateful wrapper around [`step`] for feeding whole chunks.
#[derive(Debug, Clone, Default)]
pub struct KeepAliveResponder {
    state: State,
}

impl KeepAliveResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Advance by one byte, appending any reply bytes to `out`.
    pub fn push(&mut self, byte: u8, out: &mut Vec<u8>) {
        let (next, reply) = step(self.state, byte);
        self.state = next;
        match reply {
            Reply::None => {}
            Reply::Prefix => out.extend_from_slice(PONG_PREFIX),
            Reply::Byte(b) => out.push(b),
        }
    }

    /// Feed a chunk, appending the reply bytes for the whole chunk to `out`.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<u8>) {
        for &byte in chunk {
            self.push(byte, out);
        }
    }
}
