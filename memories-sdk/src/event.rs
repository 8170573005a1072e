//! Events emitted by the session for the console layer to render.

use std::net::SocketAddr;

use crate::lifecycle::State;

/// Everything the engine wants the operator to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Life-cycle state changed.
    State(State),

    /// About to resolve and connect.
    Connecting { host: String, service: String },

    /// TCP connection established and credentials sent.
    Connected { addr: SocketAddr },

    /// Connection dropped; the session will reconnect unless quitting.
    Disconnected { reason: String },

    /// Raw bytes from the server, mirrored for visibility.
    Received(Vec<u8>),

    /// Someone wrote `@<our nick>`. `total` is the unread mention count.
    Mention { total: u64 },

    /// `/help`.
    Help,

    /// `/license`.
    License,

    /// `/unread`.
    Unread { count: u64 },

    /// `/read`: `count` mentions marked read, counter now zero.
    Read { count: u64 },

    /// `/hold`: waiting for the next local line.
    Held,

    /// The held line arrived.
    Released,

    /// A typed message contained a CR or NUL and was cut there.
    Truncated { byte: u8 },

    /// Message awaiting confirmation (Enter sends, anything else discards).
    Preview(String),

    /// Confirmed message written to the server.
    Sent,

    /// Message not confirmed.
    Discarded,

    /// Session is shutting down.
    Terminating,
}

/// Receiver of session events.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: Event) {
        (**self).emit(event);
    }
}
