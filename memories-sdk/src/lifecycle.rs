//! Connection life-cycle states.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Connecting,
    Connected,
    /// Nothing received from the peer for the reconnect threshold.
    Stale,
    /// The peer closed its side (zero-length read).
    PeerClosed,
    /// A connection-scoped error ended the attempt.
    Failed,
    UserReconnect,
    UserQuit,
    /// Waiting out the reconnect delay.
    Reconnecting,
    Terminated,
}

/// Why a connected session stopped serving its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Connected,
    Stale,
    PeerClosed,
    Failed,
    UserReconnect,
    UserQuit,
    DelayElapsed,
}

impl State {
    /// Next state for `trigger`, or `None` if the transition isn't part of
    /// the life-cycle.
    pub fn on(self, trigger: Trigger) -> Option<State> {
        use State::*;
        let next = match (self, trigger) {
            (Connecting, Trigger::Connected) => Connected,
            (Connecting, Trigger::Failed) => Failed,
            (Connected, Trigger::Stale) => Stale,
            (Connected, Trigger::PeerClosed) => PeerClosed,
            (Connected, Trigger::Failed) => Failed,
            (Connected, Trigger::UserReconnect) => UserReconnect,
            (Connected, Trigger::UserQuit) => UserQuit,
            (Reconnecting, Trigger::DelayElapsed) => Connecting,
            _ => return None,
        };
        Some(next)
    }

    /// The state entered after a disconnect: quitting terminates, anything
    /// else waits and reconnects.
    pub fn after_disconnect(self) -> State {
        match self {
            State::UserQuit => State::Terminated,
            _ => State::Reconnecting,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == State::Terminated
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Connecting => "connecting",
            State::Connected => "connected",
            State::Stale => "stale",
            State::PeerClosed => "peer closed",
            State::Failed => "failed",
            State::UserReconnect => "reconnect requested",
            State::UserQuit => "quit requested",
            State::Reconnecting => "reconnecting",
            State::Terminated => "terminated",
        };
        f.write_str(s)
    }
}
