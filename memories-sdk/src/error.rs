//! Engine error type.
//!
//! Errors fall into two classes. Connection-scoped failures are
//! recoverable: the session drops the socket and reconnects after the
//! configured delay. Everything else is fatal and ends the session.

use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to resolve {host}:{service}: {source}")]
    Resolve {
        host: String,
        service: String,
        #[source]
        source: io::Error,
    },

    #[error("unknown service {0:?} (expected a port number or irc, ircd, ircs, ircs-u)")]
    UnknownService(String),

    #[error("no address for {host}:{service} accepted a connection")]
    NoCandidate { host: String, service: String },

    #[error("write to server failed: {0}")]
    Write(#[source] io::Error),

    #[error("read from server failed: {0}")]
    Read(#[source] io::Error),

    #[error("reading local input failed: {0}")]
    Input(#[source] io::Error),

    #[error("invalid {field}: {reason}")]
    InvalidDetail { field: &'static str, reason: String },
}

impl Error {
    /// Whether the session should reconnect instead of exiting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Resolve { .. }
                | Error::UnknownService(_)
                | Error::NoCandidate { .. }
                | Error::Write(_)
                | Error::Read(_)
        )
    }

    /// Distinct process exit status per failure kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Resolve { .. } => 3,
            Error::UnknownService(_) => 4,
            Error::NoCandidate { .. } => 5,
            Error::Write(_) => 6,
            Error::Read(_) => 7,
            Error::Input(_) => 8,
            Error::InvalidDetail { .. } => 9,
        }
    }
}
