//! # memories-sdk
//!
//! Protocol engine for a minimal IRC client that stays connected.
//!
//! The engine keeps a single connection alive: it registers with
//! `PASS`/`NICK`/`USER`, answers server `PING`s byte for byte however the
//! stream is chunked, counts `@nick` mentions, and reconnects when the
//! server goes quiet, hangs up, or errors. Local input and server data
//! are multiplexed on one task.
//!
//! ## Modules
//!
//! - [`session`]: the reactive loop and life-cycle driver
//! - [`connection`]: resolution, connect, registration, teardown
//! - [`keepalive`]: incremental `PING` → `PONG` state machine
//! - [`mention`]: incremental `@nick` scanner
//! - [`buffer`]: bounded line buffer
//! - [`event`]: what the engine reports to the console layer
//! - [`lifecycle`]: connection states and transitions
//! - [`config`]: identity and timing
//! - [`error`]: recoverable vs fatal errors

pub mod buffer;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod keepalive;
pub mod lifecycle;
pub mod mention;
pub mod session;

pub use config::{Identity, Timing};
pub use connection::{Connector, Resolver, SystemResolver, TcpConnector};
pub use error::{Error, Result};
pub use event::{Event, EventSink};
pub use lifecycle::State;
pub use session::Session;
