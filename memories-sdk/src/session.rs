//! The session loop.
//!
//! One task, one `select!` per iteration over local input, the server
//! socket and a wait timeout. Arms are polled in that fixed order, so when
//! a typed line and server data are both ready the typed line is handled
//! first and the server data on the next iteration.
//!
//! Each connection gets a fresh keep-alive responder and mention scanner;
//! only the mention counter survives reconnects. Server data and typed
//! lines both count as activity for the staleness check.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;

use crate::buffer::{CRLF, LineBuffer, MAX_LINE_LEN};
use crate::config::{Identity, Timing};
use crate::connection::{Connector, authenticate, disconnect};
use crate::error::{Error, Result};
use crate::event::{Event, EventSink};
use crate::keepalive::KeepAliveResponder;
use crate::lifecycle::{State, Trigger};
use crate::mention::MentionScanner;

/// Longest local line handed to the command interpreter, LF included.
pub const MAX_INPUT_LEN: usize = MAX_LINE_LEN - 1;

/// A typed line, LF stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand<'a> {
    Help,
    License,
    Reconnect,
    Quit,
    Unread,
    Read,
    Hold,
    Message(&'a [u8]),
}

impl<'a> LocalCommand<'a> {
    pub fn parse(line: &'a [u8]) -> Self {
        match line {
            b"/help" => Self::Help,
            b"/license" => Self::License,
            b"/reconnect" => Self::Reconnect,
            b"/quit" => Self::Quit,
            b"/unread" => Self::Unread,
            b"/read" => Self::Read,
            b"/hold" => Self::Hold,
            other => Self::Message(other),
        }
    }
}

/// Line reader over the local input device.
///
/// Partially read bytes stay in `pending` when the read is cancelled by
/// another `select!` arm, so nothing typed is lost.
#[derive(Debug)]
struct LocalInput<I> {
    reader: I,
    pending: Vec<u8>,
}

impl<I: AsyncBufRead + Unpin> LocalInput<I> {
    fn new(reader: I) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(MAX_INPUT_LEN),
        }
    }

    /// Next line, LF stripped. Input longer than [`MAX_INPUT_LEN`] comes
    /// back in pieces. `None` at end of input.
    async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        loop {
            if self.pending.last() == Some(&b'\n') || self.pending.len() >= MAX_INPUT_LEN {
                let mut line = std::mem::take(&mut self.pending);
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                return Ok(Some(line));
            }
            let room = (MAX_INPUT_LEN - self.pending.len()) as u64;
            let n = (&mut self.reader)
                .take(room)
                .read_until(b'\n', &mut self.pending)
                .await?;
            if n == 0 {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.pending)));
            }
        }
    }
}

/// Per-connection context.
struct Connection<S> {
    stream: S,
    keepalive: KeepAliveResponder,
    mentions: MentionScanner,
    last_activity: Instant,
}

/// The long-lived client session.
pub struct Session<C, I, E> {
    identity: Identity,
    timing: Timing,
    connector: C,
    input: LocalInput<I>,
    events: E,
    buf: LineBuffer,
    state: State,
    terminate: bool,
    mentions: u64,
}

impl<C, I, E> Session<C, I, E>
where
    C: Connector,
    I: AsyncBufRead + Unpin,
    E: EventSink,
{
    pub fn new(identity: Identity, timing: Timing, connector: C, input: I, events: E) -> Self {
        Self {
            identity,
            timing,
            connector,
            input: LocalInput::new(input),
            events,
            buf: LineBuffer::new(),
            state: State::Connecting,
            terminate: false,
            mentions: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Unread mentions.
    pub fn mentions(&self) -> u64 {
        self.mentions
    }

    /// Run until the operator quits or a fatal error occurs.
    ///
    /// Connection-scoped errors never surface here: they end the current
    /// connection and the session reconnects after `reconnect_delay`.
    pub async fn run(&mut self) -> Result<()> {
        while !self.terminate {
            self.events.emit(Event::Connecting {
                host: self.identity.host.clone(),
                service: self.identity.service.clone(),
            });

            let trigger = match self.connect_and_serve().await {
                Ok(trigger) => trigger,
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(error = %e, "Connection failed");
                    self.events.emit(Event::Disconnected { reason: e.to_string() });
                    Trigger::Failed
                }
                Err(e) => {
                    tracing::error!(error = %e, "Fatal session error");
                    self.enter(State::Terminated);
                    return Err(e);
                }
            };
            self.advance(trigger);

            let next = self.state.after_disconnect();
            self.enter(next);
            if next.is_terminal() {
                break;
            }

            tracing::info!(
                delay_secs = self.timing.reconnect_delay.as_secs(),
                "Disconnected, will reconnect"
            );
            tokio::time::sleep(self.timing.reconnect_delay).await;
            self.advance(Trigger::DelayElapsed);
        }

        if !self.state.is_terminal() {
            self.enter(State::Terminated);
        }
        self.events.emit(Event::Terminating);
        Ok(())
    }

    async fn connect_and_serve(&mut self) -> Result<Trigger> {
        let (mut stream, addr) = self
            .connector
            .connect(&self.identity.host, &self.identity.service)
            .await?;
        if let Err(e) = authenticate(&mut stream, &self.identity).await {
            disconnect(stream).await;
            return Err(e);
        }
        tracing::info!(%addr, nick = %self.identity.nickname, "Connected");
        self.advance(Trigger::Connected);
        self.events.emit(Event::Connected { addr });

        let mut conn = Connection {
            stream,
            keepalive: KeepAliveResponder::new(),
            mentions: MentionScanner::new(self.identity.nickname.as_bytes()),
            last_activity: Instant::now(),
        };
        let result = self.serve(&mut conn).await;
        disconnect(conn.stream).await;
        result
    }

    /// Multiplex one connection until something ends it.
    async fn serve<S>(&mut self, conn: &mut Connection<S>) -> Result<Trigger>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            tokio::select! {
                biased;

                line = self.input.next_line() => {
                    let Some(line) = line.map_err(Error::Input)? else {
                        tracing::info!("Local input closed");
                        self.terminate = true;
                        return Ok(Trigger::UserQuit);
                    };
                    conn.last_activity = Instant::now();
                    if let Some(trigger) = self.dispatch_local(&line, conn).await? {
                        return Ok(trigger);
                    }
                }

                read = self.buf.read_from(&mut conn.stream) => {
                    let n = read.map_err(Error::Read)?;
                    if n == 0 {
                        tracing::info!("Server closed the connection");
                        self.events.emit(Event::Disconnected { reason: "EOF".to_string() });
                        return Ok(Trigger::PeerClosed);
                    }
                    tracing::debug!(bytes = n, "Received");
                    self.handle_inbound(conn).await?;
                }

                _ = tokio::time::sleep(self.timing.wait_timeout) => {
                    let idle = conn.last_activity.elapsed();
                    if idle >= self.timing.reconnect_after {
                        tracing::info!(idle_secs = idle.as_secs(), "Connection stale");
                        self.events.emit(Event::Disconnected { reason: "timed out".to_string() });
                        return Ok(Trigger::Stale);
                    }
                }
            }
        }
    }

    /// Feed the bytes in `buf` through the mention scanner and keep-alive
    /// responder, then write whatever reply they produced.
    async fn handle_inbound<S>(&mut self, conn: &mut Connection<S>) -> Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        conn.last_activity = Instant::now();
        let data = self.buf.as_slice();
        self.events.emit(Event::Received(data.to_vec()));

        let mut reply = Vec::new();
        for &byte in data {
            if conn.mentions.push(byte) {
                self.mentions += 1;
                self.events.emit(Event::Mention { total: self.mentions });
            }
            conn.keepalive.push(byte, &mut reply);
        }

        if !reply.is_empty() {
            tracing::debug!(bytes = reply.len(), "Answering keep-alive");
            conn.stream.write_all(&reply).await.map_err(Error::Write)?;
            conn.stream.flush().await.map_err(Error::Write)?;
        }
        Ok(())
    }

    async fn dispatch_local<S>(
        &mut self,
        line: &[u8],
        conn: &mut Connection<S>,
    ) -> Result<Option<Trigger>>
    where
        S: AsyncWrite + Unpin,
    {
        match LocalCommand::parse(line) {
            LocalCommand::Help => self.events.emit(Event::Help),
            LocalCommand::License => self.events.emit(Event::License),
            LocalCommand::Reconnect => {
                tracing::info!("Reconnect requested");
                return Ok(Some(Trigger::UserReconnect));
            }
            LocalCommand::Quit => {
                self.terminate = true;
                return Ok(Some(Trigger::UserQuit));
            }
            LocalCommand::Unread => self.events.emit(Event::Unread { count: self.mentions }),
            LocalCommand::Read => {
                self.events.emit(Event::Read { count: self.mentions });
                self.mentions = 0;
            }
            LocalCommand::Hold => {
                self.events.emit(Event::Held);
                let Some(held) = self.input.next_line().await.map_err(Error::Input)? else {
                    self.terminate = true;
                    return Ok(Some(Trigger::UserQuit));
                };
                conn.last_activity = Instant::now();
                self.events.emit(Event::Released);
                return self.send_message(&held, conn).await;
            }
            LocalCommand::Message(text) => return self.send_message(text, conn).await,
        }
        Ok(None)
    }

    /// Preview `text`, wait for confirmation, then send it.
    async fn send_message<S>(
        &mut self,
        text: &[u8],
        conn: &mut Connection<S>,
    ) -> Result<Option<Trigger>>
    where
        S: AsyncWrite + Unpin,
    {
        self.buf.fill_from(text);
        if let Some(t) = self.buf.truncate_at_terminator() {
            if t.is_notable() {
                self.events.emit(Event::Truncated { byte: t.byte });
            }
        }
        if self.buf.is_empty() {
            return Ok(None);
        }

        self.events
            .emit(Event::Preview(String::from_utf8_lossy(self.buf.as_slice()).into_owned()));
        let Some(answer) = self.input.next_line().await.map_err(Error::Input)? else {
            self.terminate = true;
            return Ok(Some(Trigger::UserQuit));
        };
        conn.last_activity = Instant::now();
        if !answer.is_empty() {
            self.events.emit(Event::Discarded);
            return Ok(None);
        }

        let mut out = Vec::with_capacity(self.buf.len() + CRLF.len());
        out.extend_from_slice(self.buf.as_slice());
        out.extend_from_slice(CRLF);
        conn.stream.write_all(&out).await.map_err(Error::Write)?;
        conn.stream.flush().await.map_err(Error::Write)?;
        self.events.emit(Event::Sent);
        Ok(None)
    }

    fn advance(&mut self, trigger: Trigger) {
        match self.state.on(trigger) {
            Some(next) => self.enter(next),
            None => tracing::warn!(state = %self.state, ?trigger, "Unexpected life-cycle trigger"),
        }
    }

    fn enter(&mut self, next: State) {
        tracing::info!(from = %self.state, to = %next, "State change");
        self.state = next;
        self.events.emit(Event::State(next));
    }
}
