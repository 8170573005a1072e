//! Plain-text rendering of session events.

use std::io::{self, Write};

use memories_sdk::{Event, EventSink, State};

const HELP: &[&str] = &[
    "/help    shows this help message",
    "/license    shows copyright information",
    "/reconnect    performs a forced reconnect",
    "/quit    gracefully quits memories",
    "/unread    shows the number of unread mentions",
    "/read    resets the mention count",
    "/hold    waits for one more line, then previews it as a message",
    "anything else is previewed; press Enter to send it, any other input discards it",
];

const LICENSE: &str = "memories is licensed under the GNU General Public License v3.0";

const BELL: u8 = 0x07;

/// Writes events to a terminal stream, normally stderr.
pub struct Console<W> {
    out: W,
}

impl Console<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn info(&mut self, text: &str) {
        writeln!(self.out, "memories (info): {text}").ok();
    }
}

impl<W: Write> EventSink for Console<W> {
    fn emit(&mut self, event: Event) {
        match event {
            Event::Connecting { host, service } => {
                self.info(&format!("establishing connection to {host}:{service}"));
            }
            Event::Connected { addr } => self.info(&format!("connected to {addr}")),
            Event::Disconnected { reason } => self.info(&format!("disconnected ({reason})")),
            Event::State(State::Reconnecting) => self.info("reconnecting"),
            Event::State(_) => {}
            Event::Received(bytes) => {
                self.out.write_all(&bytes).ok();
            }
            Event::Mention { .. } => {
                self.out.write_all(&[BELL]).ok();
            }
            Event::Help => {
                for line in HELP {
                    self.info(line);
                }
            }
            Event::License => self.info(LICENSE),
            Event::Unread { count } => self.info(&format!("{count} unread mentions")),
            Event::Read { count } => self.info(&format!("{count} mentions read")),
            Event::Held => self.info("held"),
            Event::Released => self.info("released"),
            Event::Truncated { byte: b'\r' } => self.info("message with carriage return truncated"),
            Event::Truncated { .. } => self.info("message with null truncated"),
            Event::Preview(text) => {
                writeln!(self.out, "memories (preview): {text}").ok();
            }
            Event::Sent => {}
            Event::Discarded => self.info("discarded"),
            Event::Terminating => self.info("terminating"),
        }
        self.out.flush().ok();
    }
}
