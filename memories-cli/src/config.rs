//! Optional configuration file for memories.
//!
//! Lives at `~/.config/memories/config.toml` unless `--config` points
//! elsewhere. The password is never read from here; pass it with
//! `--password`, `MEMORIES_PASSWORD`, or at the prompt.

use std::path::{Path, PathBuf};
use std::time::Duration;

use memories_sdk::Timing;
use serde::{Deserialize, Serialize};

use crate::Cli;

/// Service used when nothing else names one.
pub const DEFAULT_SERVICE: &str = "6667";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// IRC nickname.
    pub nick: Option<String>,
    /// Argument of the `USER` line.
    pub user: Option<String>,
    /// Server host name or address.
    pub host: Option<String>,
    /// Port number or service name.
    pub service: Option<String>,
    /// Multiplexer wait, whole seconds.
    pub timeout_secs: Option<u64>,
    /// Multiplexer wait, extra microseconds.
    pub timeout_micros: Option<u64>,
    /// Reconnect after this many seconds without server data.
    pub reconnect_after: Option<u64>,
    /// Seconds to wait before each reconnect.
    pub reconnect_delay: Option<u64>,
}

pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("memories")
        .join("config.toml")
}

impl Config {
    /// Load the config file. A missing file is not an error; an unreadable
    /// or malformed one is reported and ignored.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(s) => match toml::from_str(&s) {
                Ok(c) => return c,
                Err(e) => tracing::warn!("Bad config file {}: {e}", path.display()),
            },
            Err(e) => tracing::warn!("Can't read {}: {e}", path.display()),
        }
        Self::default()
    }
}

/// Values after merging CLI flags over the config file. Identity fields
/// still missing here are asked for interactively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub nick: Option<String>,
    pub password: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub service: Option<String>,
    pub timing: Timing,
}

impl Resolved {
    /// Merge: CLI overrides > config file > defaults.
    pub fn merge(cli: &Cli, config: &Config) -> Self {
        let defaults = Timing::default();

        let timeout_secs = cli.timeout_secs.or(config.timeout_secs);
        let timeout_micros = cli.timeout_micros.or(config.timeout_micros);
        let wait_timeout = match (timeout_secs, timeout_micros) {
            (None, None) => defaults.wait_timeout,
            (secs, micros) => {
                Duration::from_secs(secs.unwrap_or(0)) + Duration::from_micros(micros.unwrap_or(0))
            }
        };
        let reconnect_after = cli
            .reconnect_after
            .or(config.reconnect_after)
            .map_or(defaults.reconnect_after, Duration::from_secs);
        let reconnect_delay = cli
            .reconnect_delay
            .or(config.reconnect_delay)
            .map_or(defaults.reconnect_delay, Duration::from_secs);

        Self {
            nick: cli.nick.clone().or_else(|| config.nick.clone()),
            password: cli.password.clone(),
            user: cli.user.clone().or_else(|| config.user.clone()),
            host: cli.host.clone().or_else(|| config.host.clone()),
            service: cli.service.clone().or_else(|| config.service.clone()),
            timing: Timing {
                wait_timeout,
                reconnect_after,
                reconnect_delay,
            },
        }
    }
}
