//! memories: a line-oriented IRC client that stays connected.
//!
//! Asks for whatever connection details the flags and config file don't
//! provide, then runs the session on a single-threaded runtime. Lines typed
//! on stdin are either local commands (see `/help`) or raw protocol lines
//! sent to the server after confirmation. Server traffic is mirrored to
//! stderr as it arrives.

mod config;
mod console;
mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use memories_sdk::{Session, SystemResolver, TcpConnector};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Resolved};
use crate::console::Console;

#[derive(Parser, Debug)]
#[command(name = "memories", about = "Minimal IRC client that stays connected", version)]
pub struct Cli {
    /// Nickname
    #[arg(long)]
    pub nick: Option<String>,

    /// Argument of the USER line (e.g. "nova 0 * :Nova")
    #[arg(long)]
    pub user: Option<String>,

    /// Server host
    #[arg(long)]
    pub host: Option<String>,

    /// Server port number, or irc/ircd (6667) or ircs/ircs-u (6697)
    #[arg(long)]
    pub service: Option<String>,

    /// Server password (or set MEMORIES_PASSWORD)
    #[arg(long, env = "MEMORIES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Multiplexer wait timeout, seconds part
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Multiplexer wait timeout, microseconds part
    #[arg(long)]
    pub timeout_micros: Option<u64>,

    /// Reconnect after this many seconds without server data
    #[arg(long)]
    pub reconnect_after: Option<u64>,

    /// Seconds to wait before each reconnect
    #[arg(long)]
    pub reconnect_delay: Option<u64>,

    /// Config file (default: ~/.config/memories/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log as JSON
    #[arg(long, env = "MEMORIES_LOG_JSON")]
    pub log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("memories=warn,memories_sdk=warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.config.clone().unwrap_or_else(config::default_path);
    let config = Config::load(&path);
    let resolved = Resolved::merge(&cli, &config);

    let identity = {
        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr();
        prompt::complete(&resolved, &mut stdin.lock(), &mut stderr)?
    };
    tracing::debug!(host = %identity.host, service = %identity.service, "Starting session");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let result = runtime.block_on(async {
        let mut session = Session::new(
            identity,
            resolved.timing,
            TcpConnector::new(SystemResolver),
            BufReader::new(tokio::io::stdin()),
            Console::stderr(),
        );
        session.run().await
    });
    // A stdin read may still be parked on a blocking thread.
    runtime.shutdown_background();
    result?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("memories (error): {e:#}");
            let code = e
                .downcast_ref::<memories_sdk::Error>()
                .map_or(1, memories_sdk::Error::exit_code);
            ExitCode::from(code)
        }
    }
}
