//! Interactive prompts for connection details, on stderr.
//!
//! Runs before the session starts. Every answer is cut at the first CR,
//! LF or NUL and bounded to what fits on a protocol line; empty answers are
//! refused unless the prompt offers a default.

use std::io::{self, BufRead, Write};

use memories_sdk::config::{MAX_ADDRESS_LEN, MAX_DETAIL_LEN, sanitize_detail};
use memories_sdk::{Error, Identity, Result};

use crate::config::{DEFAULT_SERVICE, Resolved};

/// Ask for one value until a usable one is given.
pub fn ask<R, W>(
    input: &mut R,
    out: &mut W,
    label: &str,
    default: Option<&str>,
    max: usize,
) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    loop {
        match default {
            Some(d) => writeln!(out, "{label} [{d}]").ok(),
            None => writeln!(out, "{label}").ok(),
        };
        out.flush().ok();

        let mut raw = String::new();
        if input.read_line(&mut raw).map_err(Error::Input)? == 0 {
            return Err(Error::Input(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input closed while asking for {label}"),
            )));
        }

        let (value, truncated) = sanitize_detail(&raw, max);
        if truncated {
            writeln!(out, "memories (info): {label} truncated at a carriage return or null").ok();
        }
        if !value.is_empty() {
            return Ok(value);
        }
        if let Some(d) = default {
            return Ok(d.to_string());
        }
        writeln!(out, "memories (info): {label} cannot be empty").ok();
    }
}

/// Fill in whatever the CLI and config file left out. Values that were
/// given are cleaned the same way as typed answers.
pub fn complete<R, W>(resolved: &Resolved, input: &mut R, out: &mut W) -> Result<Identity>
where
    R: BufRead,
    W: Write,
{
    let nick = match given(resolved.nick.as_deref(), out, "nickname", MAX_DETAIL_LEN) {
        Some(n) => n,
        None => ask(input, out, "nickname", None, MAX_DETAIL_LEN)?,
    };
    let password = match given(resolved.password.as_deref(), out, "password", MAX_DETAIL_LEN) {
        Some(p) => p,
        None => ask(input, out, "password", None, MAX_DETAIL_LEN)?,
    };
    let user = match given(resolved.user.as_deref(), out, "user", MAX_DETAIL_LEN) {
        Some(u) => u,
        None => {
            let default = default_user(&nick);
            ask(input, out, "user", Some(&default), MAX_DETAIL_LEN)?
        }
    };
    let host = match given(resolved.host.as_deref(), out, "host", MAX_ADDRESS_LEN) {
        Some(h) => h,
        None => ask(input, out, "host", None, MAX_ADDRESS_LEN)?,
    };
    let service = match given(resolved.service.as_deref(), out, "service", MAX_ADDRESS_LEN) {
        Some(s) => s,
        None => ask(input, out, "service", Some(DEFAULT_SERVICE), MAX_ADDRESS_LEN)?,
    };
    Identity::new(nick, password, user, host, service)
}

/// A preset value after cleaning; `None` if there was none or nothing is
/// left of it, in which case the caller prompts.
fn given<W: Write>(value: Option<&str>, out: &mut W, label: &str, max: usize) -> Option<String> {
    let raw = value?;
    let (value, _) = sanitize_detail(raw, max);
    if value.is_empty() {
        writeln!(out, "memories (info): {label} cannot be empty").ok();
        return None;
    }
    if value.len() < raw.len() {
        writeln!(out, "memories (info): {label} truncated to {} bytes", value.len()).ok();
    }
    Some(value)
}

/// `USER` argument built from the login name, falling back to the nick.
fn default_user(nick: &str) -> String {
    let name = whoami::fallible::username().unwrap_or_else(|_| nick.to_string());
    format!("{name} 0 * :{name}")
}
