//! Session identity and timing parameters.

use std::time::Duration;

use crate::buffer::{MAX_LINE_LEN, find_terminator};
use crate::error::{Error, Result};

/// Longest nickname, password or user string.
pub const MAX_DETAIL_LEN: usize = MAX_LINE_LEN - 2;
/// Longest host or service string.
pub const MAX_ADDRESS_LEN: usize = MAX_LINE_LEN;

/// Who we are and where we connect. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub nickname: String,
    pub password: String,
    pub user: String,
    pub host: String,
    pub service: String,
}

impl Identity {
    /// Build an identity, rejecting values that would corrupt the wire
    /// format or that are empty.
    pub fn new(
        nickname: impl Into<String>,
        password: impl Into<String>,
        user: impl Into<String>,
        host: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self> {
        let identity = Self {
            nickname: nickname.into(),
            password: password.into(),
            user: user.into(),
            host: host.into(),
            service: service.into(),
        };
        validate("nickname", &identity.nickname, MAX_DETAIL_LEN)?;
        validate("password", &identity.password, MAX_DETAIL_LEN)?;
        validate("user", &identity.user, MAX_DETAIL_LEN)?;
        validate("host", &identity.host, MAX_ADDRESS_LEN)?;
        validate("service", &identity.service, MAX_ADDRESS_LEN)?;
        Ok(identity)
    }
}

fn validate(field: &'static str, value: &str, max: usize) -> Result<()> {
    let reason = if value.is_empty() {
        "cannot be empty".to_string()
    } else if value.len() > max {
        format!("longer than {max} bytes")
    } else if find_terminator(value.as_bytes()).is_some() {
        "contains a line terminator or NUL".to_string()
    } else {
        return Ok(());
    };
    Err(Error::InvalidDetail { field, reason })
}

/// Clean up one line of operator input: cut at the first CR, LF or NUL and
/// keep at most `max` bytes without splitting a character. Returns the
/// value and whether a CR or NUL forced the cut.
pub fn sanitize_detail(raw: &str, max: usize) -> (String, bool) {
    let (mut value, notable) = match find_terminator(raw.as_bytes()) {
        Some(t) => (&raw[..t.at], t.is_notable()),
        None => (raw, false),
    };
    if value.len() > max {
        let mut end = max;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        value = &value[..end];
    }
    (value.to_string(), notable)
}

/// Timing knobs of the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Upper bound on one multiplexer wait.
    pub wait_timeout: Duration,
    /// Reconnect once neither the peer nor the operator has been active
    /// for this long.
    pub reconnect_after: Duration,
    /// Pause before every reconnect attempt.
    pub reconnect_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(10),
            reconnect_after: Duration::from_secs(300),
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_embedded_terminators() {
        let err = Identity::new("", "pw", "u", "h", "6667").unwrap_err();
        assert!(matches!(err, Error::InvalidDetail { field: "nickname", .. }));
        let err = Identity::new("nova", "p\r\nw", "u", "h", "6667").unwrap_err();
        assert!(matches!(err, Error::InvalidDetail { field: "password", .. }));
        assert!(Identity::new("nova", "pw", "nova 0 * :Nova", "irc.example.net", "6667").is_ok());
    }

    #[test]
    fn rejects_overlong_nickname() {
        let long = "n".repeat(MAX_DETAIL_LEN + 1);
        assert!(Identity::new(long, "pw", "u", "h", "1").is_err());
    }

    #[test]
    fn sanitize_cuts_and_bounds() {
        assert_eq!(sanitize_detail("nova\n", 10), ("nova".to_string(), false));
        assert_eq!(sanitize_detail("no\0va", 10), ("no".to_string(), true));
        assert_eq!(sanitize_detail("abcdef", 3), ("abc".to_string(), false));
        // 'é' is two bytes; a cut inside it backs off to the boundary.
        assert_eq!(sanitize_detail("aé", 2), ("a".to_string(), false));
    }
}
