//! Connection setup and teardown.
//!
//! Resolution and socket creation sit behind the [`Resolver`] and
//! [`Connector`] traits so the session loop can run over any byte stream.
//! The defaults resolve through the system resolver and connect over TCP,
//! taking the first candidate address that accepts.

use std::future::Future;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::buffer::CRLF;
use crate::config::Identity;
use crate::error::{Error, Result};

/// Turns a host and service into candidate addresses, in preference order.
pub trait Resolver {
    fn resolve(&self, host: &str, service: &str)
        -> impl Future<Output = Result<Vec<SocketAddr>>>;
}

/// Opens a byte stream to the server.
pub trait Connector {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    fn connect(
        &mut self,
        host: &str,
        service: &str,
    ) -> impl Future<Output = Result<(Self::Stream, SocketAddr)>>;
}

/// Service names accepted in place of a port number. The system services
/// database is not consulted.
pub const SERVICE_NAMES: &[(&str, u16)] = &[
    ("irc", 6667),
    ("ircd", 6667),
    ("ircs", 6697),
    ("ircs-u", 6697),
];

/// Map a service string to a port: numeric, or one of [`SERVICE_NAMES`].
pub fn service_port(service: &str) -> Result<u16> {
    if let Ok(port) = service.parse::<u16>() {
        return Ok(port);
    }
    SERVICE_NAMES
        .iter()
        .find(|(name, _)| *name == service)
        .map(|&(_, port)| port)
        .ok_or_else(|| Error::UnknownService(service.to_string()))
}

/// Resolver backed by `getaddrinfo` via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str, service: &str) -> Result<Vec<SocketAddr>> {
        let port = service_port(service)?;
        tracing::debug!("Resolving {host}:{service}...");
        let addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| Error::Resolve {
                host: host.to_string(),
                service: service.to_string(),
                source,
            })?;
        Ok(addrs.collect())
    }
}

/// Plain TCP connector trying each resolved address in order.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector<R = SystemResolver> {
    resolver: R,
}

impl<R: Resolver> TcpConnector<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }
}

impl<R: Resolver> Connector for TcpConnector<R> {
    type Stream = TcpStream;

    async fn connect(&mut self, host: &str, service: &str) -> Result<(TcpStream, SocketAddr)> {
        let candidates = self.resolver.resolve(host, service).await?;
        for addr in candidates {
            match TcpStream::connect(addr).await {
                Ok(tcp) => {
                    tracing::debug!("TCP connected to {addr}");
                    return Ok((tcp, addr));
                }
                Err(e) => tracing::debug!("TCP connect to {addr} failed: {e}"),
            }
        }
        Err(Error::NoCandidate {
            host: host.to_string(),
            service: service.to_string(),
        })
    }
}

/// Send the registration lines: `PASS`, `NICK`, `USER`, in that order.
pub async fn authenticate<W>(writer: &mut W, identity: &Identity) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    for (command, value) in [
        ("PASS", &identity.password),
        ("NICK", &identity.nickname),
        ("USER", &identity.user),
    ] {
        let mut line = Vec::with_capacity(command.len() + 1 + value.len() + CRLF.len());
        line.extend_from_slice(command.as_bytes());
        line.push(b' ');
        line.extend_from_slice(value.as_bytes());
        line.extend_from_slice(CRLF);
        writer.write_all(&line).await.map_err(Error::Write)?;
    }
    writer.flush().await.map_err(Error::Write)
}

/// Close our side of the stream. Failures are ignored: the socket is
/// dropped either way.
pub async fn disconnect<S>(mut stream: S)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = stream.shutdown().await {
        tracing::debug!("Shutdown failed: {e}");
    }
}
