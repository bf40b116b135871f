//! Best-effort virus scanning through a clamd daemon.
//!
//! The adapter probes the daemon once per process lifetime. A failed probe
//! marks the scanner unavailable for good, and every unavailable or failed
//! scan reports [`ScanOutcome::Skipped`], which the upload pipeline treats as
//! clean. Only an explicit `FOUND` reply from the daemon rejects a file.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::{ScanEndpoint, ScannerConfig};

const INSTREAM_CHUNK: usize = 8192;

/// Result of scanning a single file's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Clean,
    Infected(String),
    /// Scan did not run (daemon unavailable, transport error, timeout).
    Skipped(String),
}

impl ScanOutcome {
    pub fn is_infected(&self) -> bool {
        matches!(self, ScanOutcome::Infected(_))
    }
}

/// Seam for the upload pipeline so tests can swap in canned outcomes.
pub trait VirusScanner: Send + Sync {
    fn scan(&self, bytes: &[u8]) -> impl Future<Output = ScanOutcome> + Send;
}

/// Process lifecycle for the daemon handle: uninitialized until the first
/// scan, connecting while the probe runs (concurrent callers await it), then
/// permanently ready or unavailable.
pub struct ClamdScanner {
    config: ScannerConfig,
    ready: OnceCell<bool>,
}

impl ClamdScanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            ready: OnceCell::new(),
        }
    }

    async fn ready(&self) -> bool {
        *self
            .ready
            .get_or_init(|| async {
                let Some(endpoint) = &self.config.endpoint else {
                    info!("virus scanning disabled, no scanner endpoint configured");
                    return false;
                };
                match timeout(self.config.timeout, ping(endpoint)).await {
                    Ok(Ok(())) => {
                        info!("virus scanner ready");
                        true
                    }
                    Ok(Err(err)) => {
                        warn!(%err, "virus scanner unavailable, uploads will not be scanned");
                        false
                    }
                    Err(_) => {
                        warn!("virus scanner probe timed out, uploads will not be scanned");
                        false
                    }
                }
            })
            .await
    }
}

impl VirusScanner for ClamdScanner {
    fn scan(&self, bytes: &[u8]) -> impl Future<Output = ScanOutcome> + Send {
        async move {
            if !self.ready().await {
                return ScanOutcome::Skipped("scanner unavailable".to_string());
            }
            let Some(endpoint) = &self.config.endpoint else {
                return ScanOutcome::Skipped("scanner unavailable".to_string());
            };

            match timeout(self.config.timeout, instream(endpoint, bytes)).await {
                Ok(Ok(reply)) => parse_reply(&reply),
                Ok(Err(err)) => {
                    warn!(%err, "virus scan failed, treating file as clean");
                    ScanOutcome::Skipped(err.to_string())
                }
                Err(_) => {
                    warn!("virus scan timed out, treating file as clean");
                    ScanOutcome::Skipped("scan timed out".to_string())
                }
            }
        }
    }
}

fn parse_reply(reply: &str) -> ScanOutcome {
    if let Some(rest) = reply.strip_suffix("FOUND") {
        let signature = rest
            .rsplit_once(':')
            .map(|(_, sig)| sig)
            .unwrap_or(rest)
            .trim();
        return ScanOutcome::Infected(signature.to_string());
    }
    if reply.ends_with("OK") {
        return ScanOutcome::Clean;
    }
    ScanOutcome::Skipped(format!("unexpected scanner reply: {reply}"))
}

async fn ping(endpoint: &ScanEndpoint) -> io::Result<()> {
    let reply = match endpoint {
        ScanEndpoint::Tcp(addr) => {
            let mut stream = TcpStream::connect(addr.as_str()).await?;
            command(&mut stream, b"zPING\0").await?
        }
        #[cfg(unix)]
        ScanEndpoint::Unix(path) => {
            let mut stream = UnixStream::connect(path).await?;
            command(&mut stream, b"zPING\0").await?
        }
        #[cfg(not(unix))]
        ScanEndpoint::Unix(_) => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "unix sockets are not available on this platform",
            ))
        }
    };

    if reply.starts_with("PONG") {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unexpected ping reply: {reply}"),
        ))
    }
}

async fn instream(endpoint: &ScanEndpoint, bytes: &[u8]) -> io::Result<String> {
    match endpoint {
        ScanEndpoint::Tcp(addr) => {
            let mut stream = TcpStream::connect(addr.as_str()).await?;
            stream_body(&mut stream, bytes).await
        }
        #[cfg(unix)]
        ScanEndpoint::Unix(path) => {
            let mut stream = UnixStream::connect(path).await?;
            stream_body(&mut stream, bytes).await
        }
        #[cfg(not(unix))]
        ScanEndpoint::Unix(_) => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "unix sockets are not available on this platform",
        )),
    }
}

async fn command<S>(stream: &mut S, payload: &[u8]) -> io::Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(payload).await?;
    stream.flush().await?;
    read_reply(stream).await
}

/// clamd INSTREAM: command, then length-prefixed chunks, then a zero chunk.
async fn stream_body<S>(stream: &mut S, bytes: &[u8]) -> io::Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(b"zINSTREAM\0").await?;
    for chunk in bytes.chunks(INSTREAM_CHUNK) {
        stream.write_all(&(chunk.len() as u32).to_be_bytes()).await?;
        stream.write_all(chunk).await?;
    }
    stream.write_all(&0u32.to_be_bytes()).await?;
    stream.flush().await?;
    read_reply(stream).await
}

async fn read_reply<S>(stream: &mut S) -> io::Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;
    Ok(String::from_utf8_lossy(&raw)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string())
}
