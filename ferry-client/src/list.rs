//! Directory listing requests

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use ferry_common::framing::{FrameError, FrameReader, FrameWriter};
use ferry_common::protocol::{Command, ListResponse, WireEntry};

/// Timeout for connecting and for the response
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for listing requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFetchError {
    /// Could not connect to the server
    Connect(String),
    /// The server answered with an error response
    Server(String),
    /// The stream closed or misbehaved
    ConnectionLost,
    /// No response within the timeout
    TimedOut,
    /// The response could not be decoded
    Protocol(String),
}

impl std::fmt::Display for ListFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "connect failed: {}", msg),
            Self::Server(msg) => write!(f, "server error: {}", msg),
            Self::ConnectionLost => write!(f, "connection lost"),
            Self::TimedOut => write!(f, "request timed out"),
            Self::Protocol(msg) => write!(f, "protocol error: {}", msg),
        }
    }
}

impl std::error::Error for ListFetchError {}

impl From<FrameError> for ListFetchError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::ConnectionClosed => ListFetchError::ConnectionLost,
            FrameError::Io(msg) => ListFetchError::Connect(msg),
            other => ListFetchError::Protocol(other.to_string()),
        }
    }
}

/// Fetch the listing of a remote directory over a fresh connection.
///
/// # Errors
///
/// Returns a [`ListFetchError`] describing the failure; a server-side
/// refusal (bad path, unreadable directory) surfaces as
/// [`ListFetchError::Server`] with the server's message.
pub async fn fetch_listing(
    host: &str,
    port: u16,
    path: &str,
) -> Result<Vec<WireEntry>, ListFetchError> {
    let stream = match timeout(REQUEST_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(ListFetchError::Connect(e.to_string())),
        Err(_) => return Err(ListFetchError::Connect("connection timed out".to_string())),
    };

    let (read_half, write_half) = stream.into_split();
    request_listing(read_half, write_half, path).await
}

/// Issue one LIST command over an established stream
pub(crate) async fn request_listing<R, W>(
    read_half: R,
    write_half: W,
    path: &str,
) -> Result<Vec<WireEntry>, ListFetchError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = FrameReader::new(BufReader::new(read_half));
    let mut writer = FrameWriter::new(write_half);

    writer
        .write_command(&Command::List {
            path: path.to_string(),
        })
        .await?;

    let response = match timeout(REQUEST_TIMEOUT, reader.read_list_response()).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err(ListFetchError::TimedOut),
    };

    match response {
        ListResponse::Listing { listing } => Ok(listing),
        ListResponse::Error { error } => Err(ListFetchError::Server(error)),
    }
}
