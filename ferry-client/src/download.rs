//! Download executor
//!
//! Drives one download session: issue the command, dispatch on the
//! header, stream the body to a `.part` file with per-chunk cancellation
//! checks and throttled progress publication, then rename into place.
//! Cancelled, failed, and short downloads all delete their partial
//! output; the destination only ever appears complete.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::timeout;

use ferry_common::BUFFER_SIZE;
use ferry_common::framing::{FrameError, FrameReader, FrameWriter};
use ferry_common::protocol::{Command, DownloadHeader};

use crate::session::{Progress, TransferSession};

/// Timeout for establishing the connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for each read; resets whenever bytes arrive
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum interval between progress updates (100ms = 10 updates/second)
const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

/// Error type for download operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// Could not connect to the server
    Connect(String),
    /// The server answered with an `ERROR:` header
    Refused(String),
    /// The stream closed mid-exchange
    ConnectionLost,
    /// The stream stalled past the idle timeout
    TimedOut,
    /// Fewer body bytes arrived than the header declared
    TransferIncomplete { expected: u64, received: u64 },
    /// Cancelled by the caller
    Cancelled,
    /// The server sent something other than a download header
    Protocol(String),
    /// Local file I/O failure
    Io(String),
}

impl std::fmt::Display for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "connect failed: {}", msg),
            Self::Refused(msg) => write!(f, "server error: {}", msg),
            Self::ConnectionLost => write!(f, "connection lost"),
            Self::TimedOut => write!(f, "transfer timed out"),
            Self::TransferIncomplete { expected, received } => {
                write!(
                    f,
                    "transfer incomplete: expected {} bytes, received {}",
                    expected, received
                )
            }
            Self::Cancelled => write!(f, "cancelled"),
            Self::Protocol(msg) => write!(f, "protocol error: {}", msg),
            Self::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<FrameError> for DownloadError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::ConnectionClosed => DownloadError::ConnectionLost,
            FrameError::Io(msg) => DownloadError::Io(msg),
            other => DownloadError::Protocol(other.to_string()),
        }
    }
}

/// Connect to the server and run one download to completion.
///
/// Progress snapshots are published through `progress_tx`; cancellation
/// is observed through `cancel` between chunks.
///
/// # Errors
///
/// Any failure deletes the partial output and is returned as a
/// [`DownloadError`]; the destination file exists only on success.
pub async fn execute_download(
    host: &str,
    port: u16,
    remote_path: &str,
    destination: &Path,
    cancel: Arc<AtomicBool>,
    progress_tx: watch::Sender<Progress>,
) -> Result<TransferSession, DownloadError> {
    let stream = match timeout(CONNECT_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(DownloadError::Connect(e.to_string())),
        Err(_) => return Err(DownloadError::Connect("connection timed out".to_string())),
    };

    let (read_half, write_half) = stream.into_split();
    run_download(
        read_half,
        write_half,
        remote_path,
        destination,
        cancel,
        progress_tx,
    )
    .await
}

/// Run the download protocol over an established stream.
///
/// Split out from [`execute_download`] so tests can drive it over an
/// in-memory duplex pipe.
pub(crate) async fn run_download<R, W>(
    read_half: R,
    write_half: W,
    remote_path: &str,
    destination: &Path,
    cancel: Arc<AtomicBool>,
    progress_tx: watch::Sender<Progress>,
) -> Result<TransferSession, DownloadError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = TransferSession::new(remote_path.to_string(), destination.to_path_buf());
    let mut reader = FrameReader::new(BufReader::new(read_half));
    let mut writer = FrameWriter::new(write_half);

    writer
        .write_command(&Command::Download {
            path: remote_path.to_string(),
        })
        .await?;
    session.await_header();

    let header = match timeout(IDLE_TIMEOUT, reader.read_download_header()).await {
        Ok(Ok(header)) => header,
        Ok(Err(e)) => {
            session.fail(e.to_string());
            return Err(e.into());
        }
        Err(_) => {
            session.fail("timed out waiting for header");
            return Err(DownloadError::TimedOut);
        }
    };

    let total = match header {
        DownloadHeader::Size(total) => total,
        DownloadHeader::Error(message) => {
            session.fail(message.clone());
            return Err(DownloadError::Refused(message));
        }
    };

    session.start_transfer(total);
    progress_tx.send_replace(session.progress());

    let part = partial_path(destination);
    let mut file = File::create(&part)
        .await
        .map_err(|e| DownloadError::Io(e.to_string()))?;

    match stream_body(
        &mut reader,
        &mut file,
        &mut session,
        &cancel,
        &progress_tx,
        total,
    )
    .await
    {
        Ok(()) => {}
        Err(e) => {
            drop(file);
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
    }

    if let Err(e) = finalize_partial(file, &part, destination).await {
        session.fail(e.to_string());
        return Err(e);
    }

    session.complete();
    progress_tx.send_replace(session.progress());
    Ok(session)
}

/// Receive exactly `total` body bytes into `file`.
///
/// Marks the session terminal on every exit path; the caller removes the
/// partial file on error.
async fn stream_body<R>(
    reader: &mut FrameReader<BufReader<R>>,
    file: &mut File,
    session: &mut TransferSession,
    cancel: &Arc<AtomicBool>,
    progress_tx: &watch::Sender<Progress>,
    total: u64,
) -> Result<(), DownloadError>
where
    R: AsyncRead + Unpin,
{
    let mut remaining = total;
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut last_update = Instant::now();

    while remaining > 0 {
        // Cooperative cancellation, observed between chunks
        if cancel.load(Ordering::Relaxed) {
            session.cancel();
            return Err(DownloadError::Cancelled);
        }

        let to_read = (remaining as usize).min(buffer.len());
        let bytes_read = match timeout(IDLE_TIMEOUT, reader.get_mut().read(&mut buffer[..to_read]))
            .await
        {
            Ok(Ok(0)) => {
                let received = total - remaining;
                session.fail("stream ended before declared length");
                return Err(DownloadError::TransferIncomplete {
                    expected: total,
                    received,
                });
            }
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                session.fail(e.to_string());
                return Err(DownloadError::Io(e.to_string()));
            }
            Err(_) => {
                session.fail("stream stalled");
                return Err(DownloadError::TimedOut);
            }
        };

        file.write_all(&buffer[..bytes_read]).await.map_err(|e| {
            session.fail(e.to_string());
            DownloadError::Io(e.to_string())
        })?;

        remaining -= bytes_read as u64;
        session.advance(bytes_read as u64);

        if last_update.elapsed() >= PROGRESS_UPDATE_INTERVAL {
            progress_tx.send_replace(session.progress());
            last_update = Instant::now();
        }
    }

    // Final update so observers see 100%
    progress_tx.send_replace(session.progress());
    Ok(())
}

/// Flush the finished body and rename it into place.
///
/// Every failure here deletes the partial file before returning, so a
/// download that cannot be finalized leaves nothing behind.
async fn finalize_partial(
    mut file: File,
    part: &Path,
    destination: &Path,
) -> Result<(), DownloadError> {
    if let Err(e) = file.flush().await {
        drop(file);
        let _ = tokio::fs::remove_file(part).await;
        return Err(DownloadError::Io(e.to_string()));
    }
    drop(file);

    if let Err(e) = tokio::fs::rename(part, destination).await {
        let _ = tokio::fs::remove_file(part).await;
        return Err(DownloadError::Io(e.to_string()));
    }
    Ok(())
}

/// The temporary path a download is written to before it is complete
fn partial_path(destination: &Path) -> PathBuf {
    PathBuf::from(format!("{}.part", destination.display()))
}
