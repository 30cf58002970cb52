//! Per-connection command handling
//!
//! Each accepted connection gets one handler running this loop: read a
//! command frame, dispatch it, write the response, repeat until the peer
//! stops sending. Command-level failures (bad path, missing file,
//! unreadable directory) are encoded as error responses and the
//! connection stays open; transport failures tear down only this
//! connection.

use std::io;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use ferry_common::BUFFER_SIZE;
use ferry_common::framing::{FrameError, FrameReader, FrameWriter};
use ferry_common::protocol::{Command, ListResponse};

use crate::config::ServerConfig;
use crate::listing::{ListError, list_directory, to_wire};
use crate::paths::resolve;

/// Error text for an undecodable command frame
const ERR_INVALID_JSON: &str = "Invalid JSON";

/// Error text for an oversized command frame
const ERR_REQUEST_TOO_LARGE: &str = "Request too large";

/// Error text for a download that cannot be served
const ERR_FILE_UNAVAILABLE: &str = "File not found or access denied";

/// Handle one client connection until it closes.
///
/// Generic over the stream halves so tests can drive it over an
/// in-memory duplex pipe.
///
/// # Errors
///
/// Returns an error only for transport-level failures on this
/// connection: a write failure, or a file shrinking underneath an
/// in-flight body (the declared length can no longer be honored, so the
/// connection cannot be reused).
pub async fn handle_connection<R, W>(
    read_half: R,
    write_half: W,
    config: Arc<ServerConfig>,
    peer: &str,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = FrameReader::new(BufReader::new(read_half));
    let mut writer = FrameWriter::new(write_half);

    loop {
        let command = match reader.read_command().await {
            Ok(Some(command)) => command,
            Ok(None) => break,
            Err(FrameError::ConnectionClosed) => break,
            Err(FrameError::MalformedFrame(e)) => {
                if config.debug {
                    eprintln!("[{}] malformed frame: {}", peer, e);
                }
                writer.write_error_header(ERR_INVALID_JSON).await?;
                continue;
            }
            Err(FrameError::FrameTooLarge) => {
                // The rest of the oversized line is still in flight;
                // resynchronizing is not worth it
                writer.write_error_header(ERR_REQUEST_TOO_LARGE).await?;
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if config.debug {
            eprintln!("[{}] command: {:?}", peer, command);
        }

        match command {
            Command::List { path } => {
                let response = build_listing(&config, &path);
                writer.write_list_response(&response).await?;
            }
            Command::Download { path } => {
                send_file(&mut writer, &config, &path).await?;
            }
        }
    }

    Ok(())
}

/// Resolve and list a directory, folding every failure into the
/// response so the connection survives it
fn build_listing(config: &ServerConfig, logical: &str) -> ListResponse {
    let resolved = match resolve(&config.root, logical) {
        Ok(resolved) => resolved,
        Err(e) => {
            return ListResponse::Error {
                error: error_text_for_list(&e),
            };
        }
    };

    match list_directory(&resolved) {
        Ok(entries) => ListResponse::Listing {
            listing: to_wire(&entries),
        },
        Err(ListError::NotFound) => ListResponse::Error {
            error: "Path not found".to_string(),
        },
        Err(ListError::PermissionDenied) => ListResponse::Error {
            error: "Permission denied".to_string(),
        },
    }
}

fn error_text_for_list(error: &crate::paths::PathError) -> String {
    match error {
        crate::paths::PathError::InvalidPath => "Invalid path".to_string(),
        _ => "Access denied".to_string(),
    }
}

/// Serve one download: resolve, require a regular file, emit the size
/// header, then stream exactly that many body bytes.
///
/// Failures before the header become an `ERROR:` header and the
/// connection stays usable. A failure after the header is fatal to the
/// connection: the peer is owed bytes this handler can no longer
/// deliver.
async fn send_file<W>(
    writer: &mut FrameWriter<W>,
    config: &ServerConfig,
    logical: &str,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let Ok(resolved) = resolve(&config.root, logical) else {
        writer.write_error_header(ERR_FILE_UNAVAILABLE).await?;
        return Ok(());
    };

    let metadata = match tokio::fs::metadata(resolved.as_path()).await {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => {
            writer.write_error_header(ERR_FILE_UNAVAILABLE).await?;
            return Ok(());
        }
    };

    let file = match File::open(resolved.as_path()).await {
        Ok(file) => file,
        Err(e) => {
            if config.debug {
                eprintln!("open {} failed: {}", resolved.as_path().display(), e);
            }
            writer.write_error_header(ERR_FILE_UNAVAILABLE).await?;
            return Ok(());
        }
    };

    let size = metadata.len();
    writer.write_size_header(size).await?;

    let mut source = tokio::io::BufReader::with_capacity(BUFFER_SIZE, file);
    writer.stream_body(&mut source, size).await?;
    Ok(())
}
