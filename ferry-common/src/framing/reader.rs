//! Frame reading over buffered async streams

use tokio::io::{AsyncBufRead, AsyncReadExt};

use crate::MAX_FRAME_LENGTH;
use crate::framing::FrameError;
use crate::protocol::{Command, DownloadHeader, ListResponse};

/// Reads newline-delimited frames from a buffered stream.
///
/// After a `SIZE:` header has been consumed, the raw body bytes must be
/// read through [`get_mut`](Self::get_mut) so they pass through the same
/// buffer the header was read from.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
}

impl<R> FrameReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Create a new frame reader wrapping the given buffered stream
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Get a reference to the underlying reader
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader
    ///
    /// Used to stream a download body after its header has been read.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume the frame reader, returning the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read one command frame.
    ///
    /// Returns `Ok(None)` if the stream ends cleanly before any byte of a
    /// new frame arrives; the peer is done issuing commands.
    ///
    /// # Errors
    ///
    /// - [`FrameError::ConnectionClosed`] if the stream ends mid-line
    /// - [`FrameError::MalformedFrame`] if the line is not a valid command
    /// - [`FrameError::FrameTooLarge`] if the line exceeds the frame limit
    pub async fn read_command(&mut self) -> Result<Option<Command>, FrameError> {
        let Some(line) = self.read_line_allow_eof().await? else {
            return Ok(None);
        };
        let command = serde_json::from_str(line.trim())
            .map_err(|e| FrameError::MalformedFrame(e.to_string()))?;
        Ok(Some(command))
    }

    /// Read one list response frame.
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::ConnectionClosed`] if the stream ends
    /// before a full line arrives, or [`FrameError::MalformedFrame`] if
    /// the line is not a valid list response.
    pub async fn read_list_response(&mut self) -> Result<ListResponse, FrameError> {
        let line = self.read_line().await?;
        serde_json::from_str(line.trim()).map_err(|e| FrameError::MalformedFrame(e.to_string()))
    }

    /// Read and parse the header line of a download response.
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::ConnectionClosed`] if the stream ends
    /// before a full line arrives, or [`FrameError::MalformedHeader`] if
    /// the line is neither a `SIZE:` nor an `ERROR:` header.
    pub async fn read_download_header(&mut self) -> Result<DownloadHeader, FrameError> {
        let line = self.read_line().await?;
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("SIZE:") {
            let length = rest
                .trim()
                .parse::<u64>()
                .map_err(|_| FrameError::MalformedHeader(line.to_string()))?;
            return Ok(DownloadHeader::Size(length));
        }
        if let Some(rest) = line.strip_prefix("ERROR:") {
            return Ok(DownloadHeader::Error(rest.trim_start().to_string()));
        }
        Err(FrameError::MalformedHeader(line.to_string()))
    }

    /// Read one line, requiring at least one byte to be present
    async fn read_line(&mut self) -> Result<String, FrameError> {
        self.read_line_allow_eof()
            .await?
            .ok_or(FrameError::ConnectionClosed)
    }

    /// Read bytes up to and excluding a newline.
    ///
    /// Returns `Ok(None)` only when the stream ends before the first
    /// byte. An end of stream after that point is an error: the line was
    /// cut off.
    async fn read_line_allow_eof(&mut self) -> Result<Option<String>, FrameError> {
        let Some(first) = self.read_byte_allow_eof().await? else {
            return Ok(None);
        };

        let mut line = Vec::with_capacity(256);
        let mut byte = first;
        loop {
            if byte == b'\n' {
                break;
            }
            if line.len() >= MAX_FRAME_LENGTH {
                return Err(FrameError::FrameTooLarge);
            }
            line.push(byte);

            let mut buf = [0u8; 1];
            match self.reader.read(&mut buf).await {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(_) => byte = buf[0],
                Err(e) => return Err(FrameError::Io(e.to_string())),
            }
        }

        String::from_utf8(line)
            .map(Some)
            .map_err(|e| FrameError::MalformedFrame(e.to_string()))
    }

    /// Read a single byte, treating end of stream as `Ok(None)`
    async fn read_byte_allow_eof(&mut self) -> Result<Option<u8>, FrameError> {
        let mut buf = [0u8; 1];
        match self.reader.read(&mut buf).await {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(FrameError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::WireEntry;
    use std::io::Cursor;
    use tokio::io::{AsyncWriteExt, BufReader, duplex};

    // =========================================================================
    // Command frames
    // =========================================================================

    #[tokio::test]
    async fn test_read_command() {
        let data = b"{\"type\":\"LIST\",\"path\":\"/docs/\"}\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let command = reader.read_command().await.unwrap().unwrap();
        assert_eq!(
            command,
            Command::List {
                path: "/docs/".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_read_command_clean_eof_returns_none() {
        let mut reader = FrameReader::new(Cursor::new(&b""[..]));
        assert!(reader.read_command().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_command_truncated_line_is_connection_closed() {
        let data = b"{\"type\":\"LIST\"";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let result = reader.read_command().await;
        assert_eq!(result, Err(FrameError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_read_command_invalid_json_is_malformed() {
        let data = b"not json at all\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let result = reader.read_command().await;
        assert!(matches!(result, Err(FrameError::MalformedFrame(_))));
    }

    #[tokio::test]
    async fn test_read_command_missing_path_is_malformed() {
        let data = b"{\"type\":\"DOWNLOAD\"}\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let result = reader.read_command().await;
        assert!(matches!(result, Err(FrameError::MalformedFrame(_))));
    }

    #[tokio::test]
    async fn test_read_sequential_commands() {
        let data = b"{\"type\":\"LIST\",\"path\":\"/\"}\n{\"type\":\"DOWNLOAD\",\"path\":\"/a.txt\"}\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let first = reader.read_command().await.unwrap().unwrap();
        assert_eq!(
            first,
            Command::List {
                path: "/".to_string()
            }
        );
        let second = reader.read_command().await.unwrap().unwrap();
        assert_eq!(
            second,
            Command::Download {
                path: "/a.txt".to_string()
            }
        );
        assert!(reader.read_command().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_command_after_malformed_line() {
        let data = b"garbage\n{\"type\":\"LIST\",\"path\":\"/\"}\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        assert!(matches!(
            reader.read_command().await,
            Err(FrameError::MalformedFrame(_))
        ));
        let command = reader.read_command().await.unwrap().unwrap();
        assert_eq!(
            command,
            Command::List {
                path: "/".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_oversize_line_is_rejected() {
        let mut data = vec![b'x'; MAX_FRAME_LENGTH + 16];
        data.push(b'\n');
        let mut reader = FrameReader::new(Cursor::new(data));

        let result = reader.read_command().await;
        assert_eq!(result, Err(FrameError::FrameTooLarge));
    }

    // =========================================================================
    // List responses
    // =========================================================================

    #[tokio::test]
    async fn test_read_list_response() {
        let data =
            b"{\"listing\":[{\"name\":\"docs/\",\"size\":\"\",\"is_dir\":true}]}\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let response = reader.read_list_response().await.unwrap();
        assert_eq!(
            response,
            ListResponse::Listing {
                listing: vec![WireEntry {
                    name: "docs/".to_string(),
                    size: String::new(),
                    is_dir: true,
                }]
            }
        );
    }

    #[tokio::test]
    async fn test_read_list_response_error_variant() {
        let data = b"{\"error\":\"Access denied\"}\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let response = reader.read_list_response().await.unwrap();
        assert_eq!(
            response,
            ListResponse::Error {
                error: "Access denied".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_read_list_response_eof_is_connection_closed() {
        let mut reader = FrameReader::new(Cursor::new(&b""[..]));
        assert_eq!(
            reader.read_list_response().await,
            Err(FrameError::ConnectionClosed)
        );
    }

    // =========================================================================
    // Download headers
    // =========================================================================

    #[tokio::test]
    async fn test_read_size_header() {
        let data = b"SIZE:12345\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let header = reader.read_download_header().await.unwrap();
        assert_eq!(header, DownloadHeader::Size(12345));
    }

    #[tokio::test]
    async fn test_read_size_header_zero() {
        let data = b"SIZE:0\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let header = reader.read_download_header().await.unwrap();
        assert_eq!(header, DownloadHeader::Size(0));
    }

    #[tokio::test]
    async fn test_read_error_header() {
        let data = b"ERROR: File not found or access denied\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let header = reader.read_download_header().await.unwrap();
        assert_eq!(
            header,
            DownloadHeader::Error("File not found or access denied".to_string())
        );
    }

    #[tokio::test]
    async fn test_read_header_rejects_junk_line() {
        let data = b"HELLO WORLD\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let result = reader.read_download_header().await;
        assert!(matches!(result, Err(FrameError::MalformedHeader(_))));
    }

    #[tokio::test]
    async fn test_read_header_rejects_non_numeric_size() {
        let data = b"SIZE:abc\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let result = reader.read_download_header().await;
        assert!(matches!(result, Err(FrameError::MalformedHeader(_))));
    }

    #[tokio::test]
    async fn test_read_header_rejects_negative_size() {
        let data = b"SIZE:-5\n";
        let mut reader = FrameReader::new(Cursor::new(&data[..]));

        let result = reader.read_download_header().await;
        assert!(matches!(result, Err(FrameError::MalformedHeader(_))));
    }

    // =========================================================================
    // Body bytes after a header
    // =========================================================================

    #[tokio::test]
    async fn test_body_bytes_follow_header_through_buffer() {
        let data = b"SIZE:5\nhello";
        let mut reader = FrameReader::new(BufReader::new(Cursor::new(&data[..])));

        let header = reader.read_download_header().await.unwrap();
        assert_eq!(header, DownloadHeader::Size(5));

        let mut body = [0u8; 5];
        reader.get_mut().read_exact(&mut body).await.unwrap();
        assert_eq!(&body, b"hello");
    }

    #[tokio::test]
    async fn test_read_over_duplex() {
        let (client, mut server) = duplex(256);

        server
            .write_all(b"{\"type\":\"DOWNLOAD\",\"path\":\"/f.bin\"}\n")
            .await
            .unwrap();
        server.shutdown().await.unwrap();

        let mut reader = FrameReader::new(BufReader::new(client));
        let command = reader.read_command().await.unwrap().unwrap();
        assert_eq!(
            command,
            Command::Download {
                path: "/f.bin".to_string()
            }
        );
        assert!(reader.read_command().await.unwrap().is_none());
    }
}
