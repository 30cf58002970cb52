//! Frame writing over async streams

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::framing::FrameError;
use crate::protocol::{Command, ListResponse};

/// Writes newline-delimited frames and raw download bodies to a stream
#[derive(Debug)]
pub struct FrameWriter<W> {
    writer: W,
}

impl<W> FrameWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a new frame writer wrapping the given stream
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Get a reference to the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the frame writer, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write one command frame
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::Io`] if the stream write fails.
    pub async fn write_command(&mut self, command: &Command) -> Result<(), FrameError> {
        let payload =
            serde_json::to_vec(command).map_err(|e| FrameError::MalformedFrame(e.to_string()))?;
        self.write_line(&payload).await
    }

    /// Write one list response frame
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::Io`] if the stream write fails.
    pub async fn write_list_response(&mut self, response: &ListResponse) -> Result<(), FrameError> {
        let payload =
            serde_json::to_vec(response).map_err(|e| FrameError::MalformedFrame(e.to_string()))?;
        self.write_line(&payload).await
    }

    /// Write a `SIZE:` header announcing the body length that follows
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::Io`] if the stream write fails.
    pub async fn write_size_header(&mut self, length: u64) -> Result<(), FrameError> {
        self.write_line(format!("SIZE:{}", length).as_bytes()).await
    }

    /// Write an `ERROR:` header; no body follows
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::Io`] if the stream write fails.
    pub async fn write_error_header(&mut self, message: &str) -> Result<(), FrameError> {
        self.write_line(format!("ERROR: {}", message).as_bytes())
            .await
    }

    /// Stream exactly `length` raw body bytes from `source`.
    ///
    /// The caller must have written the matching `SIZE:` header first. No
    /// terminator is written after the body; the receiver counts bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::ShortBody`] if `source` ends before
    /// `length` bytes were copied, or [`FrameError::Io`] on a stream
    /// failure.
    pub async fn stream_body<R>(&mut self, source: &mut R, length: u64) -> Result<u64, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        let mut limited = source.take(length);
        let copied = tokio::io::copy(&mut limited, &mut self.writer)
            .await
            .map_err(|e| FrameError::Io(e.to_string()))?;

        if copied != length {
            return Err(FrameError::ShortBody {
                expected: length,
                actual: copied,
            });
        }

        self.writer
            .flush()
            .await
            .map_err(|e| FrameError::Io(e.to_string()))?;
        Ok(copied)
    }

    /// Flush the underlying stream
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::Io`] if the flush fails.
    pub async fn flush(&mut self) -> Result<(), FrameError> {
        self.writer
            .flush()
            .await
            .map_err(|e| FrameError::Io(e.to_string()))
    }

    async fn write_line(&mut self, payload: &[u8]) -> Result<(), FrameError> {
        self.writer
            .write_all(payload)
            .await
            .map_err(|e| FrameError::Io(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| FrameError::Io(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| FrameError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::FrameReader;
    use crate::protocol::{DownloadHeader, WireEntry};
    use std::io::Cursor;
    use tokio::io::{BufReader, duplex};

    #[tokio::test]
    async fn test_write_command() {
        let mut writer = FrameWriter::new(Vec::new());
        writer
            .write_command(&Command::List {
                path: "/docs/".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            writer.into_inner(),
            b"{\"type\":\"LIST\",\"path\":\"/docs/\"}\n"
        );
    }

    #[tokio::test]
    async fn test_write_list_response() {
        let mut writer = FrameWriter::new(Vec::new());
        writer
            .write_list_response(&ListResponse::Listing {
                listing: vec![WireEntry {
                    name: "readme.txt".to_string(),
                    size: "10.0 B".to_string(),
                    is_dir: false,
                }],
            })
            .await
            .unwrap();

        assert_eq!(
            writer.into_inner(),
            b"{\"listing\":[{\"name\":\"readme.txt\",\"size\":\"10.0 B\",\"is_dir\":false}]}\n"
        );
    }

    #[tokio::test]
    async fn test_write_size_header() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.write_size_header(42).await.unwrap();
        assert_eq!(writer.into_inner(), b"SIZE:42\n");
    }

    #[tokio::test]
    async fn test_write_error_header() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.write_error_header("Invalid JSON").await.unwrap();
        assert_eq!(writer.into_inner(), b"ERROR: Invalid JSON\n");
    }

    #[tokio::test]
    async fn test_stream_body_copies_exact_bytes() {
        let mut writer = FrameWriter::new(Vec::new());
        let mut source = Cursor::new(b"hello world".to_vec());

        let copied = writer.stream_body(&mut source, 11).await.unwrap();
        assert_eq!(copied, 11);
        assert_eq!(writer.into_inner(), b"hello world");
    }

    #[tokio::test]
    async fn test_stream_body_zero_length() {
        let mut writer = FrameWriter::new(Vec::new());
        let mut source = Cursor::new(Vec::new());

        let copied = writer.stream_body(&mut source, 0).await.unwrap();
        assert_eq!(copied, 0);
        assert!(writer.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_stream_body_short_source_fails() {
        let mut writer = FrameWriter::new(Vec::new());
        let mut source = Cursor::new(b"abc".to_vec());

        let result = writer.stream_body(&mut source, 10).await;
        assert_eq!(
            result,
            Err(FrameError::ShortBody {
                expected: 10,
                actual: 3
            })
        );
    }

    #[tokio::test]
    async fn test_stream_body_ignores_trailing_source_bytes() {
        let mut writer = FrameWriter::new(Vec::new());
        let mut source = Cursor::new(b"abcdef".to_vec());

        writer.stream_body(&mut source, 4).await.unwrap();
        assert_eq!(writer.into_inner(), b"abcd");
    }

    #[tokio::test]
    async fn test_download_round_trip_over_duplex() {
        let (client, server) = duplex(1024);

        let mut writer = FrameWriter::new(server);
        writer.write_size_header(5).await.unwrap();
        let mut source = Cursor::new(b"hello".to_vec());
        writer.stream_body(&mut source, 5).await.unwrap();

        let mut reader = FrameReader::new(BufReader::new(client));
        let header = reader.read_download_header().await.unwrap();
        assert_eq!(header, DownloadHeader::Size(5));

        let mut body = [0u8; 5];
        reader.get_mut().read_exact(&mut body).await.unwrap();
        assert_eq!(&body, b"hello");
    }
}
