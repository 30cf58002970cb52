//! Framing error type

use std::fmt;
use std::io;

/// Errors produced while reading or writing frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The peer closed the stream mid-frame or mid-body
    ConnectionClosed,
    /// A line exceeded the maximum frame length
    FrameTooLarge,
    /// A JSON frame could not be decoded
    MalformedFrame(String),
    /// A download header line was neither `SIZE:` nor `ERROR:`
    MalformedHeader(String),
    /// Fewer body bytes were available than the header declared
    ShortBody { expected: u64, actual: u64 },
    /// Underlying I/O failure
    Io(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::ConnectionClosed => write!(f, "connection closed"),
            FrameError::FrameTooLarge => write!(f, "frame exceeds maximum length"),
            FrameError::MalformedFrame(msg) => write!(f, "malformed frame: {}", msg),
            FrameError::MalformedHeader(line) => write!(f, "malformed download header: {}", line),
            FrameError::ShortBody { expected, actual } => {
                write!(f, "short body: expected {} bytes, got {}", expected, actual)
            }
            FrameError::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<io::Error> for FrameError {
    fn from(err: io::Error) -> Self {
        FrameError::Io(err.to_string())
    }
}

impl From<FrameError> for io::Error {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::ConnectionClosed => {
                io::Error::new(io::ErrorKind::ConnectionReset, "connection closed")
            }
            FrameError::Io(msg) => io::Error::other(msg),
            other => io::Error::other(other.to_string()),
        }
    }
}
