//! Protocol definitions for Ferry
//!
//! Commands and list responses are sent as newline-delimited JSON over a
//! plain TCP stream. A download response is a textual header line
//! (`SIZE:<length>` or `ERROR: <message>`) followed, for the success case,
//! by exactly `<length>` raw bytes of file content. Body completion is
//! determined by the declared byte count alone; no terminator follows the
//! body.

use serde::{Deserialize, Serialize};

/// Client request messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Request the listing of a directory
    #[serde(rename = "LIST")]
    List { path: String },
    /// Request the contents of a file
    #[serde(rename = "DOWNLOAD")]
    Download { path: String },
}

impl Command {
    /// The logical path this command targets
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Command::List { path } | Command::Download { path } => path,
        }
    }
}

/// One row of a directory listing as it appears on the wire
///
/// Directories carry a trailing `/` on their name and an empty size
/// string; files carry a human-formatted size (`"1.5 KiB"`). Exact byte
/// counts travel only in download `SIZE:` headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEntry {
    pub name: String,
    pub size: String,
    pub is_dir: bool,
}

/// Server response to a [`Command::List`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse {
    /// Sorted immediate children of the requested directory
    Listing { listing: Vec<WireEntry> },
    /// Short human-readable failure description
    Error { error: String },
}

/// Parsed header line of a download response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadHeader {
    /// Exact byte length of the body that follows
    Size(u64),
    /// Failure description; no body follows
    Error(String),
}
