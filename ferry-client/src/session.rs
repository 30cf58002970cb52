//! Transfer session types
//!
//! A session tracks one download from the moment the command is issued
//! until it reaches a terminal state. The session is owned and mutated
//! by its own receive loop only; presentation reads snapshots published
//! through a watch channel.

use std::path::PathBuf;
use std::time::{Duration, Instant};

// =============================================================================
// Session Status
// =============================================================================

/// Current status of a download session
///
/// Transitions: `Connecting → AwaitingHeader → Transferring` and from
/// there to exactly one of the terminal states. Terminal states are
/// final; the mutators below refuse to leave them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Establishing the connection and issuing the command
    Connecting,
    /// Command sent; waiting for the `SIZE:`/`ERROR:` header
    AwaitingHeader,
    /// Receiving body bytes
    Transferring,
    /// All declared bytes received and the destination renamed into place
    Completed,
    /// Cancelled by the caller; partial output removed
    Cancelled,
    /// Header error, short body, or local I/O failure; partial output removed
    Failed,
}

impl SessionStatus {
    /// Returns true if the session is still running
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionStatus::Connecting | SessionStatus::AwaitingHeader | SessionStatus::Transferring
        )
    }

    /// Returns true if the session reached a final state
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

// =============================================================================
// Progress Snapshot
// =============================================================================

/// Point-in-time progress of a session, published latest-value-wins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Bytes received so far
    pub bytes: u64,
    /// Total bytes declared by the header (0 until the header arrives)
    pub total: u64,
    /// Time since the session started
    pub elapsed: Duration,
}

impl Progress {
    /// Bytes per second since the session started (0 if no time elapsed)
    #[must_use]
    pub fn speed(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs
    }

    /// Estimated seconds remaining; `None` when the speed is unknown
    #[must_use]
    pub fn eta_seconds(&self) -> Option<f64> {
        let speed = self.speed();
        if speed <= 0.0 {
            return None;
        }
        Some((self.total.saturating_sub(self.bytes)) as f64 / speed)
    }

    /// Progress as a percentage (0.0 to 100.0)
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.bytes as f64 / self.total as f64 * 100.0
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            bytes: 0,
            total: 0,
            elapsed: Duration::ZERO,
        }
    }
}

// =============================================================================
// Transfer Session
// =============================================================================

/// One in-progress or finished download
#[derive(Debug, Clone, PartialEq)]
pub struct TransferSession {
    /// Path on the server (e.g., "/Games/app.zip")
    pub remote_path: String,
    /// Local file path the download lands at
    pub destination: PathBuf,
    /// Total size in bytes; fixed once the header arrives
    pub total_bytes: u64,
    /// Bytes received so far; monotone, never exceeds `total_bytes`
    pub transferred_bytes: u64,
    /// When the session was created
    pub started_at: Instant,
    /// Current status
    pub status: SessionStatus,
    /// Error message if status is Failed
    pub error: Option<String>,
}

impl TransferSession {
    /// Create a new session in the Connecting state
    pub fn new(remote_path: String, destination: PathBuf) -> Self {
        Self {
            remote_path,
            destination,
            total_bytes: 0,
            transferred_bytes: 0,
            started_at: Instant::now(),
            status: SessionStatus::Connecting,
            error: None,
        }
    }

    /// The command was sent; the header is outstanding
    pub fn await_header(&mut self) {
        if self.status == SessionStatus::Connecting {
            self.status = SessionStatus::AwaitingHeader;
        }
    }

    /// A size header arrived; fix the total and begin transferring
    pub fn start_transfer(&mut self, total_bytes: u64) {
        if self.status == SessionStatus::AwaitingHeader {
            self.total_bytes = total_bytes;
            self.status = SessionStatus::Transferring;
        }
    }

    /// Record received bytes, clamped to the declared total
    pub fn advance(&mut self, bytes: u64) {
        if self.status == SessionStatus::Transferring {
            self.transferred_bytes =
                (self.transferred_bytes.saturating_add(bytes)).min(self.total_bytes);
        }
    }

    /// Mark the session completed
    pub fn complete(&mut self) {
        if self.status.is_active() {
            self.status = SessionStatus::Completed;
        }
    }

    /// Mark the session cancelled
    pub fn cancel(&mut self) {
        if self.status.is_active() {
            self.status = SessionStatus::Cancelled;
        }
    }

    /// Mark the session failed with an error message
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_active() {
            self.status = SessionStatus::Failed;
            self.error = Some(error.into());
        }
    }

    /// Current progress snapshot
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            bytes: self.transferred_bytes,
            total: self.total_bytes,
            elapsed: self.started_at.elapsed(),
        }
    }

    /// Seconds since the session started
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
