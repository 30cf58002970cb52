//! Active download tracking
//!
//! The registry tracks in-flight downloads keyed by remote path so
//! presentation code can look up progress and request cancellation
//! without holding the session itself. Each entry holds the session's
//! cancel flag and the receiving end of its progress channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::session::Progress;

/// Handle to a running download
#[derive(Debug, Clone)]
pub struct SessionHandle {
    cancel: Arc<AtomicBool>,
    progress: watch::Receiver<Progress>,
}

impl SessionHandle {
    /// Create a handle from a session's cancel flag and progress receiver
    pub fn new(cancel: Arc<AtomicBool>, progress: watch::Receiver<Progress>) -> Self {
        Self { cancel, progress }
    }

    /// Request cooperative cancellation; the session observes the flag
    /// at its next loop iteration
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Latest published progress snapshot
    #[must_use]
    pub fn latest_progress(&self) -> Progress {
        *self.progress.borrow()
    }

    /// A receiver for awaiting progress changes
    #[must_use]
    pub fn progress_receiver(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }
}

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A download of this remote path is already active
    AlreadyActive,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyActive => write!(f, "download already active for this path"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Active downloads keyed by remote path
#[derive(Debug, Default)]
pub struct SessionRegistry {
    active: HashMap<String, SessionHandle>,
}

impl SessionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a starting download.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::AlreadyActive`] if a download of the
    /// same remote path is already registered.
    pub fn insert(&mut self, remote_path: &str, handle: SessionHandle) -> Result<(), RegistryError> {
        if self.active.contains_key(remote_path) {
            return Err(RegistryError::AlreadyActive);
        }
        self.active.insert(remote_path.to_string(), handle);
        Ok(())
    }

    /// Request cancellation of the download for `remote_path`.
    ///
    /// Returns true if a matching active download was found.
    pub fn cancel(&self, remote_path: &str) -> bool {
        match self.active.get(remote_path) {
            Some(handle) => {
                handle.request_cancel();
                true
            }
            None => false,
        }
    }

    /// Remove a finished download, returning its handle
    pub fn remove(&mut self, remote_path: &str) -> Option<SessionHandle> {
        self.active.remove(remote_path)
    }

    /// Look up the handle for an active download
    #[must_use]
    pub fn get(&self, remote_path: &str) -> Option<&SessionHandle> {
        self.active.get(remote_path)
    }

    /// Number of active downloads
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no downloads are active
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
