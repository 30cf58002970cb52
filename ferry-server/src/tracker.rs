//! Connection admission tracking
//!
//! Bounds the number of simultaneously handled connections so a flood of
//! clients cannot exhaust server resources. Connections beyond the limit
//! are refused at accept time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Tracks the number of active connections against a limit
///
/// A limit of 0 means unlimited connections are allowed.
#[derive(Debug)]
pub struct ConnectionTracker {
    active: Arc<Mutex<usize>>,
    max_connections: AtomicUsize,
}

impl ConnectionTracker {
    /// Create a new tracker with the specified limit (0 = unlimited)
    #[must_use]
    pub fn new(max_connections: usize) -> Self {
        Self {
            active: Arc::new(Mutex::new(0)),
            max_connections: AtomicUsize::new(max_connections),
        }
    }

    /// Try to acquire a connection slot.
    ///
    /// Returns `Some(ConnectionGuard)` if the connection is admitted, or
    /// `None` if the server is at capacity. The guard releases the slot
    /// when dropped, even if the connection handler panics.
    pub fn try_acquire(&self) -> Option<ConnectionGuard> {
        let max = self.max_connections.load(Ordering::Relaxed);
        let mut active = self.active.lock().expect("connection tracker lock");

        // 0 means unlimited
        if max > 0 && *active >= max {
            return None;
        }

        *active += 1;
        Some(ConnectionGuard {
            active: self.active.clone(),
        })
    }

    /// Number of currently admitted connections
    #[must_use]
    pub fn active_count(&self) -> usize {
        *self.active.lock().expect("connection tracker lock")
    }
}

/// RAII guard that releases a connection slot when dropped
#[derive(Debug)]
pub struct ConnectionGuard {
    active: Arc<Mutex<usize>>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let mut active = self.active.lock().expect("connection tracker lock");
        *active = active.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_within_limit() {
        let tracker = ConnectionTracker::new(2);
        let g1 = tracker.try_acquire();
        let g2 = tracker.try_acquire();
        assert!(g1.is_some());
        assert!(g2.is_some());
        assert_eq!(tracker.active_count(), 2);
    }

    #[test]
    fn test_refuses_beyond_limit() {
        let tracker = ConnectionTracker::new(1);
        let _g1 = tracker.try_acquire().unwrap();
        assert!(tracker.try_acquire().is_none());
    }

    #[test]
    fn test_drop_releases_slot() {
        let tracker = ConnectionTracker::new(1);
        let guard = tracker.try_acquire().unwrap();
        drop(guard);
        assert_eq!(tracker.active_count(), 0);
        assert!(tracker.try_acquire().is_some());
    }

    #[test]
    fn test_zero_limit_is_unlimited() {
        let tracker = ConnectionTracker::new(0);
        let guards: Vec<_> = (0..100).map(|_| tracker.try_acquire().unwrap()).collect();
        assert_eq!(tracker.active_count(), 100);
        drop(guards);
        assert_eq!(tracker.active_count(), 0);
    }
}
