//! Ferry Common Library
//!
//! Shared protocol types, wire framing, and utilities for the Ferry
//! file transfer system.

pub mod format;
pub mod framing;
pub mod protocol;
pub mod validate;

/// Default port for Ferry connections
pub const DEFAULT_PORT: u16 = 229;

/// Chunk size for streaming file bodies (64KB)
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Maximum length of a single command or response line, in bytes.
///
/// Command frames and list responses are newline-delimited JSON; a line
/// longer than this is treated as malformed rather than buffered without
/// bound. Listings of very large directories stay well under this.
pub const MAX_FRAME_LENGTH: usize = 4 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_is_64k() {
        assert_eq!(BUFFER_SIZE, 65536);
    }

    #[test]
    fn test_max_frame_length_exceeds_buffer() {
        assert!(MAX_FRAME_LENGTH > BUFFER_SIZE);
    }
}
