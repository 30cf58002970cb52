//! Logical path validation
//!
//! Validates the raw path string of an incoming command before the
//! server attempts to resolve it against the shared root.

/// Maximum length for logical paths in bytes
pub const MAX_PATH_LENGTH: usize = 4096;

/// Validation error for logical paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSyntaxError {
    /// Path exceeds maximum length
    TooLong,
    /// Path contains null bytes
    ContainsNull,
    /// Path contains control characters
    InvalidCharacters,
}

/// Validate a logical path from the client
///
/// Checks:
/// - Does not exceed maximum length (4096 bytes)
/// - No null bytes
/// - No control characters
///
/// Note: This validator does NOT check for path traversal (../) as that
/// is handled by the server's resolver, which confines the normalized
/// path to the shared root.
///
/// # Errors
///
/// Returns a `PathSyntaxError` variant describing the validation failure.
pub fn validate_logical_path(path: &str) -> Result<(), PathSyntaxError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(PathSyntaxError::TooLong);
    }

    for ch in path.chars() {
        if ch == '\0' {
            return Err(PathSyntaxError::ContainsNull);
        }
        if ch.is_control() {
            return Err(PathSyntaxError::InvalidCharacters);
        }
    }

    Ok(())
}
