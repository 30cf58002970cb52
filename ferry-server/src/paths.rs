//! Safe path resolution for the shared root
//!
//! Maps client-supplied logical paths onto real filesystem paths confined
//! to the configured root. Resolution is purely lexical: it normalizes
//! the logical path and proves containment without touching the
//! filesystem, so it can be called before any metadata lookup.

use std::io;
use std::path::{Component, Path, PathBuf};

use ferry_common::validate::validate_logical_path;

/// A filesystem path proven to lie within the shared root.
///
/// Only [`resolve`] constructs these; holding one is the evidence that
/// the containment check passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    /// The underlying absolute path
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

/// Error type for path resolution failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The shared root is not an absolute path
    InvalidRoot,
    /// Path contains null bytes, control characters, or is too long
    InvalidPath,
    /// Path escapes the shared root
    AccessDenied,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoot => write!(f, "shared root is not absolute"),
            Self::InvalidPath => write!(f, "invalid path"),
            Self::AccessDenied => write!(f, "access denied"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for io::Error {
    fn from(e: PathError) -> Self {
        match e {
            PathError::InvalidRoot | PathError::InvalidPath => {
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
            }
            PathError::AccessDenied => {
                io::Error::new(io::ErrorKind::PermissionDenied, e.to_string())
            }
        }
    }
}

/// Resolve a logical path against the shared root.
///
/// The logical path is forward-slash separated and interpreted relative
/// to the root; a leading `/` denotes the root itself. Normalization
/// collapses `.` segments and applies `..` segments component-wise. Any
/// attempt to step above the root, and any prefix or absolute component
/// smuggled mid-path, is refused.
///
/// The final containment check is component-wise (`Path::starts_with`),
/// so a sibling directory sharing a name prefix with the root cannot be
/// misclassified as inside it.
///
/// # Arguments
///
/// * `root` - The shared root directory. Must be absolute and canonical
///   (e.g., from `fs::canonicalize()`); the caller owns that guarantee.
/// * `logical` - The client-supplied logical path
///
/// # Errors
///
/// - [`PathError::InvalidRoot`] if `root` is not absolute
/// - [`PathError::InvalidPath`] if the string fails syntax validation
/// - [`PathError::AccessDenied`] on any escape attempt
pub fn resolve(root: &Path, logical: &str) -> Result<ResolvedPath, PathError> {
    if !root.is_absolute() {
        return Err(PathError::InvalidRoot);
    }

    validate_logical_path(logical).map_err(|_| PathError::InvalidPath)?;

    // A leading slash means "relative to the root", not the filesystem root
    let relative = logical.trim_start_matches('/');

    let mut kept: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => kept.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if kept.pop().is_none() {
                    return Err(PathError::AccessDenied);
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::AccessDenied);
            }
        }
    }

    let mut resolved = root.to_path_buf();
    for part in kept {
        resolved.push(part);
    }

    if !resolved.starts_with(root) {
        return Err(PathError::AccessDenied);
    }

    Ok(ResolvedPath(resolved))
}
