//! Directory listing for the shared root
//!
//! Produces the immediate children of a resolved directory, sorted by
//! name, with exact byte sizes for files. Wire conversion (trailing
//! slash on directory names, human-formatted sizes) happens separately
//! so the exact sizes stay available internally.

use std::fs;
use std::io;

use ferry_common::format::human_size;
use ferry_common::protocol::WireEntry;

use crate::paths::ResolvedPath;

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Entry name without any directory suffix
    pub name: String,
    /// Exact byte size; `None` for directories (size is undefined, not zero)
    pub size: Option<u64>,
    pub is_dir: bool,
}

/// Error type for listing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// The resolved path does not denote a directory
    NotFound,
    /// The OS refused to read the directory
    PermissionDenied,
}

impl std::fmt::Display for ListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "path not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl std::error::Error for ListError {}

/// List the immediate children of a resolved directory.
///
/// Entries are sorted lexicographically by name. Metadata is taken
/// through symlinks, so a symlinked directory classifies as a directory.
/// Entries with non-UTF-8 names or unreadable metadata are skipped.
///
/// # Errors
///
/// - [`ListError::NotFound`] if the path is not a directory
/// - [`ListError::PermissionDenied`] if the directory cannot be read
pub fn list_directory(path: &ResolvedPath) -> Result<Vec<ListingEntry>, ListError> {
    if !path.as_path().is_dir() {
        return Err(ListError::NotFound);
    }

    let read_dir = fs::read_dir(path.as_path()).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            ListError::PermissionDenied
        } else {
            ListError::NotFound
        }
    })?;

    let mut entries = Vec::new();
    for entry in read_dir.flatten() {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        // metadata() follows symlinks, matching how the entry behaves
        // when listed or downloaded
        let Ok(metadata) = entry.path().metadata() else {
            continue;
        };

        if metadata.is_dir() {
            entries.push(ListingEntry {
                name,
                size: None,
                is_dir: true,
            });
        } else {
            entries.push(ListingEntry {
                name,
                size: Some(metadata.len()),
                is_dir: false,
            });
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Convert internal listing entries to their wire representation
#[must_use]
pub fn to_wire(entries: &[ListingEntry]) -> Vec<WireEntry> {
    entries
        .iter()
        .map(|entry| {
            if entry.is_dir {
                WireEntry {
                    name: format!("{}/", entry.name),
                    size: String::new(),
                    is_dir: true,
                }
            } else {
                WireEntry {
                    name: entry.name.clone(),
                    size: human_size(entry.size.unwrap_or(0)),
                    is_dir: false,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::resolve;
    use tempfile::TempDir;

    fn resolved(dir: &TempDir, logical: &str) -> ResolvedPath {
        let root = dir.path().canonicalize().unwrap();
        resolve(&root, logical).unwrap()
    }

    #[test]
    fn test_list_sorted_with_sizes() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"0123456789").unwrap();
        std::fs::write(dir.path().join("a.bin"), b"xyz").unwrap();

        let entries = list_directory(&resolved(&dir, "/")).unwrap();
        assert_eq!(
            entries,
            vec![
                ListingEntry {
                    name: "a.bin".to_string(),
                    size: Some(3),
                    is_dir: false,
                },
                ListingEntry {
                    name: "docs".to_string(),
                    size: None,
                    is_dir: true,
                },
                ListingEntry {
                    name: "readme.txt".to_string(),
                    size: Some(10),
                    is_dir: false,
                },
            ]
        );
    }

    #[test]
    fn test_list_empty_directory() {
        let dir = TempDir::new().unwrap();
        let entries = list_directory(&resolved(&dir, "/")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_list_of_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("f.txt"), b"x").unwrap();

        let result = list_directory(&resolved(&dir, "/f.txt"));
        assert_eq!(result, Err(ListError::NotFound));
    }

    #[test]
    fn test_list_of_missing_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = list_directory(&resolved(&dir, "/nope"));
        assert_eq!(result, Err(ListError::NotFound));
    }

    #[test]
    fn test_to_wire_marks_directories() {
        let entries = vec![
            ListingEntry {
                name: "docs".to_string(),
                size: None,
                is_dir: true,
            },
            ListingEntry {
                name: "readme.txt".to_string(),
                size: Some(10),
                is_dir: false,
            },
        ];

        let wire = to_wire(&entries);
        assert_eq!(wire[0].name, "docs/");
        assert_eq!(wire[0].size, "");
        assert!(wire[0].is_dir);
        assert_eq!(wire[1].name, "readme.txt");
        assert_eq!(wire[1].size, "10.0 B");
        assert!(!wire[1].is_dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_classifies_as_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let entries = list_directory(&resolved(&dir, "/")).unwrap();
        let link = entries.iter().find(|e| e.name == "link").unwrap();
        assert!(link.is_dir);
        assert_eq!(link.size, None);
    }
}
