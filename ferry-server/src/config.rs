//! Server configuration
//!
//! Built once at startup from the parsed arguments and passed to the
//! components that need it; nothing reads configuration from ambient
//! global state.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::args::Args;

/// Runtime configuration for the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Canonical absolute path of the shared root directory
    pub root: PathBuf,
    /// Address to bind the listener to
    pub bind: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Maximum simultaneous connections (0 = unlimited)
    pub max_connections: usize,
    /// Verbose diagnostics to stderr
    pub debug: bool,
}

impl ServerConfig {
    /// Build a configuration from parsed arguments.
    ///
    /// Canonicalizes the shared root so the path resolver can rely on an
    /// absolute, symlink-free base for its containment check.
    ///
    /// # Errors
    ///
    /// Fails if the root does not exist, cannot be canonicalized, or is
    /// not a directory.
    pub fn from_args(args: Args) -> io::Result<Self> {
        let root = args.root.canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }

        Ok(Self {
            root,
            bind: args.bind,
            port: args.port,
            max_connections: args.max_connections,
            debug: args.debug,
        })
    }

    /// The socket address the listener binds to
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args_for(root: PathBuf) -> Args {
        Args {
            bind: "127.0.0.1".parse().unwrap(),
            port: 2290,
            root,
            max_connections: 8,
            debug: false,
        }
    }

    #[test]
    fn test_from_args_canonicalizes_root() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig::from_args(args_for(dir.path().to_path_buf())).unwrap();

        assert!(config.root.is_absolute());
        assert_eq!(config.root, dir.path().canonicalize().unwrap());
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn test_from_args_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(ServerConfig::from_args(args_for(missing)).is_err());
    }

    #[test]
    fn test_from_args_rejects_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(ServerConfig::from_args(args_for(file)).is_err());
    }

    #[test]
    fn test_listen_addr() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig::from_args(args_for(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:2290");
    }
}
