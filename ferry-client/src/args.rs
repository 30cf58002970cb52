//! Command-line argument parsing

use clap::{Parser, Subcommand};
use ferry_common::DEFAULT_PORT;
use std::path::PathBuf;

/// Ferry File Client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server host name or address
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// List a remote directory
    List {
        /// Remote directory path
        #[arg(default_value = "/")]
        path: String,
    },
    /// Download a remote file
    Get {
        /// Remote file path
        remote: String,
        /// Local destination (defaults to the remote file name)
        local: Option<PathBuf>,
    },
}
