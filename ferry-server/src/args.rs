//! Command-line argument parsing

use clap::Parser;
use ferry_common::DEFAULT_PORT;
use std::net::IpAddr;
use std::path::PathBuf;

/// Ferry File Server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IP address to bind to (IPv4 or IPv6)
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory to share (everything under it becomes browsable)
    #[arg(short, long)]
    pub root: PathBuf,

    /// Maximum simultaneous connections (0 = unlimited)
    #[arg(long, default_value_t = 32)]
    pub max_connections: usize,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,
}
