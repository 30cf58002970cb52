//! Ferry File Server

mod args;
mod config;
mod connection;
mod listing;
mod paths;
mod tracker;

use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use args::Args;
use config::ServerConfig;
use connection::handle_connection;
use tracker::ConnectionTracker;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match ServerConfig::from_args(args) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("Ferry server v{}", env!("CARGO_PKG_VERSION"));
    println!("Serving directory: {}", config.root.display());

    let listener = match TcpListener::bind(config.listen_addr()).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", config.listen_addr(), e);
            std::process::exit(1);
        }
    };
    println!("Listening on {}", config.listen_addr());

    let listener_tracker = Arc::new(ConnectionTracker::new(config.max_connections));

    tokio::select! {
        () = accept_loop(listener, listener_tracker, config) => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Shutting down");
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    listener_tracker: Arc<ConnectionTracker>,
    config: Arc<ServerConfig>,
) {
    loop {
        let (socket, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                eprintln!("Accept failed: {}", e);
                continue;
            }
        };

        let Some(guard) = listener_tracker.try_acquire() else {
            if config.debug {
                eprintln!("[{}] refused: at connection capacity", peer_addr);
            }
            let mut socket = socket;
            let _ = socket.shutdown().await;
            continue;
        };

        if config.debug {
            eprintln!("[{}] connected", peer_addr);
        }

        let config = config.clone();
        tokio::spawn(async move {
            // Guard moved into the task so the slot frees on any exit path
            let _guard = guard;
            serve_connection(socket, config, peer_addr.to_string()).await;
        });
    }
}

async fn serve_connection(socket: TcpStream, config: Arc<ServerConfig>, peer: String) {
    let debug = config.debug;
    let (read_half, write_half) = socket.into_split();

    if let Err(e) = handle_connection(read_half, write_half, config, &peer).await
        && debug
    {
        eprintln!("[{}] connection error: {}", peer, e);
    }

    if debug {
        eprintln!("[{}] disconnected", peer);
    }
}
