//! Ferry File Client

mod args;
mod download;
mod list;
mod registry;
mod session;

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::sync::watch;

use ferry_common::format::{human_eta, human_size, human_speed};

use args::{Args, CliCommand};
use download::{DownloadError, execute_download};
use list::fetch_listing;
use registry::{SessionHandle, SessionRegistry};
use session::Progress;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let exit_code = match &args.command {
        CliCommand::List { path } => run_list(&args, path).await,
        CliCommand::Get { remote, local } => run_get(&args, remote, local.clone()).await,
    };
    std::process::exit(exit_code);
}

async fn run_list(args: &Args, path: &str) -> i32 {
    match fetch_listing(&args.host, args.port, path).await {
        Ok(listing) => {
            for entry in listing {
                println!("{:<48} {:>12}", entry.name, entry.size);
            }
            0
        }
        Err(e) => {
            eprintln!("List failed: {}", e);
            1
        }
    }
}

async fn run_get(args: &Args, remote: &str, local: Option<PathBuf>) -> i32 {
    let destination = local.unwrap_or_else(|| default_destination(remote));
    if args.debug {
        eprintln!(
            "Downloading {} from {}:{} to {}",
            remote,
            args.host,
            args.port,
            destination.display()
        );
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let (progress_tx, progress_rx) = watch::channel(Progress::default());

    let registry = Arc::new(Mutex::new(SessionRegistry::new()));
    let handle = SessionHandle::new(cancel.clone(), progress_rx.clone());
    registry
        .lock()
        .expect("session registry lock")
        .insert(remote, handle)
        .expect("fresh registry cannot hold this path");

    // Ctrl-c requests cooperative cancellation through the registry; the
    // session notices at its next chunk boundary
    let ctrl_c_registry = registry.clone();
    let ctrl_c_path = remote.to_string();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling...");
            ctrl_c_registry
                .lock()
                .expect("session registry lock")
                .cancel(&ctrl_c_path);
        }
    });

    let renderer = tokio::spawn(render_progress(progress_rx));

    let result = execute_download(
        &args.host,
        args.port,
        remote,
        &destination,
        cancel,
        progress_tx,
    )
    .await;

    registry
        .lock()
        .expect("session registry lock")
        .remove(remote);
    let _ = renderer.await;

    match result {
        Ok(session) => {
            println!(
                "\nDownloaded {} ({}) in {:.1}s",
                destination.display(),
                human_size(session.total_bytes),
                session.elapsed_seconds()
            );
            0
        }
        Err(DownloadError::Cancelled) => {
            eprintln!("Download cancelled");
            1
        }
        Err(e) => {
            eprintln!("\nDownload failed: {}", e);
            1
        }
    }
}

/// Redraw the progress line whenever a new snapshot is published
async fn render_progress(mut progress_rx: watch::Receiver<Progress>) {
    while progress_rx.changed().await.is_ok() {
        let progress = *progress_rx.borrow_and_update();
        print!(
            "\r{:5.1}% {:>10} of {:>10} {:>12} ETA {}",
            progress.percent(),
            human_size(progress.bytes),
            human_size(progress.total),
            human_speed(progress.speed()),
            human_eta(progress.eta_seconds()),
        );
        let _ = std::io::stdout().flush();
    }
}

/// Derive a local file name from the remote path
fn default_destination(remote: &str) -> PathBuf {
    remote
        .rsplit('/')
        .find(|part| !part.is_empty())
        .map_or_else(|| PathBuf::from("download"), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_destination_uses_file_name() {
        assert_eq!(
            default_destination("/docs/readme.txt"),
            PathBuf::from("readme.txt")
        );
        assert_eq!(default_destination("plain.bin"), PathBuf::from("plain.bin"));
    }

    #[test]
    fn test_default_destination_falls_back() {
        assert_eq!(default_destination("/"), PathBuf::from("download"));
        assert_eq!(default_destination(""), PathBuf::from("download"));
    }
}
