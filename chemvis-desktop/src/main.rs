//! chemvis-desktop - Terminal dashboard for a ChemVis server
//!
//! The dashboard is printed to stdout; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use chemvis_common::config::TomlConfig;
use chemvis_desktop::api::ApiClient;
use chemvis_desktop::commands::{Command, HELP};
use chemvis_desktop::config::{DesktopArgs, DesktopConfig};
use chemvis_desktop::dashboard::{render_history, ApplyOutcome, Dashboard};
use chemvis_desktop::poller::Poller;
use chemvis_desktop::report::{save_downloaded_report, write_local_report};
use chemvis_desktop::subscriber::{listen, RefreshTrigger};
use chemvis_desktop::upload::{upload_with_fallback, PreparedUpload, UploadOutcome};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chemvis_desktop=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = DesktopArgs::parse();
    let file_config = TomlConfig::load(args.config.as_deref());
    let config = DesktopConfig::resolve(args, &file_config);

    info!(
        "Starting ChemVis desktop v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.server_url
    );

    let client = Arc::new(ApiClient::new(&config).context("Failed to build HTTP client")?);

    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel();
    let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel::<RefreshTrigger>();
    let (upload_tx, mut upload_rx) = mpsc::unbounded_channel::<UploadOutcome>();

    let poller = Poller::new(Arc::clone(&client), fetch_tx);
    let mut dashboard = Dashboard::new();
    let shutdown = CancellationToken::new();

    println!("{}", dashboard.render());
    poller.request_refresh();

    let listener = tokio::spawn({
        let http = client.http().clone();
        let url = client.url("/events");
        let cancel = shutdown.clone();
        async move {
            match listen(http, url, trigger_tx, cancel).await {
                Ok(count) => info!("Live updates stopped after {} refreshes", count),
                Err(e) => warn!("Live updates unavailable: {}", e),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle_command(command, &client, &poller, &dashboard, &config, &upload_tx).await,
                    Err(message) if message.is_empty() => {}
                    Err(message) => println!("{}", message),
                }
            }
            Some(outcome) = fetch_rx.recv() => {
                if dashboard.apply(outcome) != ApplyOutcome::Stale {
                    println!("{}", dashboard.render());
                }
            }
            Some(RefreshTrigger) = trigger_rx.recv() => {
                poller.request_refresh();
            }
            Some(outcome) = upload_rx.recv() => {
                match outcome {
                    UploadOutcome::Uploaded(response) => {
                        println!("Upload successful: {}", response.message);
                        poller.request_refresh();
                    }
                    UploadOutcome::Local { snapshot, reason } => {
                        println!("Server upload failed ({}). Showing the file locally; it is not stored on the server.", reason);
                        dashboard.load_local(snapshot, poller.last_sequence());
                        println!("{}", dashboard.render());
                    }
                }
            }
        }
    }

    shutdown.cancel();
    if let Err(e) = listener.await {
        warn!("Live update task ended abnormally: {}", e);
    }
    info!("Desktop viewer closed");
    Ok(())
}

async fn handle_command(
    command: Command,
    client: &Arc<ApiClient>,
    poller: &Poller<ApiClient>,
    dashboard: &Dashboard,
    config: &DesktopConfig,
    upload_tx: &mpsc::UnboundedSender<UploadOutcome>,
) {
    match command {
        Command::Refresh => {
            poller.request_refresh();
        }
        Command::Upload(path) => match PreparedUpload::from_path(&path).await {
            Ok(upload) => {
                println!("Uploading {} ({} records)...", upload.filename, upload.records.len());
                let client = Arc::clone(client);
                let upload_tx = upload_tx.clone();
                tokio::spawn(async move {
                    let outcome = upload_with_fallback(&client, upload).await;
                    let _ = upload_tx.send(outcome);
                });
            }
            Err(e) => println!("Invalid CSV file {}: {}", path.display(), e),
        },
        Command::History => {
            let client = Arc::clone(client);
            tokio::spawn(async move {
                match client.fetch_history().await {
                    Ok(sessions) => println!("{}", render_history(&sessions)),
                    Err(e) => println!("Could not load history: {}", e),
                }
            });
        }
        Command::LocalReport => {
            let snapshot = dashboard.snapshot().clone();
            let output_dir = config.output_dir.clone();
            tokio::spawn(async move {
                match write_local_report(&snapshot, &output_dir).await {
                    Ok(path) => println!("Report written to {}", path.display()),
                    Err(e) => println!("Could not write report: {}", e),
                }
            });
        }
        Command::DownloadReport => {
            let client = Arc::clone(client);
            let output_dir = config.output_dir.clone();
            tokio::spawn(async move {
                match client.download_report().await {
                    Ok(report) => match save_downloaded_report(&report, &output_dir).await {
                        Ok(path) => println!("Server report saved to {}", path.display()),
                        Err(e) => println!("Could not save report: {}", e),
                    },
                    Err(e) => println!("Could not download report: {}", e),
                }
            });
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}
