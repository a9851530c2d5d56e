//! Command-line entry point: `shardput upload` and `shardput combine`.

mod config;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use shardput_combine::Combiner;
use shardput_store::RemoteStore;
use shardput_transfer::{UploadEvent, UploadOutcome, Uploader};
use tracing_subscriber::EnvFilter;

use crate::config::{CombineConfig, StoreConfig};

#[derive(Parser)]
#[command(
    name = "shardput",
    version,
    about = "Split uploads for PUT-only object stores"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a local file, splitting it if it exceeds the chunk threshold
    Upload {
        /// Local file to upload
        #[arg(short, long)]
        file: PathBuf,
        /// Destination path on the store
        #[arg(short, long)]
        to: String,
    },
    /// Reassemble every pending split upload on the store filesystem
    Combine,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Upload { file, to } => upload(&file, &to).await,
        Command::Combine => combine(),
    }
}

async fn upload(file: &Path, to: &str) -> anyhow::Result<()> {
    let cfg = StoreConfig::from_env()?;
    let store = RemoteStore::new(&cfg.base_url, &cfg.username, &cfg.password);

    let (events_tx, mut events_rx) = tokio::sync::mpsc::channel(64);
    let uploader = Uploader::new(store, &cfg.tmp_dir).with_events(events_tx);

    let progress = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match event {
                UploadEvent::Uploaded { path } => {
                    tracing::info!(dest = %path, "uploaded");
                }
                UploadEvent::ChunkUploaded { index, total, .. } => {
                    tracing::info!(chunk = index + 1, total, "chunk uploaded");
                }
                UploadEvent::ManifestUploaded { path } => {
                    tracing::info!(manifest = %path, "manifest uploaded");
                }
            }
        }
    });

    let outcome = uploader.upload(file, to).await;
    drop(uploader); // closes the event channel
    let _ = progress.await;

    match outcome? {
        UploadOutcome::Whole => {}
        UploadOutcome::Split { chunk_count, .. } => {
            tracing::info!(
                chunks = chunk_count,
                "split upload complete; run `shardput combine` on the store host to finish"
            );
        }
    }
    Ok(())
}

fn combine() -> anyhow::Result<()> {
    let cfg = CombineConfig::from_env()?;
    let combiner = Combiner::new(Path::new(&cfg.root), &cfg.tmp_dir);

    let report = combiner.combine()?;
    tracing::info!(
        combined = report.combined.len(),
        failed = report.failed.len(),
        "combine run finished"
    );

    if !report.is_clean() {
        for (manifest, error) in &report.failed {
            tracing::error!(manifest = %manifest.display(), error = %error, "manifest not combined");
        }
        anyhow::bail!("{} manifest(s) failed to combine", report.failed.len());
    }
    Ok(())
}
