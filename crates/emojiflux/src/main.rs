use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use emojiflux_core::{CredentialTable, PersistOutcome, Pipeline, RunOutcome, Settings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Publishes per-emoji usage deltas from emojitracker to microprediction. One invocation is one run.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML table of normalized emoji name -> write key
    #[arg(long, env = "EMOJIFLUX_CREDENTIALS")]
    credentials: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env().context("invalid environment configuration")?;
    if let Some(path) = cli.credentials {
        settings.credentials_path = path;
    }

    let credentials = CredentialTable::load(&settings.credentials_path).with_context(|| {
        format!(
            "failed to load write keys from {}",
            settings.credentials_path.display()
        )
    })?;
    if credentials.is_empty() {
        warn!("Credential table is empty; nothing will be published");
    }

    let pipeline = Pipeline::from_settings(&settings, credentials).await?;
    let report = pipeline.run().await?;

    if let PersistOutcome::Failed(reason) = &report.persist {
        warn!(%reason, "Snapshot was not persisted; next run will see stale history");
    }
    match report.outcome {
        RunOutcome::Published { deltas, summary } => info!(
            deltas,
            published = summary.published,
            skipped = summary.skipped,
            failed = summary.failed,
            "Published emoji deltas"
        ),
        RunOutcome::Stale { age } => {
            info!(age_secs = age.num_seconds(), "History stale, resynced")
        }
        RunOutcome::NoHistory => info!("Seeded snapshot history"),
    }

    Ok(())
}
