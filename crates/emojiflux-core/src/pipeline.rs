//! One invocation: fetch -> load previous -> (persist current || diff and publish) -> join.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeDelta, Utc};
use emojiflux_bucket::S3BucketStore;
use tracing::{error, info};

use crate::config::Settings;
use crate::credentials::CredentialTable;
use crate::delta::{compute_deltas, snapshot_age};
use crate::error::{ConfigError, Result};
use crate::feed::{HttpRankingFeed, RankingFeed};
use crate::model::{Snapshot, StoredSnapshot};
use crate::publisher::{DeltaPublisher, MicroWriter, PublishSummary};
use crate::store::SnapshotStore;

/// Result of the best-effort persist. A failure is recorded here and never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing usable in the store; this run only seeds it.
    NoHistory,
    /// The stored snapshot was older than the freshness window.
    Stale { age: Duration },
    Published { deltas: usize, summary: PublishSummary },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub fetched: usize,
    pub outcome: RunOutcome,
    pub persist: PersistOutcome,
}

pub struct Pipeline {
    feed: Arc<dyn RankingFeed>,
    store: SnapshotStore,
    publisher: DeltaPublisher,
    freshness_window: Duration,
}

impl Pipeline {
    pub fn new(
        feed: Arc<dyn RankingFeed>,
        store: SnapshotStore,
        publisher: DeltaPublisher,
        freshness_window: std::time::Duration,
    ) -> Self {
        Self {
            feed,
            store,
            publisher,
            freshness_window: Duration::from_std(freshness_window).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Wires the production collaborators: HTTP feed, S3 slot, microprediction writer.
    pub async fn from_settings(settings: &Settings, credentials: CredentialTable) -> Result<Self> {
        let feed = HttpRankingFeed::new(settings.feed_url.clone(), settings.http_timeout)
            .map_err(ConfigError::from)?;
        let bucket = S3BucketStore::new(settings.bucket.clone())
            .await
            .map_err(ConfigError::from)?;
        let writer = MicroWriter::new(settings.sink_url.clone(), settings.http_timeout)
            .map_err(ConfigError::from)?;

        info!(
            bucket = bucket.bucket(),
            key = %settings.snapshot_key,
            credentials = credentials.len(),
            "Pipeline configured"
        );

        Ok(Self::new(
            Arc::new(feed),
            SnapshotStore::new(Arc::new(bucket), settings.snapshot_key.clone()),
            DeltaPublisher::new(Arc::new(writer), credentials, settings.naming.clone()),
            settings.freshness_window,
        ))
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.run_with_clock(Utc::now).await
    }

    /// Like [`Pipeline::run`] with a fixed "now" for the staleness check.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        self.run_with_clock(move || now).await
    }

    async fn run_with_clock<C>(&self, clock: C) -> Result<RunReport>
    where
        C: FnOnce() -> DateTime<Utc>,
    {
        let current = self.feed.fetch_snapshot().await?;
        info!(records = current.len(), "Fetched current rankings");

        // Read before the write below starts so the run never diffs against itself.
        let previous = self.store.load_previous().await;
        let now = clock();

        let (persist, outcome) = tokio::join!(
            self.persist(&current),
            self.diff_and_publish(&current, previous.as_ref(), now)
        );

        let report = RunReport {
            fetched: current.len(),
            outcome,
            persist,
        };
        info!(?report, "Run finished");
        Ok(report)
    }

    async fn persist(&self, current: &Snapshot) -> PersistOutcome {
        match self.store.save_current(current).await {
            Ok(()) => PersistOutcome::Saved,
            Err(err) => {
                error!(key = self.store.key(), "Failed to write snapshot: {err}");
                PersistOutcome::Failed(err.to_string())
            }
        }
    }

    async fn diff_and_publish(
        &self,
        current: &Snapshot,
        previous: Option<&StoredSnapshot>,
        now: DateTime<Utc>,
    ) -> RunOutcome {
        let Some(previous) = previous else {
            info!("No emoji history saved, skipping publish");
            return RunOutcome::NoHistory;
        };

        let Some(deltas) = compute_deltas(current, previous, now, self.freshness_window) else {
            let age = snapshot_age(previous, now);
            info!(age_ms = age.num_milliseconds(), "Emoji history too old, skipping publish");
            return RunOutcome::Stale { age };
        };

        let summary = self.publisher.publish(&deltas).await;
        RunOutcome::Published {
            deltas: deltas.len(),
            summary,
        }
    }
}
