use std::sync::Arc;

use bytes::Bytes;
use emojiflux_bucket::{BucketError, BucketStore};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::model::{Snapshot, StoredSnapshot};

pub const DEFAULT_SNAPSHOT_KEY: &str = "old-emoji.json";

/// The single "previous snapshot" slot. Every save overwrites it.
#[derive(Clone)]
pub struct SnapshotStore {
    bucket: Arc<dyn BucketStore>,
    key: String,
}

impl SnapshotStore {
    pub fn new(bucket: Arc<dyn BucketStore>, key: impl Into<String>) -> Self {
        Self {
            bucket,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Any failure to produce a usable snapshot means "no history".
    pub async fn load_previous(&self) -> Option<StoredSnapshot> {
        let object = match self.bucket.get_object(&self.key).await {
            Ok(object) => object,
            Err(BucketError::NotFound(_)) => {
                info!(key = %self.key, "No stored snapshot");
                return None;
            }
            Err(err) => {
                warn!(key = %self.key, "Failed to read stored snapshot: {err}");
                return None;
            }
        };

        let Some(last_modified) = object.last_modified else {
            warn!(key = %self.key, "Stored snapshot has no last-modified time");
            return None;
        };

        match Snapshot::from_json(&object.bytes) {
            Ok(snapshot) => Some(StoredSnapshot {
                snapshot,
                last_modified,
            }),
            Err(err) => {
                warn!(key = %self.key, "Stored snapshot is not valid JSON: {err}");
                None
            }
        }
    }

    pub async fn save_current(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let body = snapshot.to_json()?;
        self.bucket
            .put_object(&self.key, Bytes::from(body), "application/json")
            .await?;
        Ok(())
    }
}
