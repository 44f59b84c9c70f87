use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::credentials::{CredentialTable, WriteKey};
use crate::delta::DeltaSet;
use crate::error::PublishError;

pub const DEFAULT_SINK_URL: &str = "https://api.microprediction.org";

/// Lowercase, spaces to underscores. Applying it twice changes nothing.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesNaming {
    pub prefix: String,
    pub suffix: String,
}

impl Default for SeriesNaming {
    fn default() -> Self {
        Self {
            prefix: "emojitracker-twitter-".to_string(),
            suffix: ".json".to_string(),
        }
    }
}

impl SeriesNaming {
    pub fn series_for(&self, normalized_name: &str) -> String {
        format!("{}{}{}", self.prefix, normalized_name, self.suffix)
    }
}

/// "Set the latest value of a named series" on the publishing platform.
#[async_trait]
pub trait SeriesWriter: Send + Sync {
    async fn set(&self, series: &str, value: f64, write_key: &WriteKey) -> Result<(), PublishError>;
}

/// microprediction.org writer: `PUT {base}/live/{series}` with `write_key` and `value` form fields.
#[derive(Debug, Clone)]
pub struct MicroWriter {
    client: reqwest::Client,
    base_url: String,
}

impl MicroWriter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SeriesWriter for MicroWriter {
    async fn set(&self, series: &str, value: f64, write_key: &WriteKey) -> Result<(), PublishError> {
        let url = format!("{}/live/{}", self.base_url, series);
        let value = value.to_string();
        let response = self
            .client
            .put(url)
            .form(&[("write_key", write_key.expose()), ("value", value.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                series: series.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Writes that the sink accepted.
    pub published: usize,
    /// Names with no write key.
    pub skipped: usize,
    pub failed: usize,
}

impl PublishSummary {
    pub fn attempted(&self) -> usize {
        self.published + self.failed
    }
}

pub struct DeltaPublisher {
    writer: Arc<dyn SeriesWriter>,
    credentials: CredentialTable,
    naming: SeriesNaming,
}

impl DeltaPublisher {
    pub fn new(writer: Arc<dyn SeriesWriter>, credentials: CredentialTable, naming: SeriesNaming) -> Self {
        Self {
            writer,
            credentials,
            naming,
        }
    }

    pub fn credentials(&self) -> &CredentialTable {
        &self.credentials
    }

    /// Issues one write per credentialed name, all concurrently. A failed write is logged and
    /// counted; it does not stop the others.
    pub async fn publish(&self, deltas: &DeltaSet) -> PublishSummary {
        let mut ordered: Vec<(&String, f64)> = deltas.iter().map(|(name, change)| (name, *change)).collect();
        ordered.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut summary = PublishSummary::default();
        let mut writes = Vec::new();

        for (raw_name, change) in ordered {
            let name = normalize_name(raw_name);
            let Some(write_key) = self.credentials.get(&name) else {
                debug!(name = %name, "No write key, skipping");
                summary.skipped += 1;
                continue;
            };

            let series = self.naming.series_for(&name);
            info!(name = %name, change, "Writing");
            writes.push(async move {
                let result = self.writer.set(&series, change, write_key).await;
                (series, result)
            });
        }

        for (series, result) in join_all(writes).await {
            match result {
                Ok(()) => summary.published += 1,
                Err(err) => {
                    warn!(series = %series, "Publish failed: {err}");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_spaces() {
        assert_eq!(normalize_name("FACE WITH TEARS OF JOY"), "face_with_tears_of_joy");
        assert_eq!(normalize_name("Fire"), "fire");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["HEAVY BLACK HEART", "already_normal", "Mixed Case_Name", "  two  spaces "] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn series_combines_prefix_name_suffix() {
        let naming = SeriesNaming::default();
        assert_eq!(naming.series_for("fire"), "emojitracker-twitter-fire.json");
    }

    #[test]
    fn writer_trims_trailing_slash() {
        let writer = MicroWriter::new("https://api.microprediction.org/", Duration::from_secs(1)).unwrap();
        assert_eq!(writer.base_url, "https://api.microprediction.org");
    }
}
