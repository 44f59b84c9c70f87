use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the ranking feed. Any other fields the feed sends are dropped on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiRecord {
    pub name: String,
    pub score: f64,
}

impl EmojiRecord {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub records: Vec<EmojiRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<EmojiRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// name -> score; a repeated name keeps its last score.
    pub fn scores(&self) -> HashMap<&str, f64> {
        self.records
            .iter()
            .map(|record| (record.name.as_str(), record.score))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

impl FromIterator<EmojiRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = EmojiRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The snapshot persisted by the previous run and when the store says it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub snapshot: Snapshot,
    pub last_modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ignores_extra_feed_fields() {
        let body = r#"[{"char":"😂","id":"1F602","name":"FACE WITH TEARS OF JOY","score":3409012}]"#;
        let snapshot = Snapshot::from_json(body.as_bytes()).expect("feed body decodes");
        assert_eq!(
            snapshot.records,
            vec![EmojiRecord::new("FACE WITH TEARS OF JOY", 3_409_012.0)]
        );

        let encoded = String::from_utf8(snapshot.to_json().unwrap()).unwrap();
        assert_eq!(encoded, r#"[{"name":"FACE WITH TEARS OF JOY","score":3409012.0}]"#);
    }

    #[test]
    fn scores_keep_last_duplicate() {
        let snapshot: Snapshot = [
            EmojiRecord::new("FIRE", 1.0),
            EmojiRecord::new("HEART", 2.0),
            EmojiRecord::new("FIRE", 5.0),
        ]
        .into_iter()
        .collect();

        let scores = snapshot.scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["FIRE"], 5.0);
    }

    #[test]
    fn decode_rejects_non_array() {
        assert!(Snapshot::from_json(br#"{"name":"FIRE","score":1}"#).is_err());
    }
}
