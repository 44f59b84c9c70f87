//! Snapshot -> diff -> publish pipeline for emoji ranking deltas.

pub mod config;
pub mod credentials;
pub mod delta;
pub mod error;
pub mod feed;
pub mod model;
pub mod pipeline;
pub mod publisher;
pub mod store;

pub use config::Settings;
pub use credentials::{CredentialTable, WriteKey};
pub use delta::{compute_deltas, DeltaSet};
pub use error::{PipelineError, Result};
pub use model::{EmojiRecord, Snapshot, StoredSnapshot};
pub use pipeline::{Pipeline, PersistOutcome, RunOutcome, RunReport};
pub use publisher::{normalize_name, DeltaPublisher, PublishSummary, SeriesNaming};
