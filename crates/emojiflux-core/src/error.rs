// crates/emojiflux-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("ranking feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ranking feed returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("ranking feed body was not a list of name/score records: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("bucket error: {0}")]
    Bucket(#[from] emojiflux_bucket::BucketError),

    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("publish request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sink rejected write to {series} ({status}): {body}")]
    Rejected {
        series: String,
        status: u16,
        body: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: String, value: String },

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credential table is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("could not open snapshot bucket: {0}")]
    Bucket(#[from] emojiflux_bucket::BucketError),
}

/// The one failure class a run surfaces to its caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] FeedError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
