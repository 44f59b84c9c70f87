use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use emojiflux_bucket::S3Config;

use crate::error::ConfigError;
use crate::feed::DEFAULT_FEED_URL;
use crate::publisher::{SeriesNaming, DEFAULT_SINK_URL};
use crate::store::DEFAULT_SNAPSHOT_KEY;

#[derive(Debug, Clone)]
pub struct Settings {
    pub feed_url: String,
    pub http_timeout: Duration,
    pub bucket: S3Config,
    pub snapshot_key: String,
    pub freshness_window: Duration,
    pub naming: SeriesNaming,
    pub sink_url: String,
    pub credentials_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            bucket: S3Config::default(),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            freshness_window: Duration::from_secs(90),
            naming: SeriesNaming::default(),
            sink_url: DEFAULT_SINK_URL.to_string(),
            credentials_path: PathBuf::from("write-keys.toml"),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset or empty variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut settings = Self::default();

        if let Some(url) = get("EMOJIFLUX_FEED_URL") {
            settings.feed_url = url;
        }
        if let Some(secs) = get("EMOJIFLUX_FEED_TIMEOUT_SECS") {
            settings.http_timeout = Duration::from_secs(parse("EMOJIFLUX_FEED_TIMEOUT_SECS", &secs)?);
        }
        if let Some(bucket) = get("EMOJIFLUX_BUCKET") {
            settings.bucket.bucket = bucket;
        }
        if let Some(key) = get("EMOJIFLUX_SNAPSHOT_KEY") {
            settings.snapshot_key = key;
        }
        if let Some(region) = get("S3_REGION") {
            settings.bucket.region = region;
        }
        settings.bucket.endpoint = get("S3_ENDPOINT_URL");
        settings.bucket.access_key_id = get("S3_ACCESS_KEY_ID");
        settings.bucket.secret_access_key = get("S3_SECRET_ACCESS_KEY");
        if let Some(flag) = get("S3_FORCE_PATH_STYLE") {
            settings.bucket.force_path_style = parse_bool("S3_FORCE_PATH_STYLE", &flag)?;
        }
        if let Some(secs) = get("EMOJIFLUX_FRESHNESS_SECS") {
            settings.freshness_window = Duration::from_secs(parse("EMOJIFLUX_FRESHNESS_SECS", &secs)?);
        }
        if let Some(prefix) = lookup("EMOJIFLUX_SERIES_PREFIX") {
            settings.naming.prefix = prefix;
        }
        if let Some(suffix) = lookup("EMOJIFLUX_SERIES_SUFFIX") {
            settings.naming.suffix = suffix;
        }
        if let Some(url) = get("EMOJIFLUX_SINK_URL") {
            settings.sink_url = url;
        }
        if let Some(path) = get("EMOJIFLUX_CREDENTIALS") {
            settings.credentials_path = PathBuf::from(path);
        }

        Ok(settings)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_production_locations() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.feed_url, "https://api.emojitracker.com/v1/rankings");
        assert_eq!(settings.bucket.bucket, "microprediction-lambda");
        assert_eq!(settings.bucket.region, "us-east-1");
        assert_eq!(settings.snapshot_key, "old-emoji.json");
        assert_eq!(settings.freshness_window, Duration::from_secs(90));
        assert_eq!(settings.naming.series_for("fire"), "emojitracker-twitter-fire.json");
        assert!(settings.bucket.endpoint.is_none());
    }

    #[test]
    fn overrides_apply() {
        let settings = settings_from(&[
            ("EMOJIFLUX_FRESHNESS_SECS", "120"),
            ("S3_ENDPOINT_URL", "http://localhost:9000"),
            ("S3_FORCE_PATH_STYLE", "true"),
            ("EMOJIFLUX_SERIES_SUFFIX", ""),
            ("EMOJIFLUX_CREDENTIALS", "/etc/emojiflux/keys.toml"),
        ])
        .unwrap();

        assert_eq!(settings.freshness_window, Duration::from_secs(120));
        assert_eq!(settings.bucket.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(settings.bucket.force_path_style);
        assert_eq!(settings.naming.series_for("fire"), "emojitracker-twitter-fire");
        assert_eq!(settings.credentials_path, PathBuf::from("/etc/emojiflux/keys.toml"));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = settings_from(&[("EMOJIFLUX_FRESHNESS_SECS", "ninety")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "EMOJIFLUX_FRESHNESS_SECS"));
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(settings_from(&[("S3_FORCE_PATH_STYLE", "maybe")]).is_err());
    }
}
