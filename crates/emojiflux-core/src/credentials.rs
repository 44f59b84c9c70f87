use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// A microprediction write key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WriteKey(String);

impl WriteKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WriteKey(***)")
    }
}

/// Normalized emoji name -> write key, provisioned out of band.
///
/// The file form is flat TOML:
///
/// ```toml
/// face_with_tears_of_joy = "a1b2..."
/// fire = "c3d4..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CredentialTable {
    keys: BTreeMap<String, WriteKey>,
}

impl CredentialTable {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn get(&self, normalized_name: &str) -> Option<&WriteKey> {
        self.keys.get(normalized_name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, WriteKey)> for CredentialTable {
    fn from_iter<I: IntoIterator<Item = (N, WriteKey)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(|(name, key)| (name.into(), key)).collect(),
        }
    }
}
