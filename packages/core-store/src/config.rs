//! Layout configuration shared by node chains and document stores.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::Format;

/// On-disk layout settings.
///
/// The defaults are what every built-in schema uses. Custom values can be
/// loaded from JSON; missing fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Marker file written by `create` inside each node directory.
    pub sentinel_name: String,
    /// File name of the consolidated document in each directory.
    pub document_name: String,
    /// Number of random characters in a generated identifier.
    pub id_length: usize,
    /// Draws before identifier generation gives up.
    pub id_attempts: usize,
    /// Prefix of temporary files created during atomic writes.
    pub temp_prefix: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        FsConfig {
            sentinel_name: ".locfs".to_string(),
            document_name: "locfs.json".to_string(),
            id_length: 10,
            id_attempts: 64,
            temp_prefix: ".tmp-".to_string(),
        }
    }
}

impl FsConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::Deserialization {
            format: Format::JSON,
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            format: Format::JSON,
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
