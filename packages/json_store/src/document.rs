//! The consolidated document: one JSON object per directory.
//!
//! On disk the document maps an encoded locator suffix to the named values
//! stored for it:
//!
//! ```json
//! {
//!   "@tXk2Pq91a0b": { "energy": 5.7, "geometry": [...] },
//!   "@tQ7uv0LmZ3e": { "energy": 5.5 }
//! }
//! ```
//!
//! A document may also be nested as one value of another document's entry
//! (see [`DocumentSlot::Nested`]); it then has the same shape.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::value::Value as JsonValue;

use locfs_core::{atomic, Error, Format, Result};

use crate::json_utils;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    entries: BTreeMap<String, BTreeMap<String, JsonValue>>,
}

impl Document {
    /// Load the document at `path`. An absent document is empty.
    ///
    /// Content that is not a document (unparseable, or JSON of the wrong
    /// shape) is a `Deserialization` error.
    pub fn load(path: &Path) -> Result<Document> {
        let value = match json_utils::read_json(path) {
            Ok(value) => value,
            Err(e) if e.is_not_found() => return Ok(Document::default()),
            Err(e) => return Err(e),
        };
        serde_json::from_value(value).map_err(|e| Error::Deserialization {
            format: Format::JSON,
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the document as the base of a write. A corrupt document is
    /// dropped so that the write replaces it.
    pub fn load_for_update(path: &Path) -> Result<Document> {
        DocumentSlot::File(path.to_path_buf()).load_for_update()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str, name: &str) -> Option<&JsonValue> {
        self.entries.get(key).and_then(|names| names.get(name))
    }

    pub fn insert(&mut self, key: impl Into<String>, name: impl Into<String>, value: JsonValue) {
        self.entries
            .entry(key.into())
            .or_default()
            .insert(name.into(), value);
    }

    /// Remove one entry, dropping the key once it holds no values.
    pub fn remove(&mut self, key: &str, name: &str) -> Option<JsonValue> {
        let names = self.entries.get_mut(key)?;
        let removed = names.remove(name);
        if names.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    /// Keys holding a value under `name`, in key order.
    pub fn keys_with(&self, name: &str) -> impl Iterator<Item = &str> + '_ {
        let name = name.to_string();
        self.entries
            .iter()
            .filter(move |(_, names)| names.contains_key(&name))
            .map(|(key, _)| key.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Atomically replace the document at `path`.
    pub fn save(&self, path: &Path, temp_prefix: &str) -> Result<()> {
        let text = json_utils::to_json_string(self)?;
        atomic::write_atomic(path, text.as_bytes(), temp_prefix)
    }
}

/// Where one document is kept.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocumentSlot {
    /// A JSON file of its own.
    File(PathBuf),
    /// The `field` value of the `key` entry of the document in `file`.
    Nested {
        file: PathBuf,
        key: String,
        field: String,
    },
}

impl DocumentSlot {
    /// The file that is rewritten when this document changes.
    pub fn file(&self) -> &Path {
        match self {
            DocumentSlot::File(path) | DocumentSlot::Nested { file: path, .. } => path,
        }
    }

    /// Load the document. An absent document (or an absent entry of the
    /// enclosing one) is empty.
    pub fn load(&self) -> Result<Document> {
        match self {
            DocumentSlot::File(path) => Document::load(path),
            DocumentSlot::Nested { file, key, field } => {
                let outer = Document::load(file)?;
                match outer.get(key, field) {
                    None => Ok(Document::default()),
                    Some(value) => {
                        serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
                            format: Format::JSON,
                            path: file.clone(),
                            message: format!("{}: {}", self, e),
                        })
                    }
                }
            }
        }
    }

    /// Load the document as the base of a write. A corrupt document is
    /// dropped so that the write replaces it.
    pub fn load_for_update(&self) -> Result<Document> {
        match self.load() {
            Err(Error::Deserialization { message, .. }) => {
                log::warn!("Replacing unreadable document {}: {}", self, message);
                Ok(Document::default())
            }
            other => other,
        }
    }

    /// True when the document has been written, even if it is empty.
    pub fn is_present(&self) -> Result<bool> {
        match self {
            DocumentSlot::File(path) => Ok(path.is_file()),
            DocumentSlot::Nested { file, key, field } => {
                Ok(Document::load(file)?.get(key, field).is_some())
            }
        }
    }

    /// Atomically replace the document. A nested document is merged into
    /// its enclosing document, which is then replaced as a whole.
    pub fn save(&self, document: &Document, temp_prefix: &str) -> Result<()> {
        match self {
            DocumentSlot::File(path) => document.save(path, temp_prefix),
            DocumentSlot::Nested { file, key, field } => {
                let value = json_utils::to_json_value(document)?;
                let mut outer = Document::load_for_update(file)?;
                outer.insert(key.as_str(), field.as_str(), value);
                outer.save(file, temp_prefix)
            }
        }
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSlot::File(path) => write!(f, "{}", path.display()),
            DocumentSlot::Nested { file, key, field } => {
                write!(f, "{} [{}][{}]", file.display(), key, field)
            }
        }
    }
}
