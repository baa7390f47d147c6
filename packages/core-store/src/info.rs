//! Info objects: small provenance records written next to the data they
//! describe.
//!
//! The store does not interpret them. They are persisted through the same
//! artifact mechanism as any other value, under the `INFO` format.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::artifact::Artifact;
use crate::error::{Error, Result};
use crate::format::Format;

/// A flat record of named JSON values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoObject {
    fields: Map<String, JsonValue>,
}

impl InfoObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.fields.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Build an info object from any record that serializes to a map.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self> {
        match serde_json::to_value(record) {
            Ok(JsonValue::Object(fields)) => Ok(InfoObject { fields }),
            Ok(other) => Err(Error::Serialization {
                format: Format::INFO,
                message: format!("info record must be a map, got {}", other),
            }),
            Err(e) => Err(Error::Serialization {
                format: Format::INFO,
                message: e.to_string(),
            }),
        }
    }

    /// Read the fields back as a typed record.
    pub fn to_record<T: DeserializeOwned>(&self) -> std::result::Result<T, String> {
        serde_json::from_value(JsonValue::Object(self.fields.clone())).map_err(|e| e.to_string())
    }

    /// Sampling metadata for the trunk of a conformer tree.
    pub fn conformer_trunk(nsamp: usize) -> Self {
        InfoObject::new().with("nsamp", nsamp)
    }

    /// Sampling metadata for one ring branch of a conformer tree.
    pub fn conformer_branch(nsamp: usize) -> Self {
        InfoObject::new().with("nsamp", nsamp)
    }

    /// Grid values per scanned coordinate.
    pub fn scan_branch(grids: BTreeMap<String, Vec<f64>>) -> Self {
        InfoObject::new().with("grids", json!(grids))
    }

    /// Sampling metadata and torsion ranges for the tau tree.
    pub fn tau_trunk(nsamp: usize, tors_ranges: BTreeMap<String, (f64, f64)>) -> Self {
        InfoObject::new()
            .with("nsamp", nsamp)
            .with("tors_ranges", json!(tors_ranges))
    }

    pub fn run(run: &RunInfo) -> Result<Self> {
        Self::from_record(run)
    }
}

impl Artifact for InfoObject {
    const FORMAT: Format = Format::INFO;

    fn encode(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.fields).map_err(|e| Error::Serialization {
            format: Self::FORMAT,
            message: e.to_string(),
        })
    }

    fn decode(text: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    fn check(text: &str) -> bool {
        matches!(serde_json::from_str(text), Ok(JsonValue::Object(_)))
    }
}

/// Status of a computation recorded in a run directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Success,
    Failure,
}

/// Provenance of one program run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub job: String,
    pub program: String,
    pub version: Option<String>,
    pub method: Option<String>,
    pub basis: Option<String>,
    pub status: RunStatus,
    pub utc_start_time: DateTime<Utc>,
    pub utc_end_time: Option<DateTime<Utc>>,
    pub host: Option<String>,
}

impl RunInfo {
    /// A run that starts now.
    pub fn start(job: impl Into<String>, program: impl Into<String>) -> Self {
        RunInfo {
            job: job.into(),
            program: program.into(),
            version: None,
            method: None,
            basis: None,
            status: RunStatus::Running,
            utc_start_time: Utc::now(),
            utc_end_time: None,
            host: None,
        }
    }

    /// Mark the run finished now with the given status.
    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.utc_end_time = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        self.utc_end_time.is_some()
    }
}
