//! Whole-document JSON I/O.

use std::path::Path;

use serde::Serialize;
use serde_json::value::Value as JsonValue;

use locfs_core::{atomic, Error, Format, Result};

use crate::finite;

/// Read and parse a JSON file.
///
/// A missing file is `NotFound`. Unparseable content is `Deserialization`.
pub fn read_json(path: &Path) -> Result<JsonValue> {
    let text = atomic::read_text(path, "JSON document")?;
    serde_json::from_str(&text).map_err(|e| Error::Deserialization {
        format: Format::JSON,
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serialize `value` and atomically replace the file at `path`.
///
/// Serialization happens before the file system is touched, so a value that
/// cannot be represented leaves any existing document unchanged.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path, temp_prefix: &str) -> Result<()> {
    let text = to_json_string(value)?;
    atomic::write_atomic(path, text.as_bytes(), temp_prefix)
}

fn serialization_error(message: impl ToString) -> Error {
    Error::Serialization {
        format: Format::JSON,
        message: message.to_string(),
    }
}

pub(crate) fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let text = serde_json::to_string_pretty(value).map_err(serialization_error)?;
    finite::check(value).map_err(serialization_error)?;
    Ok(text)
}

/// Convert to a JSON value, failing on anything JSON would lose, including
/// NaN and infinite floats.
pub(crate) fn to_json_value<T: Serialize + ?Sized>(value: &T) -> Result<JsonValue> {
    let json = serde_json::to_value(value).map_err(serialization_error)?;
    finite::check(value).map_err(serialization_error)?;
    Ok(json)
}
