//! Error types shared by every locfs layer.

use std::path::PathBuf;

use crate::format::Format;
use crate::locator::Locator;

/// Errors surfaced by locfs operations.
///
/// None of these are retried internally. Partial writes cannot happen (every
/// write goes through a temp file and a rename), so there is no "torn write"
/// kind.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A read or remove targeted a node or artifact that is not on disk.
    #[error("{what} not found at {}", path.display())]
    NotFound { what: String, path: PathBuf },

    /// Removal was attempted without explicit permission.
    #[error("removal of {what} at {} is not permitted", path.display())]
    RemovalDenied { what: String, path: PathBuf },

    /// A value could not be encoded in the artifact's or document's format.
    #[error("serialization error ({format}): {message}")]
    Serialization { format: Format, message: String },

    /// Persisted content could not be decoded.
    #[error("deserialization error ({format}) in {}: {message}", path.display())]
    Deserialization {
        format: Format,
        path: PathBuf,
        message: String,
    },

    /// Identifier generation ran out of attempts.
    #[error("no free identifier under {} after {attempts} attempts", parent.display())]
    Generation { parent: PathBuf, attempts: usize },

    /// A path segment does not round-trip through the locator codec.
    #[error("path segment '{segment}' is not a valid locator: {message}")]
    PathIntegrity { segment: String, message: String },

    /// The locator has the wrong number of components for the node.
    #[error("locator {locator} has {actual} components, expected {expected}")]
    Arity {
        locator: Locator,
        expected: usize,
        actual: usize,
    },

    /// No artifact or document of this name is registered at the node.
    #[error("no artifact named '{name}' at depth {depth}")]
    UnknownArtifact { name: String, depth: usize },

    /// The artifact was accessed with a value type of a different format.
    #[error("artifact '{name}' is stored as {expected}, accessed as {requested}")]
    FormatMismatch {
        name: String,
        expected: Format,
        requested: Format,
    },

    /// Depth index outside the node chain.
    #[error("depth {depth} is out of range for a chain of {len} nodes")]
    Depth { depth: isize, len: usize },

    /// One item of a batch operation failed.
    #[error("batch item {index} ({locator}) failed: {source}")]
    Batch {
        index: usize,
        locator: Locator,
        #[source]
        source: Box<Error>,
    },

    /// Underlying filesystem failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    pub fn integrity(segment: impl Into<String>, message: impl Into<String>) -> Self {
        Error::PathIntegrity {
            segment: segment.into(),
            message: message.into(),
        }
    }

    /// True for `NotFound`, including one wrapped in a batch failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Batch { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Result alias for locfs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator;
    use std::error::Error as StdError;

    #[test]
    fn not_found_display() {
        let e = Error::not_found("node", "/tmp/THY/hf");
        let display = format!("{}", e);
        assert!(display.contains("node not found"));
        assert!(display.contains("/tmp/THY/hf"));
    }

    #[test]
    fn removal_denied_display() {
        let e = Error::RemovalDenied {
            what: "artifact 'energy'".to_string(),
            path: PathBuf::from("/tmp/x/energy.ene"),
        };
        assert!(format!("{}", e).contains("not permitted"));
    }

    #[test]
    fn serialization_display() {
        let e = Error::Serialization {
            format: Format::JSON,
            message: "key must be a string".to_string(),
        };
        let display = format!("{}", e);
        assert!(display.contains("serialization error"));
        assert!(display.contains("application/json"));
        assert!(display.contains("key must be a string"));
    }

    #[test]
    fn arity_display() {
        let e = Error::Arity {
            locator: locator!["hf", "sto-3g"],
            expected: 3,
            actual: 2,
        };
        let display = format!("{}", e);
        assert!(display.contains("2 components"));
        assert!(display.contains("expected 3"));
    }

    #[test]
    fn batch_source_chain() {
        let e = Error::Batch {
            index: 1,
            locator: locator![0],
            source: Box::new(Error::not_found("artifact", "/tmp/a")),
        };
        assert!(e.is_not_found());
        assert!(StdError::source(&e).is_some());
        assert!(format!("{}", e).contains("batch item 1"));
    }

    #[test]
    fn io_error_source() {
        let e = Error::io(
            "/tmp/a",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(StdError::source(&e).is_some());
        assert!(!e.is_not_found());
    }
}
