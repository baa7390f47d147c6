//! Format tags for persisted artifacts.

use std::borrow::Cow;
use std::fmt;

/// A tag describing how an artifact is laid out on disk.
///
/// The media type is a MIME-like string used to check that a value type
/// matches the artifact it is read from. The extension is the default file
/// suffix for artifacts in this format.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Format {
    media_type: Cow<'static, str>,
    extension: Cow<'static, str>,
}

impl Format {
    /// Free-form text stored verbatim (`text/plain`).
    pub const TEXT: Format = Format::from_static("text/plain", "txt");

    /// A single floating-point number (`text/x-scalar`).
    pub const SCALAR: Format = Format::from_static("text/x-scalar", "dat");

    /// Whitespace-separated numeric rows (`text/x-matrix`).
    pub const MATRIX: Format = Format::from_static("text/x-matrix", "mat");

    /// Any serde-serializable structure (`application/json`).
    pub const JSON: Format = Format::from_static("application/json", "json");

    /// Provenance records (`application/x-locfs-info`).
    pub const INFO: Format = Format::from_static("application/x-locfs-info", "info");

    pub const fn from_static(media_type: &'static str, extension: &'static str) -> Self {
        Format {
            media_type: Cow::Borrowed(media_type),
            extension: Cow::Borrowed(extension),
        }
    }

    pub fn new(media_type: impl Into<String>, extension: impl Into<String>) -> Self {
        Format {
            media_type: Cow::Owned(media_type.into()),
            extension: Cow::Owned(extension.into()),
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.media_type)
    }
}

impl AsRef<str> for Format {
    fn as_ref(&self) -> &str {
        &self.media_type
    }
}
