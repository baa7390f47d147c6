//! Consolidated JSON documents for locfs.
//!
//! Instead of one file per artifact, a [`DocumentStore`] keeps every named
//! value for every locator under a directory in a single JSON document,
//! updated by load, merge and atomic replace.

pub mod document;
mod finite;
pub mod json_utils;
pub mod local_disk;

pub use document::{Document, DocumentSlot};
pub use json_utils::{read_json, write_json};
pub use local_disk::{DocumentLayout, DocumentSite, DocumentStore, FixedDir, JsonLayer};
