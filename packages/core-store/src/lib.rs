//! Core locfs: the addressing and persistence primitives.
//!
//! This layer has no notion of schemas or directory trees. It provides:
//! - `Loc` / `Locator`: typed locator components and tuples
//! - `codec`: reversible locator to path-segment encoding
//! - `ident`: collision-free random identifier generation
//! - `Artifact` / `Format`: pluggable value encodings for artifact files
//! - `InfoObject`: provenance records
//! - `atomic`: temp-file-and-rename writes
//! - `FsConfig`: layout settings
//! - `Removal`: the explicit gate every delete goes through
//!
//! # Example
//!
//! ```rust
//! use locfs_core::{codec, locator};
//!
//! let locs = locator!["hf", "sto-3g", "U"];
//! let segments = codec::encode_locator(&locs);
//! assert_eq!(segments, vec!["hf", "sto-3g", "U"]);
//! assert_eq!(codec::decode_segments(&segments).unwrap(), locs);
//! ```

pub mod atomic;
pub mod codec;
pub mod ident;

mod artifact;
mod config;
mod error;
mod format;
mod info;
mod locator;
mod removal;

pub use artifact::{Artifact, Json, Matrix};
pub use config::FsConfig;
pub use error::{Error, Result};
pub use format::Format;
pub use ident::{generate_new_conformer_id, generate_new_ring_id, generate_new_tau_id, IdKind};
pub use info::{InfoObject, RunInfo, RunStatus};
pub use locator::{Loc, Locator};
pub use removal::Removal;
