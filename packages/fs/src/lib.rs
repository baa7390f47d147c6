//! Locator-addressed hierarchical file store.
//!
//! A schema is an ordered list of levels. Each level consumes a fixed number
//! of locator components and carries named artifacts. A [`NodeChain`] built
//! from a schema maps every locator prefix to a directory, and exposes
//! per-depth node operations and artifact accessors.
//!
//! # Example
//!
//! ```rust
//! use locfs::schema;
//! use locfs_core::locator;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let thy = schema::theory(dir.path()).unwrap();
//! let locs = locator!["hf", "sto-3g", "U"];
//!
//! thy.leaf().create(&locs).unwrap();
//! thy.leaf().file("energy").unwrap().write(&5.7, &locs).unwrap();
//! assert_eq!(thy.leaf().file("energy").unwrap().read::<f64>(&locs).unwrap(), 5.7);
//! ```

pub mod chain;
pub mod file;
pub mod node;
pub mod schema;

pub use chain::{ArtifactSpec, ChainNode, LevelSpec, NodeChain};
pub use file::ArtifactFile;
pub use node::DirectoryNode;

pub use locfs_core::{Error, Loc, Locator, Removal, Result};
