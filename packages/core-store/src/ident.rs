//! Random identifier generation for locator levels keyed by generated ids.
//!
//! Identifiers are a one-letter kind prefix followed by random alphanumeric
//! characters. With the default length of 10 the space holds 62^10 values, so
//! collisions are rare, but generation still checks the existing set and
//! redraws a bounded number of times.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::codec;
use crate::config::FsConfig;
use crate::error::{Error, Result};
use crate::locator::Loc;

/// The kinds of generated identifier the built-in schemas use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    Ring,
    Conformer,
    Tau,
}

impl IdKind {
    pub fn prefix(&self) -> char {
        match self {
            IdKind::Ring => 'r',
            IdKind::Conformer => 'c',
            IdKind::Tau => 't',
        }
    }
}

fn draw(kind: IdKind, length: usize) -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    format!("{}{}", kind.prefix(), body)
}

/// Generate an identifier whose encoded segment is not in `existing`.
///
/// `existing` holds encoded path segments, as found in a parent directory.
/// `parent` is only used for error context.
pub fn generate_id(
    kind: IdKind,
    existing: &HashSet<String>,
    config: &FsConfig,
    parent: &Path,
) -> Result<Loc> {
    for _ in 0..config.id_attempts {
        let candidate = Loc::Id(draw(kind, config.id_length));
        if !existing.contains(&codec::encode(&candidate)) {
            return Ok(candidate);
        }
    }
    Err(Error::Generation {
        parent: parent.to_path_buf(),
        attempts: config.id_attempts,
    })
}

/// Generate an identifier not already used by a child of `dir`.
///
/// A missing directory has no children, so any draw is accepted.
pub fn generate_new_id_in(dir: &Path, kind: IdKind, config: &FsConfig) -> Result<Loc> {
    let existing: HashSet<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
        Err(e) => return Err(Error::io(dir, e)),
    };
    generate_id(kind, &existing, config, dir)
}

fn generate_unscoped(kind: IdKind) -> Loc {
    Loc::Id(draw(kind, FsConfig::default().id_length))
}

/// A fresh ring identifier, not checked against any directory.
pub fn generate_new_ring_id() -> Loc {
    generate_unscoped(IdKind::Ring)
}

/// A fresh conformer identifier, not checked against any directory.
pub fn generate_new_conformer_id() -> Loc {
    generate_unscoped(IdKind::Conformer)
}

/// A fresh tau sample identifier, not checked against any directory.
pub fn generate_new_tau_id() -> Loc {
    generate_unscoped(IdKind::Tau)
}
