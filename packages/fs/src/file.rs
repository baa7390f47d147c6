use std::fs;
use std::path::PathBuf;

use locfs_core::{atomic, Artifact, Error, Locator, Removal, Result};

use crate::chain::ArtifactSpec;
use crate::node::DirectoryNode;

/// A named artifact stored as one file per node.
///
/// The value type is chosen per call. It must have the format the artifact
/// was registered with, so an energy registered as a scalar cannot be read
/// back as a string.
#[derive(Clone, Debug)]
pub struct ArtifactFile {
    node: DirectoryNode,
    spec: ArtifactSpec,
}

impl ArtifactFile {
    pub(crate) fn new(node: DirectoryNode, spec: ArtifactSpec) -> Self {
        ArtifactFile { node, spec }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &ArtifactSpec {
        &self.spec
    }

    pub fn path(&self, locator: &Locator) -> Result<PathBuf> {
        Ok(self.node.path(locator)?.join(&self.spec.file_name))
    }

    fn check_format<T: Artifact>(&self) -> Result<()> {
        if T::FORMAT != self.spec.format {
            return Err(Error::FormatMismatch {
                name: self.spec.name.clone(),
                expected: self.spec.format.clone(),
                requested: T::FORMAT,
            });
        }
        Ok(())
    }

    fn what(&self, locator: &Locator) -> String {
        format!("artifact '{}' for {}", self.spec.name, locator)
    }

    /// Encode `value` and atomically replace the artifact file. The node's
    /// directory must already exist.
    pub fn write<T: Artifact>(&self, value: &T, locator: &Locator) -> Result<()> {
        self.check_format::<T>()?;
        let path = self.path(locator)?;
        let text = value.encode()?;

        atomic::write_atomic(&path, text.as_bytes(), &self.node.config().temp_prefix)?;
        log::debug!("Wrote {} to {}", self.what(locator), path.display());
        Ok(())
    }

    pub fn read<T: Artifact>(&self, locator: &Locator) -> Result<T> {
        self.check_format::<T>()?;
        let path = self.path(locator)?;
        let text = atomic::read_text(&path, &self.what(locator))?;
        T::decode(&text).map_err(|message| Error::Deserialization {
            format: self.spec.format.clone(),
            path,
            message,
        })
    }

    /// True when the file is present and its content passes the format's
    /// structural check.
    pub fn exists<T: Artifact>(&self, locator: &Locator) -> Result<bool> {
        self.check_format::<T>()?;
        let path = self.path(locator)?;
        if !path.is_file() {
            return Ok(false);
        }
        match atomic::read_text(&path, &self.what(locator)) {
            Ok(text) => Ok(T::check(&text)),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn remove(&self, locator: &Locator, removal: Removal) -> Result<()> {
        let path = self.path(locator)?;
        removal.check(&self.what(locator), &path)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found(self.what(locator), &path))
            }
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    /// Write every item in order. The first failure stops the batch and is
    /// returned with the index and locator of its item; earlier items stay
    /// written.
    pub fn write_all<T: Artifact>(&self, items: &[(T, Locator)]) -> Result<()> {
        for (index, (value, locator)) in items.iter().enumerate() {
            self.write(value, locator).map_err(|source| Error::Batch {
                index,
                locator: locator.clone(),
                source: Box::new(source),
            })?;
        }
        Ok(())
    }

    pub fn read_all<T: Artifact>(&self, locators: &[Locator]) -> Result<Vec<T>> {
        locators
            .iter()
            .enumerate()
            .map(|(index, locator)| {
                self.read(locator).map_err(|source| Error::Batch {
                    index,
                    locator: locator.clone(),
                    source: Box::new(source),
                })
            })
            .collect()
    }
}
