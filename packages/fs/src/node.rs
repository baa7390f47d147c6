//! Directory nodes: one level of a locator hierarchy mapped onto disk.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use locfs_core::atomic;
use locfs_core::codec;
use locfs_core::ident::{self, IdKind};
use locfs_core::{Error, FsConfig, Loc, Locator, Removal, Result};
use locfs_json_store::DocumentLayout;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LevelLayout {
    pub segment: Option<String>,
    pub arity: usize,
}

/// The node at one depth of a chain.
///
/// A node at depth `d` is addressed by the first `arity()` locator
/// components. Its directory is the chain prefix followed, for every level
/// up to `d`, by the level's fixed segment (if any) and then one encoded
/// segment per component.
#[derive(Clone, Debug)]
pub struct DirectoryNode {
    prefix: PathBuf,
    levels: Vec<LevelLayout>,
    config: FsConfig,
}

impl DirectoryNode {
    pub(crate) fn new(prefix: PathBuf, levels: Vec<LevelLayout>, config: FsConfig) -> Self {
        DirectoryNode {
            prefix,
            levels,
            config,
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Number of locator components addressing this node.
    pub fn arity(&self) -> usize {
        self.levels.iter().map(|level| level.arity).sum()
    }

    /// Number of components consumed by this node's own level.
    pub fn level_arity(&self) -> usize {
        self.levels.last().map_or(0, |level| level.arity)
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// The node one level up, or `None` at the root.
    pub fn parent(&self) -> Option<DirectoryNode> {
        if self.levels.len() < 2 {
            return None;
        }
        Some(DirectoryNode {
            prefix: self.prefix.clone(),
            levels: self.levels[..self.levels.len() - 1].to_vec(),
            config: self.config.clone(),
        })
    }

    fn check_arity(&self, locator: &Locator, expected: usize) -> Result<()> {
        if locator.len() != expected {
            return Err(Error::Arity {
                locator: locator.clone(),
                expected,
                actual: locator.len(),
            });
        }
        Ok(())
    }

    fn build_path(&self, levels: &[LevelLayout], components: &[Loc]) -> PathBuf {
        let mut path = self.prefix.clone();
        let mut components = components.iter();
        for level in levels {
            if let Some(segment) = &level.segment {
                path.push(segment);
            }
            for component in components.by_ref().take(level.arity) {
                path.push(codec::encode(component));
            }
        }
        path
    }

    /// Absolute directory of the node addressed by `locator`. No I/O.
    pub fn path(&self, locator: &Locator) -> Result<PathBuf> {
        self.check_arity(locator, self.arity())?;
        Ok(self.build_path(&self.levels, locator.components()))
    }

    /// Directory holding every node of this level under the parent locator:
    /// the parent's directory plus this level's fixed segment.
    pub fn container(&self, parent: &Locator) -> Result<PathBuf> {
        self.check_arity(parent, self.arity() - self.level_arity())?;
        let depth = self.depth();
        let mut path = self.build_path(&self.levels[..depth], parent.components());
        if let Some(segment) = &self.levels[depth].segment {
            path.push(segment);
        }
        Ok(path)
    }

    fn sentinel(&self, dir: &Path) -> PathBuf {
        dir.join(&self.config.sentinel_name)
    }

    /// True when the directory exists and was created as a node, not merely
    /// as an intermediate directory of a deeper node.
    pub fn exists(&self, locator: &Locator) -> Result<bool> {
        let path = self.path(locator)?;
        Ok(path.is_dir() && self.sentinel(&path).is_file())
    }

    /// Create the node's directory (and any missing ancestors) and mark it.
    /// Creating an existing node does nothing.
    pub fn create(&self, locator: &Locator) -> Result<()> {
        let path = self.path(locator)?;
        let sentinel = self.sentinel(&path);
        if sentinel.is_file() {
            return Ok(());
        }

        fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        atomic::write_atomic(&sentinel, b"", &self.config.temp_prefix)?;

        log::debug!("Created node {} at {}", locator, path.display());
        Ok(())
    }

    /// Unmark the node and delete its directory if nothing else is in it.
    pub fn remove(&self, locator: &Locator, removal: Removal) -> Result<()> {
        let path = self.path(locator)?;
        removal.check(&format!("node {}", locator), &path)?;
        if !self.exists(locator)? {
            return Err(Error::not_found(format!("node {}", locator), &path));
        }

        let sentinel = self.sentinel(&path);
        fs::remove_file(&sentinel).map_err(|e| Error::io(&sentinel, e))?;

        let mut entries = fs::read_dir(&path).map_err(|e| Error::io(&path, e))?;
        if entries.next().is_none() {
            fs::remove_dir(&path).map_err(|e| Error::io(&path, e))?;
            log::debug!("Removed node {} and {}", locator, path.display());
        } else {
            log::debug!("Removed node {}; {} kept for its contents", locator, path.display());
        }
        Ok(())
    }

    /// Locators of the nodes of this level that exist under `parent`,
    /// ordered by their encoded path segments.
    ///
    /// Directories whose names are not valid locator segments are skipped.
    pub fn existing(&self, parent: &Locator) -> Result<Vec<Locator>> {
        let base = self.container(parent)?;
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let arity = self.level_arity();
        let mut found = Vec::new();
        let walker = WalkDir::new(&base)
            .min_depth(arity)
            .max_depth(arity)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&base).to_path_buf();
                Error::io(path, e.into())
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&base) else {
                continue;
            };
            let segments: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let suffix = match codec::decode_segments(&segments) {
                Ok(suffix) => suffix,
                Err(e) => {
                    log::warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let locator = parent.concat(&suffix);
            if self.exists(&locator)? {
                found.push(locator);
            }
        }
        Ok(found)
    }

    /// Draw an identifier not used by any child directory of this level
    /// under `parent`.
    pub fn generate_id(&self, parent: &Locator, kind: IdKind) -> Result<Loc> {
        let base = self.container(parent)?;
        ident::generate_new_id_in(&base, kind, &self.config)
    }
}

/// Documents for a level live in its container directory, keyed by the
/// level's own components.
impl DocumentLayout for DirectoryNode {
    fn arity(&self) -> usize {
        DirectoryNode::arity(self)
    }

    fn key_arity(&self) -> usize {
        self.level_arity()
    }

    fn document_dir(&self, prefix: &Locator) -> Result<PathBuf> {
        self.container(prefix)
    }
}
