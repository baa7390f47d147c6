//! Node chains: the ordered nodes of a schema, with their artifact
//! registries.

use std::collections::BTreeMap;
use std::ops::Index;
use std::path::PathBuf;

use locfs_core::ident::IdKind;
use locfs_core::{Error, Format, FsConfig, Loc, Locator, Removal, Result};
use locfs_json_store::{DocumentSite, DocumentStore, JsonLayer};

use crate::file::ArtifactFile;
use crate::node::{DirectoryNode, LevelLayout};

/// A named artifact attached to a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    pub format: Format,
    pub file_name: String,
}

impl ArtifactSpec {
    /// An artifact stored as `<name>.<extension>`.
    pub fn new(name: impl Into<String>, format: Format) -> Self {
        let name = name.into();
        let file_name = format!("{}.{}", name, format.extension());
        ArtifactSpec {
            name,
            format,
            file_name,
        }
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

/// Static description of one level of a schema.
///
/// ```rust
/// use locfs::LevelSpec;
/// use locfs_core::Format;
///
/// let level = LevelSpec::new(3)
///     .segment("THY")
///     .file("energy", Format::SCALAR)
///     .document("energy");
/// assert_eq!(level.arity(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelSpec {
    segment: Option<String>,
    arity: usize,
    files: Vec<ArtifactSpec>,
    documents: Vec<ArtifactSpec>,
}

impl LevelSpec {
    /// A level consuming `arity` locator components.
    pub fn new(arity: usize) -> Self {
        LevelSpec {
            arity,
            ..LevelSpec::default()
        }
    }

    /// The depth-0 level, addressed by the empty locator.
    pub fn root() -> Self {
        LevelSpec::new(0)
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Fixed directory name placed before this level's components.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    #[must_use]
    pub fn file(self, name: impl Into<String>, format: Format) -> Self {
        self.file_spec(ArtifactSpec::new(name, format))
    }

    #[must_use]
    pub fn file_spec(mut self, spec: ArtifactSpec) -> Self {
        self.files.push(spec);
        self
    }

    /// A value kept in the level's consolidated document.
    #[must_use]
    pub fn document(mut self, name: impl Into<String>) -> Self {
        self.documents.push(ArtifactSpec::new(name, Format::JSON));
        self
    }
}

/// One node of a chain: its directory plus the artifacts registered at its
/// depth.
#[derive(Clone, Debug)]
pub struct ChainNode {
    dir: DirectoryNode,
    files: BTreeMap<String, ArtifactFile>,
    site: DocumentSite<DirectoryNode>,
    documents: BTreeMap<String, DocumentStore<DirectoryNode>>,
}

impl ChainNode {
    fn new(dir: DirectoryNode, level: &LevelSpec, layer: Option<&JsonLayer>) -> Self {
        let files = level
            .files
            .iter()
            .map(|spec| (spec.name.clone(), ArtifactFile::new(dir.clone(), spec.clone())))
            .collect();
        let mut site = DocumentSite::new(dir.clone(), dir.config().clone());
        if let Some(layer) = layer {
            site = site.with_layer(layer.clone());
        }
        let documents = level
            .documents
            .iter()
            .map(|spec| (spec.name.clone(), site.store(spec.name.clone())))
            .collect();
        ChainNode {
            dir,
            files,
            site,
            documents,
        }
    }

    pub fn dir(&self) -> &DirectoryNode {
        &self.dir
    }

    pub fn depth(&self) -> usize {
        self.dir.depth()
    }

    pub fn arity(&self) -> usize {
        self.dir.arity()
    }

    /// The file-backed artifact registered under `name`.
    pub fn file(&self, name: &str) -> Result<&ArtifactFile> {
        self.files.get(name).ok_or_else(|| Error::UnknownArtifact {
            name: name.to_string(),
            depth: self.depth(),
        })
    }

    /// The document-backed artifact registered under `name`.
    pub fn json(&self, name: &str) -> Result<&DocumentStore<DirectoryNode>> {
        self.documents
            .get(name)
            .ok_or_else(|| Error::UnknownArtifact {
                name: name.to_string(),
                depth: self.depth(),
            })
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn json_names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn path(&self, locator: &Locator) -> Result<PathBuf> {
        self.dir.path(locator)
    }

    pub fn exists(&self, locator: &Locator) -> Result<bool> {
        self.dir.exists(locator)
    }

    pub fn create(&self, locator: &Locator) -> Result<()> {
        self.dir.create(locator)
    }

    pub fn remove(&self, locator: &Locator, removal: Removal) -> Result<()> {
        self.dir.remove(locator, removal)
    }

    pub fn existing(&self, parent: &Locator) -> Result<Vec<Locator>> {
        self.dir.existing(parent)
    }

    pub fn generate_id(&self, parent: &Locator, kind: IdKind) -> Result<Loc> {
        self.dir.generate_id(parent, kind)
    }

    /// Path of the file holding the document shared by this level's nodes
    /// under `parent`.
    pub fn json_path(&self, parent: &Locator) -> Result<PathBuf> {
        self.site.path(parent)
    }

    /// Write an empty document under `parent` unless one is already there.
    pub fn json_create(&self, parent: &Locator) -> Result<()> {
        self.site.create(parent)
    }

    /// Locators under `parent` with at least one document value, whatever
    /// its name.
    pub fn json_existing(&self, parent: &Locator) -> Result<Vec<Locator>> {
        self.site.existing(parent)
    }

    /// The JSON layer this node's documents are nested in, if any.
    pub fn json_layer(&self) -> Option<&JsonLayer> {
        self.site.layer()
    }
}

/// The nodes of a schema, from the root (depth 0) to the leaf.
///
/// Built once and never modified. Node `i` is addressed by the locator
/// components of levels `1..=i`.
#[derive(Clone, Debug)]
pub struct NodeChain {
    prefix: PathBuf,
    levels: Vec<LevelSpec>,
    config: FsConfig,
    nodes: Vec<ChainNode>,
}

impl NodeChain {
    /// Build a chain under `prefix`. `levels[0]` is the root and must have
    /// arity 0.
    pub fn new(prefix: impl Into<PathBuf>, levels: Vec<LevelSpec>, config: FsConfig) -> Result<Self> {
        NodeChain::build(prefix.into(), levels, config, None)
    }

    /// The same chain with every document nested in the `key` entry of the
    /// document at the chain prefix, instead of in files of its own.
    ///
    /// With the prefix set to a tau trunk directory and `key` to a sample
    /// locator, the chain's documents become part of that sample's entry.
    pub fn with_json_layer(self, key: Locator) -> Result<Self> {
        let layer = JsonLayer::new(self.prefix.clone(), key);
        NodeChain::build(self.prefix, self.levels, self.config, Some(layer))
    }

    fn build(
        prefix: PathBuf,
        levels: Vec<LevelSpec>,
        config: FsConfig,
        layer: Option<JsonLayer>,
    ) -> Result<Self> {
        match levels.first() {
            None => return Err(Error::Depth { depth: 0, len: 0 }),
            Some(root) if root.arity != 0 => {
                return Err(Error::Arity {
                    locator: Locator::root(),
                    expected: 0,
                    actual: root.arity,
                })
            }
            Some(_) => {}
        }

        let layouts: Vec<LevelLayout> = levels
            .iter()
            .map(|level| LevelLayout {
                segment: level.segment.clone(),
                arity: level.arity,
            })
            .collect();

        let nodes = levels
            .iter()
            .enumerate()
            .map(|(depth, level)| {
                let dir =
                    DirectoryNode::new(prefix.clone(), layouts[..=depth].to_vec(), config.clone());
                ChainNode::new(dir, level, layer.as_ref())
            })
            .collect();
        Ok(NodeChain {
            prefix,
            levels,
            config,
            nodes,
        })
    }

    pub fn prefix(&self) -> &std::path::Path {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node at `depth`. Negative depths count back from the leaf, so
    /// `-1` is the leaf.
    pub fn get(&self, depth: isize) -> Result<&ChainNode> {
        let len = self.nodes.len();
        let index = if depth < 0 {
            len.checked_sub(depth.unsigned_abs())
        } else {
            Some(depth as usize)
        };
        index
            .and_then(|i| self.nodes.get(i))
            .ok_or(Error::Depth { depth, len })
    }

    pub fn root(&self) -> &ChainNode {
        &self.nodes[0]
    }

    pub fn leaf(&self) -> &ChainNode {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainNode> {
        self.nodes.iter()
    }

    /// Cumulative locator arity at `depth`.
    pub fn arity(&self, depth: isize) -> Result<usize> {
        Ok(self.get(depth)?.arity())
    }
}

impl Index<usize> for NodeChain {
    type Output = ChainNode;

    fn index(&self, depth: usize) -> &Self::Output {
        &self.nodes[depth]
    }
}
