use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::Value as JsonValue;

use locfs_core::codec;
use locfs_core::{Error, Format, FsConfig, Locator, Removal, Result};

use crate::document::{Document, DocumentSlot};
use crate::json_utils;

/// Where documents live for a family of locators.
///
/// A locator of `arity()` components splits into a prefix, which selects the
/// directory holding the document, and a key of the last `key_arity()`
/// components, which selects the entry inside it.
pub trait DocumentLayout {
    fn arity(&self) -> usize;

    fn key_arity(&self) -> usize;

    /// Directory holding the document for a prefix of
    /// `arity() - key_arity()` components.
    fn document_dir(&self, prefix: &Locator) -> Result<PathBuf>;
}

/// A layout with a single document in a fixed directory, keyed by the whole
/// locator.
#[derive(Clone, Debug)]
pub struct FixedDir {
    dir: PathBuf,
    key_arity: usize,
}

impl FixedDir {
    pub fn new(dir: impl Into<PathBuf>, key_arity: usize) -> Self {
        FixedDir {
            dir: dir.into(),
            key_arity,
        }
    }
}

impl DocumentLayout for FixedDir {
    fn arity(&self) -> usize {
        self.key_arity
    }

    fn key_arity(&self) -> usize {
        self.key_arity
    }

    fn document_dir(&self, _prefix: &Locator) -> Result<PathBuf> {
        Ok(self.dir.clone())
    }
}

/// Nests the documents of a layout inside one entry of another document.
///
/// A document that would live in a directory under `root` is kept instead as
/// a value of the `key` entry of the document in `root` itself. The value's
/// field is the directory's path relative to `root`, with `/` separators.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonLayer {
    root: PathBuf,
    key: Locator,
}

impl JsonLayer {
    pub fn new(root: impl Into<PathBuf>, key: Locator) -> Self {
        JsonLayer {
            root: root.into(),
            key,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key(&self) -> &Locator {
        &self.key
    }

    fn slot(&self, dir: &Path, document_name: &str) -> Result<DocumentSlot> {
        let relative = dir.strip_prefix(&self.root).map_err(|_| {
            Error::integrity(
                dir.display().to_string(),
                format!("outside the JSON layer rooted at {}", self.root.display()),
            )
        })?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let field = if parts.is_empty() {
            ".".to_string()
        } else {
            parts.join("/")
        };
        Ok(DocumentSlot::Nested {
            file: self.root.join(document_name),
            key: codec::encode_suffix(&self.key),
            field,
        })
    }
}

/// The documents of one layout, independent of any value name.
#[derive(Clone, Debug)]
pub struct DocumentSite<L> {
    layout: L,
    layer: Option<JsonLayer>,
    config: FsConfig,
}

impl<L: DocumentLayout> DocumentSite<L> {
    pub fn new(layout: L, config: FsConfig) -> Self {
        DocumentSite {
            layout,
            layer: None,
            config,
        }
    }

    /// Keep every document of this site inside `layer` instead of in files
    /// of its own.
    #[must_use]
    pub fn with_layer(mut self, layer: JsonLayer) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layer(&self) -> Option<&JsonLayer> {
        self.layer.as_ref()
    }

    /// A store for values named `name` in this site's documents.
    pub fn store(&self, name: impl Into<String>) -> DocumentStore<L>
    where
        L: Clone,
    {
        DocumentStore {
            name: name.into(),
            site: self.clone(),
        }
    }

    /// Where the document shared by every locator under `prefix` is kept.
    pub fn slot(&self, prefix: &Locator) -> Result<DocumentSlot> {
        let expected = self.layout.arity() - self.layout.key_arity();
        if prefix.len() != expected {
            return Err(Error::Arity {
                locator: prefix.clone(),
                expected,
                actual: prefix.len(),
            });
        }
        let dir = self.layout.document_dir(prefix)?;
        match &self.layer {
            None => Ok(DocumentSlot::File(dir.join(&self.config.document_name))),
            Some(layer) => layer.slot(&dir, &self.config.document_name),
        }
    }

    /// Path of the file holding the document for `prefix`. For a layered
    /// site this is the enclosing document.
    pub fn path(&self, prefix: &Locator) -> Result<PathBuf> {
        Ok(self.slot(prefix)?.file().to_path_buf())
    }

    fn locate(&self, locator: &Locator) -> Result<(DocumentSlot, String)> {
        let arity = self.layout.arity();
        if locator.len() != arity {
            return Err(Error::Arity {
                locator: locator.clone(),
                expected: arity,
                actual: locator.len(),
            });
        }
        let (prefix, key) = locator.split_at(arity - self.layout.key_arity());
        Ok((self.slot(&prefix)?, codec::encode_suffix(&key)))
    }

    /// Write an empty document under `prefix` unless one is already there.
    /// The directory must exist.
    pub fn create(&self, prefix: &Locator) -> Result<()> {
        let slot = self.slot(prefix)?;
        if slot.is_present()? {
            return Ok(());
        }
        slot.save(&Document::default(), &self.config.temp_prefix)?;
        log::debug!("Created document {}", slot);
        Ok(())
    }

    /// Full locators under `prefix` with at least one value, whatever its
    /// name, in key order.
    pub fn existing(&self, prefix: &Locator) -> Result<Vec<Locator>> {
        let document = self.slot(prefix)?.load()?;
        decode_keys(prefix, document.keys())
    }
}

fn decode_keys<'a>(prefix: &Locator, keys: impl Iterator<Item = &'a str>) -> Result<Vec<Locator>> {
    keys.map(|key| Ok(prefix.concat(&codec::decode_suffix(key)?)))
        .collect()
}

/// Named values for many locators, merged into one JSON document per
/// directory.
///
/// Every write loads the current document, merges the new entry and
/// atomically replaces the file. The store keeps no state between calls, so
/// two stores over the same layout see each other's writes.
#[derive(Clone, Debug)]
pub struct DocumentStore<L> {
    name: String,
    site: DocumentSite<L>,
}

impl<L: DocumentLayout> DocumentStore<L> {
    pub fn new(name: impl Into<String>, layout: L, config: FsConfig) -> Self {
        DocumentStore {
            name: name.into(),
            site: DocumentSite::new(layout, config),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &L {
        self.site.layout()
    }

    pub fn site(&self) -> &DocumentSite<L> {
        &self.site
    }

    fn temp_prefix(&self) -> &str {
        &self.site.config.temp_prefix
    }

    /// Path of the document shared by every locator under `prefix`.
    pub fn path(&self, prefix: &Locator) -> Result<PathBuf> {
        self.site.path(prefix)
    }

    fn entry_name(&self, locator: &Locator) -> String {
        format!("document entry '{}' for {}", self.name, locator)
    }

    /// True when the document holds a value for `locator` under this name.
    pub fn exists(&self, locator: &Locator) -> Result<bool> {
        let (slot, key) = self.site.locate(locator)?;
        Ok(slot.load()?.get(&key, &self.name).is_some())
    }

    /// Write one value. Nothing on disk changes if `value` cannot be
    /// represented as JSON.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T, locator: &Locator) -> Result<()> {
        let (slot, key) = self.site.locate(locator)?;
        let value = json_utils::to_json_value(value)?;

        let mut document = slot.load_for_update()?;
        document.insert(key, self.name.as_str(), value);
        slot.save(&document, self.temp_prefix())?;

        log::debug!("Wrote '{}' for {} to {}", self.name, locator, slot);
        Ok(())
    }

    pub fn read<T: DeserializeOwned>(&self, locator: &Locator) -> Result<T> {
        let (slot, key) = self.site.locate(locator)?;
        let document = slot.load()?;
        let value = document
            .get(&key, &self.name)
            .ok_or_else(|| Error::not_found(self.entry_name(locator), slot.file()))?;
        self.decode(value, locator, slot.file())
    }

    fn decode<T: DeserializeOwned>(
        &self,
        value: &JsonValue,
        locator: &Locator,
        path: &Path,
    ) -> Result<T> {
        serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
            format: Format::JSON,
            path: path.to_path_buf(),
            message: format!("{}: {}", self.entry_name(locator), e),
        })
    }

    /// Remove one entry from its document.
    pub fn remove(&self, locator: &Locator, removal: Removal) -> Result<()> {
        let (slot, key) = self.site.locate(locator)?;
        removal.check(&self.entry_name(locator), slot.file())?;

        let mut document = slot.load()?;
        if document.remove(&key, &self.name).is_none() {
            return Err(Error::not_found(self.entry_name(locator), slot.file()));
        }
        slot.save(&document, self.temp_prefix())?;

        log::debug!("Removed '{}' for {} from {}", self.name, locator, slot);
        Ok(())
    }

    /// Write many values, loading and saving each affected document once.
    ///
    /// Every value is serialized before any document is touched. The first
    /// failure is returned with the index and locator of its item.
    pub fn write_all<T: Serialize>(&self, items: &[(T, Locator)]) -> Result<()> {
        let batch = |index: usize, locator: &Locator, source: Error| Error::Batch {
            index,
            locator: locator.clone(),
            source: Box::new(source),
        };

        // Grouped by document; each group keeps its items in input order.
        let mut groups: BTreeMap<DocumentSlot, Vec<(usize, String, JsonValue)>> = BTreeMap::new();
        for (index, (value, locator)) in items.iter().enumerate() {
            let (slot, key) = self.site.locate(locator).map_err(|e| batch(index, locator, e))?;
            let value = json_utils::to_json_value(value).map_err(|e| batch(index, locator, e))?;
            groups.entry(slot).or_default().push((index, key, value));
        }

        for (slot, entries) in groups {
            let first = entries[0].0;
            let mut document = slot
                .load_for_update()
                .map_err(|e| batch(first, &items[first].1, e))?;
            for (_, key, value) in entries {
                document.insert(key, self.name.as_str(), value);
            }
            slot.save(&document, self.temp_prefix())
                .map_err(|e| batch(first, &items[first].1, e))?;
        }

        log::debug!("Wrote {} '{}' entries", items.len(), self.name);
        Ok(())
    }

    /// Read many values in input order. The first failure is returned with
    /// the index and locator of its item.
    pub fn read_all<T: DeserializeOwned>(&self, locators: &[Locator]) -> Result<Vec<T>> {
        let mut documents: BTreeMap<DocumentSlot, Document> = BTreeMap::new();
        let mut values = Vec::with_capacity(locators.len());

        for (index, locator) in locators.iter().enumerate() {
            let value = self
                .read_cached(locator, &mut documents)
                .map_err(|source| Error::Batch {
                    index,
                    locator: locator.clone(),
                    source: Box::new(source),
                })?;
            values.push(value);
        }
        Ok(values)
    }

    fn read_cached<T: DeserializeOwned>(
        &self,
        locator: &Locator,
        documents: &mut BTreeMap<DocumentSlot, Document>,
    ) -> Result<T> {
        let (slot, key) = self.site.locate(locator)?;
        if !documents.contains_key(&slot) {
            let document = slot.load()?;
            documents.insert(slot.clone(), document);
        }
        let value = documents
            .get(&slot)
            .and_then(|document| document.get(&key, &self.name))
            .ok_or_else(|| Error::not_found(self.entry_name(locator), slot.file()))?;
        self.decode(value, locator, slot.file())
    }

    /// Full locators under `prefix` that hold a value under this name, in
    /// key order.
    pub fn existing(&self, prefix: &Locator) -> Result<Vec<Locator>> {
        let document = self.site.slot(prefix)?.load()?;
        decode_keys(prefix, document.keys_with(&self.name))
    }

    /// Write an empty document under `prefix` unless one is already there.
    pub fn create(&self, prefix: &Locator) -> Result<()> {
        self.site.create(prefix)
    }
}
