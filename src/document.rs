//! Source documents and the document set.
//!
//! Each scratch subdirectory may hold a primary model and a shared model
//! payload. Both are parsed into [`XmlTree`]s and registered under a key of
//! the form `<archive-name>_Model` / `<archive-name>_SharedModel`.
//!
//! Identifiers are global: a reference in one document may point at an
//! element defined in another. The set therefore keeps one id index across
//! all documents, built once at load time.
//!
//! ```text
//! DocumentSet
//! ├── documents: Vec<SourceDocument>   (load order)
//! └── ids: FxHashMap<id, (doc, node)>  (first definition wins)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::archive::Unpacked;
use crate::config::ReaderConfig;
use crate::error::{ReaderError, XmlError};
use crate::xml::{Node, NodeId, XmlTree};

// ============================================================================
// KEYS
// ============================================================================

/// Which payload a document came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentRole {
    Model,
    SharedModel,
}

impl DocumentRole {
    pub fn suffix(self) -> &'static str {
        match self {
            DocumentRole::Model => "Model",
            DocumentRole::SharedModel => "SharedModel",
        }
    }
}

/// Document key: archive (scratch subdirectory) name plus role.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey {
    pub archive: String,
    pub role: DocumentRole,
}

impl DocumentKey {
    pub fn new(archive: impl Into<String>, role: DocumentRole) -> Self {
        Self {
            archive: archive.into(),
            role,
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.archive, self.role.suffix())
    }
}

// ============================================================================
// DOCUMENTS
// ============================================================================

/// One parsed payload file. Immutable after load.
#[derive(Debug)]
pub struct SourceDocument {
    key: DocumentKey,
    base_dir: PathBuf,
    tree: XmlTree,
}

impl SourceDocument {
    /// Parse a document from memory. `base_dir` is where its layout
    /// companions are looked up.
    pub fn parse(
        key: DocumentKey,
        input: &[u8],
        base_dir: impl Into<PathBuf>,
    ) -> Result<Self, XmlError> {
        Ok(Self {
            key,
            base_dir: base_dir.into(),
            tree: XmlTree::parse(input)?,
        })
    }

    /// Read and parse a payload file.
    pub fn load(key: DocumentKey, path: &Path) -> Result<Self, ReaderError> {
        let bytes = std::fs::read(path).map_err(|e| ReaderError::io(path, e))?;
        let base_dir = path.parent().unwrap_or(path).to_path_buf();
        let doc = Self::parse(key, &bytes, base_dir).map_err(|e| e.at(path))?;
        tracing::trace!("Parsed {} ({} elements)", doc.key, doc.tree.len());
        Ok(doc)
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// Directory the document was read from.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }
}

// ============================================================================
// DOCUMENT SET
// ============================================================================

/// All loaded documents with a cross-document id index.
#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: Vec<SourceDocument>,
    ids: FxHashMap<SmolStr, (usize, NodeId)>,
}

impl DocumentSet {
    /// Build a set from already parsed documents. Later documents with a key
    /// already present are ignored.
    pub fn new(documents: impl IntoIterator<Item = SourceDocument>) -> Self {
        let mut set = Self::default();
        for doc in documents {
            if set.get(&doc.key.to_string()).is_some() {
                tracing::warn!("Ignoring duplicate document {}", doc.key);
                continue;
            }
            set.documents.push(doc);
        }
        set.index();
        set
    }

    /// Load the payloads of every unpacked archive.
    ///
    /// Missing payload files are fine; unreadable or malformed ones are fatal.
    pub fn load(unpacked: &[Unpacked], config: &ReaderConfig) -> Result<Self, ReaderError> {
        let mut candidates = Vec::new();
        for archive in unpacked {
            for (role, file_name) in [
                (DocumentRole::Model, &config.model_file),
                (DocumentRole::SharedModel, &config.shared_model_file),
            ] {
                let path = archive.directory.join(file_name);
                if path.is_file() {
                    candidates.push((DocumentKey::new(archive.name(), role), path));
                } else {
                    tracing::trace!("{} has no {}", archive.name(), file_name);
                }
            }
        }

        let documents = candidates
            .into_par_iter()
            .map(|(key, path)| SourceDocument::load(key, &path))
            .collect::<Result<Vec<_>, _>>()?;

        let set = Self::new(documents);
        tracing::debug!(
            "Loaded {} document(s) with {} identified elements",
            set.len(),
            set.ids.len()
        );
        Ok(set)
    }

    fn index(&mut self) {
        self.ids.clear();
        for (doc_index, doc) in self.documents.iter().enumerate() {
            for node in doc.tree.elements() {
                if let Some(id) = node.xmi_id().filter(|id| !id.is_empty()) {
                    self.ids
                        .entry(SmolStr::new(id))
                        .or_insert((doc_index, node.id()));
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDocument> {
        self.documents.iter()
    }

    /// Document by its string key, e.g. `Project.mdzip_Model`.
    pub fn get(&self, key: &str) -> Option<&SourceDocument> {
        self.documents.iter().find(|d| d.key.to_string() == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.documents.iter().map(|d| d.key.to_string())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Element with this `xmi:id`, searched across every document.
    pub fn find_by_id(&self, id: &str) -> Option<Node<'_>> {
        let &(doc, node) = self.ids.get(id)?;
        Some(self.documents[doc].tree.node(node))
    }

    /// Like [`find_by_id`](Self::find_by_id) but only if the element has the given name.
    pub fn find_by_id_named(&self, id: &str, name: &str) -> Option<Node<'_>> {
        self.find_by_id(id).filter(|n| n.is(name))
    }

    /// Every element with this qualified name, document by document.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Node<'a>> {
        self.documents
            .iter()
            .flat_map(move |d| d.tree.elements_named(name))
    }

    /// Every element with this local name, whatever its prefix.
    pub fn elements_local<'a>(&'a self, local: &'a str) -> impl Iterator<Item = Node<'a>> {
        self.documents
            .iter()
            .flat_map(|d| d.tree.elements())
            .filter(move |n| n.local_name() == local)
    }
}
