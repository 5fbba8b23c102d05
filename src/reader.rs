//! The reader facade.
//!
//! `MagicDrawReader` ties the pieces together:
//!
//! ```text
//! open(dir) ──► Unpacker::unpack_all ──► [Unpacked]
//!                                            │  first accessor call
//!                                            ▼
//!                                   DocumentSet::load (once)
//!                                            │
//!        classes() / associations() / diagrams() / ... (each once)
//! ```
//!
//! Unpacking happens at construction. Documents are loaded by the first
//! accessor that needs them; each collection is computed on first request
//! and cached for the lifetime of the reader. A failed document load is not
//! cached, so the next call tries again.
//!
//! # Usage
//!
//! ```ignore
//! use mdzip::{MagicDrawReader, MemoryLog, ReaderConfig};
//! use std::sync::Arc;
//!
//! let log = Arc::new(MemoryLog::new());
//! let reader = MagicDrawReader::open("models/", ReaderConfig::default(), log.clone())?;
//! for (id, name) in reader.classes()? {
//!     println!("{id}: {name}");
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::archive::{Unpacked, Unpacker};
use crate::config::ReaderConfig;
use crate::document::DocumentSet;
use crate::error::ReaderError;
use crate::extract::{
    AssociationTables, Associations, Attributes, Classes, Constraints, Dependencies, Diagrams,
    Extraction, Extractor, Fragments, Lifelines, Messages, Objects, Partitions, Skipped,
};
use crate::log::{ModelLog, TracingLog, timestamped};
use crate::model::{
    Association, Constraint, ConstraintMap, Diagram, DiagramKey, DiagramObject, Fragment, IdMap,
    Message, OwnedAttribute, TextMap,
};

type Cell<T> = OnceCell<Extraction<T>>;

/// Reads every MagicDraw archive in a directory and exposes the model
/// entities found in them.
pub struct MagicDrawReader {
    source: PathBuf,
    config: ReaderConfig,
    log: Arc<dyn ModelLog>,
    unpacked: Vec<Unpacked>,
    documents: OnceCell<DocumentSet>,

    classes: Cell<TextMap>,
    associations: Cell<Vec<Association>>,
    diagrams: Cell<IndexMap<DiagramKey, Diagram>>,
    objects: Cell<TextMap>,
    partitions: Cell<IdMap>,
    dependencies: Cell<IdMap>,
    constraints: Cell<ConstraintMap>,
    fragments: Cell<Vec<Fragment>>,
    messages: Cell<Vec<Message>>,
    lifelines: Cell<IdMap>,
    association_tables: Cell<TextMap>,
    attributes: Cell<Vec<OwnedAttribute>>,
}

impl fmt::Debug for MagicDrawReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagicDrawReader")
            .field("source", &self.source)
            .field("unpacked", &self.unpacked)
            .field("documents_loaded", &self.documents.get().is_some())
            .finish_non_exhaustive()
    }
}

impl MagicDrawReader {
    /// Unpack every archive in `source` into the scratch root.
    ///
    /// Fails if `source` is not a directory or an archive cannot be extracted.
    pub fn open(
        source: impl AsRef<Path>,
        config: ReaderConfig,
        log: Arc<dyn ModelLog>,
    ) -> Result<Self, ReaderError> {
        let source = source.as_ref();
        let unpacked = Unpacker::new(&config).unpack_all(source)?;
        for archive in &unpacked {
            log.log(&timestamped(&format!(
                "Unpacked '{}' to '{}'",
                archive.archive.display(),
                archive.directory.display()
            )));
        }
        Ok(Self::with_state(source.to_path_buf(), config, log, unpacked))
    }

    /// [`open`](Self::open) with the default configuration, logging through `tracing`.
    pub fn with_defaults(source: impl AsRef<Path>) -> Result<Self, ReaderError> {
        Self::open(source, ReaderConfig::default(), Arc::new(TracingLog))
    }

    /// Reader over documents that are already loaded. Nothing is unpacked.
    pub fn from_documents(documents: DocumentSet, config: ReaderConfig, log: Arc<dyn ModelLog>) -> Self {
        let reader = Self::with_state(PathBuf::new(), config, log, Vec::new());
        // A fresh cell cannot be occupied.
        let _ = reader.documents.set(documents);
        reader
    }

    fn with_state(
        source: PathBuf,
        config: ReaderConfig,
        log: Arc<dyn ModelLog>,
        unpacked: Vec<Unpacked>,
    ) -> Self {
        Self {
            source,
            config,
            log,
            unpacked,
            documents: OnceCell::new(),
            classes: OnceCell::new(),
            associations: OnceCell::new(),
            diagrams: OnceCell::new(),
            objects: OnceCell::new(),
            partitions: OnceCell::new(),
            dependencies: OnceCell::new(),
            constraints: OnceCell::new(),
            fragments: OnceCell::new(),
            messages: OnceCell::new(),
            lifelines: OnceCell::new(),
            association_tables: OnceCell::new(),
            attributes: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Archives extracted by this reader.
    pub fn unpacked(&self) -> &[Unpacked] {
        &self.unpacked
    }

    // ========================================================================
    // DOCUMENTS
    // ========================================================================

    /// Every primary and shared model payload, loaded on first call.
    pub fn documents(&self) -> Result<&DocumentSet, ReaderError> {
        self.documents.get_or_try_init(|| {
            let documents = DocumentSet::load(&self.unpacked, &self.config)?;
            for key in documents.keys() {
                self.log.log(&timestamped(&format!("Loaded source file '{key}'")));
            }
            Ok(documents)
        })
    }

    fn run<'a, E: Extractor>(
        &'a self,
        cell: &'a Cell<E::Output>,
        extractor: E,
    ) -> Result<&'a Extraction<E::Output>, ReaderError> {
        if let Some(done) = cell.get() {
            return Ok(done);
        }
        let documents = self.documents()?;
        Ok(cell.get_or_init(|| {
            let extraction = extractor.extract(documents);
            self.report(&extraction);
            extraction
        }))
    }

    fn report<T>(&self, extraction: &Extraction<T>) {
        for line in &extraction.trace {
            self.log.log(&timestamped(line));
        }
        for skipped in &extraction.skipped {
            tracing::warn!("{skipped}");
            self.log.log(&timestamped(&skipped.to_string()));
        }
        tracing::debug!(
            "Pass {} done: {} trace line(s), {} skipped",
            extraction.pass,
            extraction.trace.len(),
            extraction.skipped.len()
        );
    }

    // ========================================================================
    // COLLECTIONS
    // ========================================================================

    /// Class id → class name.
    pub fn classes(&self) -> Result<&TextMap, ReaderError> {
        Ok(&self.run(&self.classes, Classes)?.value)
    }

    pub fn associations(&self) -> Result<&[Association], ReaderError> {
        Ok(&self.run(&self.associations, Associations)?.value)
    }

    /// Diagrams that have at least one layout object, keyed by owner and name.
    pub fn diagrams(&self) -> Result<&IndexMap<DiagramKey, Diagram>, ReaderError> {
        let extractor = Diagrams::new(self.config.layout_namespaces.clone());
        Ok(&self.run(&self.diagrams, extractor)?.value)
    }

    /// Every object of every diagram, diagram by diagram.
    pub fn diagram_objects(&self) -> Result<impl Iterator<Item = &DiagramObject>, ReaderError> {
        Ok(self.diagrams()?.values().flat_map(|d| d.objects.iter()))
    }

    /// Central buffer node id → state name.
    pub fn objects(&self) -> Result<&TextMap, ReaderError> {
        Ok(&self.run(&self.objects, Objects)?.value)
    }

    /// Activity partition id → represented element id.
    pub fn partitions(&self) -> Result<&IdMap, ReaderError> {
        Ok(&self.run(&self.partitions, Partitions)?.value)
    }

    /// Dependency client id → supplier id.
    pub fn dependencies(&self) -> Result<&IdMap, ReaderError> {
        Ok(&self.run(&self.dependencies, Dependencies)?.value)
    }

    /// Constraints on a class; empty when it has none.
    pub fn constraints(&self, class_id: &str) -> Result<&[Constraint], ReaderError> {
        let all = &self.run(&self.constraints, Constraints)?.value;
        Ok(all.get(class_id).map(Vec::as_slice).unwrap_or_default())
    }

    pub fn fragments(&self) -> Result<&[Fragment], ReaderError> {
        Ok(&self.run(&self.fragments, Fragments)?.value)
    }

    pub fn messages(&self) -> Result<&[Message], ReaderError> {
        Ok(&self.run(&self.messages, Messages)?.value)
    }

    /// Lifeline id → classifier id.
    pub fn lifelines(&self) -> Result<&IdMap, ReaderError> {
        Ok(&self.run(&self.lifelines, Lifelines)?.value)
    }

    /// Class id → HTML association table.
    pub fn association_tables(&self) -> Result<&TextMap, ReaderError> {
        Ok(&self.run(&self.association_tables, AssociationTables)?.value)
    }

    /// Class attributes that are not association ends.
    pub fn attributes(&self) -> Result<&[OwnedAttribute], ReaderError> {
        Ok(&self.run(&self.attributes, Attributes)?.value)
    }

    /// Nodes dropped by the passes computed so far.
    pub fn skipped(&self) -> Vec<&Skipped> {
        let mut all = Vec::new();
        macro_rules! collect {
            ($($cell:ident),*) => {
                $(if let Some(e) = self.$cell.get() {
                    all.extend(e.skipped.iter());
                })*
            };
        }
        collect!(
            classes,
            associations,
            diagrams,
            objects,
            partitions,
            dependencies,
            constraints,
            fragments,
            messages,
            lifelines,
            association_tables,
            attributes
        );
        all
    }

    // ========================================================================
    // SNAPSHOT
    // ========================================================================

    /// Run every pass, in parallel, and return an owned copy of the results.
    pub fn extract_all(&self) -> Result<ExtractedModel, ReaderError> {
        let documents = self.documents()?;

        rayon::scope(|s| {
            s.spawn(|_| drop(self.classes()));
            s.spawn(|_| drop(self.associations()));
            s.spawn(|_| drop(self.diagrams()));
            s.spawn(|_| drop(self.objects()));
            s.spawn(|_| drop(self.partitions()));
            s.spawn(|_| drop(self.dependencies()));
            s.spawn(|_| drop(self.constraints("")));
            s.spawn(|_| drop(self.fragments()));
            s.spawn(|_| drop(self.messages()));
            s.spawn(|_| drop(self.lifelines()));
            s.spawn(|_| drop(self.association_tables()));
            s.spawn(|_| drop(self.attributes()));
        });

        Ok(ExtractedModel {
            documents: documents.keys().collect(),
            classes: self.classes()?.clone(),
            associations: self.associations()?.to_vec(),
            diagrams: self.diagrams()?.values().cloned().collect(),
            objects: self.objects()?.clone(),
            partitions: self.partitions()?.clone(),
            dependencies: self.dependencies()?.clone(),
            constraints: self.run(&self.constraints, Constraints)?.value.clone(),
            fragments: self.fragments()?.to_vec(),
            messages: self.messages()?.to_vec(),
            lifelines: self.lifelines()?.clone(),
            association_tables: self.association_tables()?.clone(),
            attributes: self.attributes()?.to_vec(),
            skipped: self.skipped().into_iter().cloned().collect(),
        })
    }
}

/// Owned snapshot of everything a reader extracted.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ExtractedModel {
    /// Keys of the loaded documents, e.g. `Project.mdzip_Model`.
    pub documents: Vec<String>,
    pub classes: TextMap,
    pub associations: Vec<Association>,
    pub diagrams: Vec<Diagram>,
    pub objects: TextMap,
    pub partitions: IdMap,
    pub dependencies: IdMap,
    pub constraints: ConstraintMap,
    pub fragments: Vec<Fragment>,
    pub messages: Vec<Message>,
    pub lifelines: IdMap,
    pub association_tables: TextMap,
    pub attributes: Vec<OwnedAttribute>,
    pub skipped: Vec<Skipped>,
}

#[cfg(feature = "json")]
impl ExtractedModel {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
