//! # mdzip-reader
//!
//! Extraction engine for MagicDraw project archives (`.mdzip`): unpacks the
//! archives in a directory, parses their XMI payloads and diagram layouts,
//! and rebuilds a typed, cross-referenced model.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! reader    → MagicDrawReader: lazy, memoized collections
//!   ↓
//! extract   → One extraction pass per entity kind
//!   ↓
//! model     → Classes, associations, diagrams, sequence and activity entities
//!   ↓
//! resolve   → href / idref reference resolution
//!   ↓
//! document  → Source documents and the cross-document id index
//!   ↓
//! archive   → Unpacking into scratch directories
//!   ↓
//! xml       → Arena XML tree, namespace context
//!   ↓
//! config, error, log
//! ```

// ============================================================================
// MODULES (dependency order: xml → archive → document → resolve → model → extract → reader)
// ============================================================================

/// Reader configuration: scratch root, payload names, layout namespaces
pub mod config;

/// Fatal reader errors and per-node skip reasons
pub mod error;

/// Diagnostic sink for the target model
pub mod log;

/// XML tree built from quick-xml events
pub mod xml;

/// Archive unpacking
pub mod archive;

/// Source documents and the document set
pub mod document;

/// Cross-reference resolution
pub mod resolve;

/// Extracted entity types
pub mod model;

/// Extraction passes
pub mod extract;

/// The reader facade
pub mod reader;

pub use config::ReaderConfig;
pub use document::{DocumentKey, DocumentRole, DocumentSet, SourceDocument};
pub use error::{ReaderError, SkipReason};
pub use extract::{Extraction, Extractor, Pass, Skipped};
pub use log::{MemoryLog, ModelLog, TracingLog};
pub use model::{
    AggregationKind, Association, AssociationEnd, Constraint, Diagram, DiagramKey, DiagramObject,
    ElementId, Fragment, Message, OwnedAttribute,
};
pub use reader::{ExtractedModel, MagicDrawReader};
