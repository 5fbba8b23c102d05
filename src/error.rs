//! Error types for archive extraction.
//!
//! Two tiers exist. [`ReaderError`] is structural: the archive directory, an
//! archive, or one of the payload documents could not be read, and the
//! failure is returned to the caller. [`SkipReason`] is node-level: a single
//! XML node lacked something an extractor needed, so that node was dropped
//! and the pass carried on.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal errors surfaced by [`MagicDrawReader`](crate::MagicDrawReader).
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The directory holding the archives does not exist.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// IO error while touching the filesystem.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ZIP archive could not be opened or extracted.
    #[error("Archive error in {}: {message}", path.display())]
    Archive { path: PathBuf, message: String },

    /// A payload document is not well-formed XML.
    #[error("XML error in {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },
}

impl ReaderError {
    /// Create an IO error for a path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an archive error.
    pub fn archive(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an XML error.
    pub fn xml(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Xml {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

/// Error raised while building an XML tree, before a path is attached.
#[derive(Debug, Clone, Error)]
#[error("XML parse error at position {position}: {message}")]
pub struct XmlError {
    pub position: u64,
    pub message: String,
}

impl XmlError {
    pub(crate) fn new(position: u64, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    /// Attach the document path, producing a fatal reader error.
    pub fn at(self, path: impl AsRef<Path>) -> ReaderError {
        ReaderError::xml(path, self.to_string())
    }
}

/// Why an extractor dropped a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// Required attribute absent (or empty).
    #[error("missing attribute `{0}`")]
    MissingAttribute(&'static str),

    /// Required child element absent.
    #[error("missing child element `{0}`")]
    MissingChild(&'static str),

    /// A reference did not lead to an element.
    #[error("unresolved reference `{0}`")]
    Unresolved(String),

    /// A value that must carry text was empty.
    #[error("empty {0}")]
    Empty(&'static str),

    /// Key already claimed by an earlier node.
    #[error("duplicate key `{0}`, first occurrence kept")]
    Duplicate(String),

    /// Diagram layout companion missing or unreadable.
    #[error("layout unavailable: {0}")]
    Layout(String),
}
