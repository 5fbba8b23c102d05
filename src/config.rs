//! Reader configuration.

use std::path::PathBuf;

use crate::xml::NamespaceContext;

/// Well-known names inside a MagicDraw project archive.
pub mod defaults {
    /// Extension of MagicDraw project archives.
    pub const ARCHIVE_EXTENSION: &str = "mdzip";
    /// Primary model payload.
    pub const MODEL_FILE: &str = "com.nomagic.magicdraw.uml_model.model";
    /// Shared model payload.
    pub const SHARED_MODEL_FILE: &str = "com.nomagic.magicdraw.uml_model.shared_model";
    /// Directory created under the system temp dir for scratch extraction.
    pub const SCRATCH_DIR: &str = "TmpMDZip";
}

/// Where archives are unpacked and which payloads are read from them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct ReaderConfig {
    /// Parent of the per-archive scratch subdirectories.
    pub scratch_root: PathBuf,
    /// Archive file extension, compared case-insensitively.
    pub archive_extension: String,
    /// File name of the primary model payload.
    pub model_file: String,
    /// File name of the shared model payload.
    pub shared_model_file: String,
    /// Namespace context for diagram layout files, which use `xmi:` without declaring it.
    pub layout_namespaces: NamespaceContext,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir().join(defaults::SCRATCH_DIR),
            archive_extension: defaults::ARCHIVE_EXTENSION.to_string(),
            model_file: defaults::MODEL_FILE.to_string(),
            shared_model_file: defaults::SHARED_MODEL_FILE.to_string(),
            layout_namespaces: NamespaceContext::with_xmi(),
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scratch root.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    /// Set the archive extension (without the dot).
    pub fn with_archive_extension(mut self, ext: impl Into<String>) -> Self {
        self.archive_extension = ext.into();
        self
    }

    /// Set the payload file names.
    pub fn with_payload_files(
        mut self,
        model_file: impl Into<String>,
        shared_model_file: impl Into<String>,
    ) -> Self {
        self.model_file = model_file.into();
        self.shared_model_file = shared_model_file.into();
        self
    }

    /// Set the layout namespace context.
    pub fn with_layout_namespaces(mut self, namespaces: NamespaceContext) -> Self {
        self.layout_namespaces = namespaces;
        self
    }

    /// Does this path carry the archive extension?
    pub fn is_archive(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.archive_extension))
    }

    /// Read a config from JSON. Missing fields take their defaults.
    #[cfg(feature = "json")]
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
