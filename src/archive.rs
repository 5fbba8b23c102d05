//! Archive unpacking.
//!
//! Every archive in the source directory is extracted into its own
//! subdirectory of the scratch root, named after the archive file:
//!
//! ```text
//! <source>/Project.mdzip      ──►  <scratch>/Project.mdzip/
//! <source>/Library.mdzip      ──►  <scratch>/Library.mdzip/
//! ```
//!
//! A subdirectory left behind by an earlier run is deleted first, so the
//! result never mixes files from two extractions.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::config::ReaderConfig;
use crate::error::ReaderError;

/// One extracted archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unpacked {
    /// The archive file that was read.
    pub archive: PathBuf,
    /// Scratch subdirectory holding its contents.
    pub directory: PathBuf,
}

impl Unpacked {
    /// Name of the scratch subdirectory (the archive file name).
    pub fn name(&self) -> &str {
        self.directory
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Extracts archives into scratch subdirectories.
#[derive(Clone, Debug)]
pub struct Unpacker {
    config: ReaderConfig,
}

impl Unpacker {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn scratch_root(&self) -> &Path {
        &self.config.scratch_root
    }

    /// Archive files directly inside `source`, sorted by name.
    pub fn find_archives(&self, source: &Path) -> Result<Vec<PathBuf>, ReaderError> {
        if !source.is_dir() {
            return Err(ReaderError::SourceNotFound(source.to_path_buf()));
        }

        let entries = fs::read_dir(source).map_err(|e| ReaderError::io(source, e))?;
        let mut archives = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ReaderError::io(source, e))?;
            let path = entry.path();
            if path.is_file() && self.config.is_archive(&path) {
                archives.push(path);
            }
        }
        archives.sort();
        Ok(archives)
    }

    /// Unpack every archive in `source`.
    pub fn unpack_all(&self, source: &Path) -> Result<Vec<Unpacked>, ReaderError> {
        let archives = self.find_archives(source)?;
        let root = self.scratch_root();
        fs::create_dir_all(root).map_err(|e| ReaderError::io(root, e))?;

        let unpacked = archives
            .iter()
            .map(|archive| self.unpack(archive))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Unpacked {} archive(s) from {} into {}",
            unpacked.len(),
            source.display(),
            root.display()
        );
        Ok(unpacked)
    }

    /// Unpack a single archive, replacing any earlier extraction of it.
    pub fn unpack(&self, archive: &Path) -> Result<Unpacked, ReaderError> {
        let file_name = archive
            .file_name()
            .ok_or_else(|| ReaderError::archive(archive, "archive path has no file name"))?;
        let target = self.scratch_root().join(file_name);

        if target.exists() {
            tracing::trace!("Removing previous extraction {}", target.display());
            fs::remove_dir_all(&target).map_err(|e| ReaderError::io(&target, e))?;
        }

        let file = File::open(archive).map_err(|e| ReaderError::io(archive, e))?;
        let mut zip = ZipArchive::new(file)
            .map_err(|e| ReaderError::archive(archive, format!("Failed to open archive: {e}")))?;
        fs::create_dir_all(&target).map_err(|e| ReaderError::io(&target, e))?;
        zip.extract(&target)
            .map_err(|e| ReaderError::archive(archive, format!("Failed to extract: {e}")))?;

        tracing::trace!(
            "Extracted {} entries from {} to {}",
            zip.len(),
            archive.display(),
            target.display()
        );
        Ok(Unpacked {
            archive: archive.to_path_buf(),
            directory: target,
        })
    }
}
