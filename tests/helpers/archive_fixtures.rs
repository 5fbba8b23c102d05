//! Builders for on-disk MagicDraw archives.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdzip::config::defaults::{MODEL_FILE, SHARED_MODEL_FILE};
use mdzip::{MagicDrawReader, MemoryLog, ReaderConfig};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Wrap body XML in an `xmi:XMI` root with the usual namespace declarations.
pub fn xmi(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001"
         xmlns:uml="http://www.omg.org/spec/UML/20131001"
         xmlns:Business_Document_Library="http://www.magicdraw.com/schemas/Business_Document_Library.xmi">
{body}
</xmi:XMI>"#
    )
}

/// Write a zip archive with the given entries.
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// A source directory of archives plus a private scratch root.
pub struct Workspace {
    _dir: TempDir,
    pub source: PathBuf,
    pub scratch: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("models");
        let scratch = dir.path().join("scratch");
        fs::create_dir_all(&source).unwrap();
        Self {
            _dir: dir,
            source,
            scratch,
        }
    }

    /// Add an archive holding a primary model (and optionally a shared model
    /// and extra entries such as diagram layouts).
    pub fn archive(
        &self,
        name: &str,
        model: Option<&str>,
        shared: Option<&str>,
        extra: &[(&str, &str)],
    ) -> PathBuf {
        let model = model.map(xmi);
        let shared = shared.map(xmi);
        let mut entries: Vec<(&str, &str)> = Vec::new();
        if let Some(model) = &model {
            entries.push((MODEL_FILE, model.as_str()));
        }
        if let Some(shared) = &shared {
            entries.push((SHARED_MODEL_FILE, shared.as_str()));
        }
        entries.extend_from_slice(extra);

        let path = self.source.join(name);
        write_zip(&path, &entries);
        path
    }

    pub fn config(&self) -> ReaderConfig {
        ReaderConfig::default().with_scratch_root(&self.scratch)
    }

    pub fn open(&self) -> (MagicDrawReader, Arc<MemoryLog>) {
        let log = Arc::new(MemoryLog::new());
        let reader = MagicDrawReader::open(&self.source, self.config(), log.clone()).unwrap();
        (reader, log)
    }
}
