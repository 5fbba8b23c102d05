//! Structural failures surface as `ReaderError`.

use std::fs;
use std::sync::Arc;

use mdzip::config::defaults::MODEL_FILE;
use mdzip::{MagicDrawReader, MemoryLog, ReaderError};

use crate::helpers::archive_fixtures::{Workspace, write_zip};

#[test]
fn test_missing_source_directory() {
    let ws = Workspace::new();
    let missing = ws.source.join("nope");
    let err = MagicDrawReader::open(&missing, ws.config(), Arc::new(MemoryLog::new())).unwrap_err();
    assert!(matches!(err, ReaderError::SourceNotFound(path) if path == missing));
}

#[test]
fn test_corrupt_archive_fails_open() {
    let ws = Workspace::new();
    fs::write(ws.source.join("Broken.mdzip"), b"this is not a zip file").unwrap();
    let err = MagicDrawReader::open(&ws.source, ws.config(), Arc::new(MemoryLog::new())).unwrap_err();
    assert!(matches!(err, ReaderError::Archive { .. }), "got {err:?}");
}

#[test]
fn test_malformed_model_fails_every_accessor() {
    let ws = Workspace::new();
    write_zip(
        &ws.source.join("Project.mdzip"),
        &[(MODEL_FILE, "<xmi:XMI><packagedElement></xmi:XMI>")],
    );
    let (reader, _) = ws.open();

    let err = reader.classes().unwrap_err();
    match &err {
        ReaderError::Xml { path, .. } => assert!(path.ends_with(MODEL_FILE)),
        other => panic!("expected an XML error, got {other:?}"),
    }
    // Load failures are not cached.
    assert!(reader.documents().is_err());
    assert!(reader.constraints("C1").is_err());
    assert!(reader.extract_all().is_err());
}

#[test]
fn test_failed_load_is_retried() {
    let ws = Workspace::new();
    write_zip(
        &ws.source.join("Project.mdzip"),
        &[(MODEL_FILE, "<xmi:XMI><packagedElement></xmi:XMI>")],
    );
    let (reader, _) = ws.open();
    assert!(reader.documents().is_err());

    let payload = reader.unpacked()[0].directory.join(MODEL_FILE);
    fs::write(
        &payload,
        crate::helpers::archive_fixtures::xmi(
            r#"<packagedElement xmi:type="uml:Class" xmi:id="C1" name="Order"/>"#,
        ),
    )
    .unwrap();
    assert_eq!(reader.classes().unwrap().len(), 1);
}
