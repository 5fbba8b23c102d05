//! Scratch directory behaviour of `MagicDrawReader::open`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::helpers::archive_fixtures::Workspace;

const MODEL: &str = r#"<packagedElement xmi:type="uml:Class" xmi:id="C1" name="Order"/>"#;

/// Relative path → contents of every file under `root`.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_each_archive_gets_its_own_subdirectory() {
    let ws = Workspace::new();
    ws.archive("Project.mdzip", Some(MODEL), None, &[("BINARY-1", "<diagram/>")]);
    ws.archive("Library.mdzip", None, Some(MODEL), &[]);

    let (reader, log) = ws.open();
    let names: Vec<_> = reader.unpacked().iter().map(|u| u.name().to_string()).collect();
    assert_eq!(names, vec!["Library.mdzip", "Project.mdzip"]);
    assert!(ws.scratch.join("Project.mdzip").join("BINARY-1").is_file());
    assert!(ws.scratch.join("Library.mdzip").is_dir());
    assert_eq!(
        log.lines().iter().filter(|l| l.contains("Unpacked '")).count(),
        2
    );
}

#[test]
fn test_unpacking_twice_gives_identical_scratch_tree() {
    let ws = Workspace::new();
    ws.archive("Project.mdzip", Some(MODEL), None, &[("BINARY-1", "<diagram/>")]);

    let _first = ws.open();
    let before = snapshot(&ws.scratch);
    let _second = ws.open();
    let after = snapshot(&ws.scratch);

    assert!(!before.is_empty());
    assert_eq!(before, after);
}

#[test]
fn test_stale_files_are_purged() {
    let ws = Workspace::new();
    ws.archive("Project.mdzip", Some(MODEL), None, &[]);

    let stale = ws.scratch.join("Project.mdzip").join("leftover.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old run").unwrap();

    let (reader, _) = ws.open();
    assert!(!stale.exists());
    assert_eq!(reader.classes().unwrap().len(), 1);
}

#[test]
fn test_stale_sibling_directories_are_not_loaded() {
    let ws = Workspace::new();
    ws.archive("Project.mdzip", Some(MODEL), None, &[]);

    let old = ws.scratch.join("Removed.mdzip");
    fs::create_dir_all(&old).unwrap();
    fs::write(
        old.join(mdzip::config::defaults::MODEL_FILE),
        crate::helpers::archive_fixtures::xmi(
            r#"<packagedElement xmi:type="uml:Class" xmi:id="C9" name="Ghost"/>"#,
        ),
    )
    .unwrap();

    let (reader, _) = ws.open();
    assert!(reader.classes().unwrap().get("C9").is_none());
    assert_eq!(reader.documents().unwrap().len(), 1);
}

#[test]
fn test_extension_match_ignores_case_and_other_files() {
    let ws = Workspace::new();
    ws.archive("Upper.MDZIP", Some(MODEL), None, &[]);
    fs::write(ws.source.join("notes.txt"), "not an archive").unwrap();
    fs::write(ws.source.join("Project.mdzip.bak"), "not an archive").unwrap();

    let (reader, _) = ws.open();
    assert_eq!(reader.unpacked().len(), 1);
    assert_eq!(reader.unpacked()[0].name(), "Upper.MDZIP");
}

#[test]
fn test_archive_without_payloads_yields_empty_collections() {
    let ws = Workspace::new();
    ws.archive("Empty.mdzip", None, None, &[("readme.txt", "nothing here")]);

    let (reader, _) = ws.open();
    assert!(reader.documents().unwrap().is_empty());
    assert!(reader.classes().unwrap().is_empty());
    assert!(reader.associations().unwrap().is_empty());
    assert!(reader.diagrams().unwrap().is_empty());
}
