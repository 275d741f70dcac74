//! Snapshot File Tests
//!
//! Tests verify:
//! - Save/load through the filesystem
//! - Saves replace the previous snapshot and leave no temp file
//! - Missing and corrupt files surface distinct errors

use std::fs;
use std::path::PathBuf;

use bookledger::catalog::Catalog;
use bookledger::snapshot;
use bookledger::LibraryError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_snapshot() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("catalog.json");
    (temp_dir, path)
}

fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.add("111", "First", "A", Some("CS"), 3).unwrap();
    catalog.add("222", "Second", "B", None, 4).unwrap();
    catalog.loan("222", 1).unwrap();
    catalog
}

// =============================================================================
// Save / Load Tests
// =============================================================================

#[test]
fn test_save_then_load() {
    let (_temp, path) = setup_temp_snapshot();
    let catalog = sample_catalog();

    snapshot::save(&path, &catalog).unwrap();
    let loaded = snapshot::load(&path).unwrap();

    assert_eq!(loaded.len(), 2);
    let second = loaded.get("222").unwrap();
    assert_eq!((second.stock, second.loaned), (3, 1));
}

#[test]
fn test_save_replaces_previous_snapshot() {
    let (_temp, path) = setup_temp_snapshot();
    let mut catalog = sample_catalog();
    snapshot::save(&path, &catalog).unwrap();

    catalog.delete("111").unwrap();
    snapshot::save(&path, &catalog).unwrap();

    let loaded = snapshot::load(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.get("111").is_none());
}

#[test]
fn test_save_leaves_no_temp_file() {
    let (temp, path) = setup_temp_snapshot();

    snapshot::save(&path, &sample_catalog()).unwrap();

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["catalog.json".to_string()]);
}

#[test]
fn test_save_into_missing_directory_fails_without_output() {
    let (temp, _) = setup_temp_snapshot();
    let path = temp.path().join("missing").join("catalog.json");

    let result = snapshot::save(&path, &sample_catalog());

    assert!(matches!(result, Err(LibraryError::Io(_))));
    assert!(!path.exists());
}

#[test]
fn test_load_with_report_counts() {
    let (_temp, path) = setup_temp_snapshot();
    fs::write(
        &path,
        r#"{"metadata": {"version": "1.0", "created": "0"},
            "books": [{"isbn": "1", "title": "T"}, {"isbn": "1", "title": "Dup"}]}"#,
    )
    .unwrap();

    let (catalog, report) = snapshot::load_with_report(&path).unwrap();

    assert_eq!(catalog.len(), 1);
    assert_eq!(report.books_loaded, 1);
    assert_eq!(report.entries_skipped, 1);
    assert_eq!(report.metadata.unwrap().version, "1.0");
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_load_missing_file_is_not_found() {
    let (_temp, path) = setup_temp_snapshot();

    match snapshot::load(&path) {
        Err(LibraryError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected NotFound, got {:?}", other.map(|c| c.len())),
    }
}

#[test]
fn test_load_truncated_file_is_corrupt() {
    let (_temp, path) = setup_temp_snapshot();
    snapshot::save(&path, &sample_catalog()).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        snapshot::load(&path),
        Err(LibraryError::CorruptSnapshot(_))
    ));
}
