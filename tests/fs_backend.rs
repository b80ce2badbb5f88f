use logbook::error::LogbookError;
use logbook::model::Record;
use logbook::store::fs_backend::FsBackend;
use logbook::store::{LoadOutcome, StorageBackend, Store};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Reading {
    id: u64,
    celsius: f64,
}

impl Record for Reading {
    type Key = u64;
    const COLLECTION: &'static str = "readings";

    fn key(&self) -> u64 {
        self.id
    }
}

fn reading(id: u64, celsius: f64) -> Reading {
    Reading { id, celsius }
}

fn tmp_files(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[test]
fn test_save_then_load_in_new_store() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut store = Store::new(FsBackend::new(temp_dir.path()));
    store.insert(reading(1, 21.5)).unwrap();
    store.insert(reading(2, 19.0)).unwrap();
    store.save().unwrap();

    let mut reopened: Store<Reading, FsBackend> = Store::new(FsBackend::new(temp_dir.path()));
    assert_eq!(reopened.load().unwrap(), LoadOutcome::Loaded(2));
    assert_eq!(reopened.list(), store.list());
    assert!(tmp_files(temp_dir.path()).is_empty());
}

#[test]
fn test_missing_data_dir_is_created_on_save() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("a").join("b");

    let mut store = Store::new(FsBackend::new(&root));
    store.insert(reading(1, 3.0)).unwrap();
    store.save().unwrap();

    assert!(root.join("readings.json").exists());
}

#[test]
fn test_crash_before_rename_leaves_original_intact() {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend = FsBackend::new(temp_dir.path());
    let target = temp_dir.path().join("readings.json");

    backend.write("readings.json", b"[]\n").unwrap();

    // stage new content but never commit, as if the process died here
    let staged = backend.stage("readings.json", b"[{\"id\": 1, \"celsius\": 4.0}]").unwrap();
    assert!(staged.temp_path().exists());
    assert_eq!(fs::read(&target).unwrap(), b"[]\n");

    let mut store: Store<Reading, FsBackend> = Store::new(FsBackend::new(temp_dir.path()));
    assert_eq!(store.load().unwrap(), LoadOutcome::Loaded(0));

    staged.discard();
    assert!(tmp_files(temp_dir.path()).is_empty());
}

#[test]
fn test_commit_replaces_target() {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend = FsBackend::new(temp_dir.path());

    backend.write("readings.json", b"old").unwrap();
    backend.stage("readings.json", b"new").unwrap().commit().unwrap();

    assert_eq!(backend.read("readings.json").unwrap(), Some(b"new".to_vec()));
    assert!(tmp_files(temp_dir.path()).is_empty());
}

#[test]
fn test_corrupt_file_is_reported_not_emptied() {
    let temp_dir = tempfile::tempdir().unwrap();
    let target = temp_dir.path().join("readings.json");
    fs::write(&target, "[{\"id\": 1, \"celsius\": }]").unwrap();

    let mut store: Store<Reading, FsBackend> = Store::new(FsBackend::new(temp_dir.path()));
    let err = store.load().unwrap_err();

    assert!(matches!(err, LogbookError::Decode { line: 1, .. }));
    assert!(store.is_empty());
    // nothing was rewritten
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "[{\"id\": 1, \"celsius\": }]"
    );
}

#[test]
fn test_idempotent_save_is_byte_identical() {
    let temp_dir = tempfile::tempdir().unwrap();
    let target = temp_dir.path().join("readings.json");

    let mut store = Store::new(FsBackend::new(temp_dir.path()));
    store.insert(reading(7, -2.25)).unwrap();
    store.save().unwrap();
    let first = fs::read(&target).unwrap();
    store.save().unwrap();

    assert_eq!(fs::read(&target).unwrap(), first);
}

#[test]
fn test_quarantine_moves_file_aside() {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend = FsBackend::new(temp_dir.path());
    fs::write(temp_dir.path().join("readings.json"), "garbage").unwrap();

    let moved = backend
        .quarantine("readings.json", "corrupt-20240101000000")
        .unwrap()
        .unwrap();

    assert_eq!(moved, temp_dir.path().join("readings.json.corrupt-20240101000000"));
    assert_eq!(fs::read_to_string(&moved).unwrap(), "garbage");
    assert_eq!(backend.read("readings.json").unwrap(), None);
    assert_eq!(backend.quarantine("readings.json", "again").unwrap(), None);
}
