//! Integration tests for the directory-backed store.

use scriba_storage::{FileStorage, KeyValueStore};

#[test]
fn test_set_get_remove_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStorage::open(dir.path()).unwrap();

    assert_eq!(store.get("drafts/v2::7").unwrap(), None);

    store.set("drafts/v2::7", "[]").unwrap();
    assert_eq!(store.get("drafts/v2::7").unwrap().as_deref(), Some("[]"));

    store.remove("drafts/v2::7").unwrap();
    assert_eq!(store.get("drafts/v2::7").unwrap(), None);
}

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    FileStorage::open(dir.path())
        .unwrap()
        .set("blog_auth", "{\"token\":\"t\"}")
        .unwrap();

    let reopened = FileStorage::open(dir.path()).unwrap();

    assert_eq!(
        reopened.get("blog_auth").unwrap().as_deref(),
        Some("{\"token\":\"t\"}")
    );
}

#[test]
fn test_open_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    let store = FileStorage::open(&nested).unwrap();

    assert!(store.root().is_dir());
}

#[test]
fn test_remove_missing_key_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStorage::open(dir.path()).unwrap();

    store.remove("never-written").expect("absent key removal is a no-op");
}

#[test]
fn test_overwrite_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStorage::open(dir.path()).unwrap();

    store.set("k", "1").unwrap();
    store.set("k", "2").unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["k.json".to_string()]);
}
