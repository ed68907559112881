use music_splitter_core::{
    JobPatch, JobRecord, JobStatus, JobStore, SplitterError,
};
use std::{fs, sync::Arc, thread};
use tempfile::tempdir;

#[test]
fn created_records_are_readable_and_persisted_as_flat_json() {
    let tmp = tempdir().unwrap();
    let store = JobStore::open(tmp.path());

    store.create(JobRecord::new("abc12345", 4)).unwrap();

    let record = store.get("abc12345").unwrap();
    assert_eq!(record.status, JobStatus::Processing);
    assert_eq!(record.stems, 4);

    let raw = fs::read_to_string(tmp.path().join("abc12345.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let doc = value.as_object().unwrap();
    assert_eq!(doc["id"], "abc12345");
    assert_eq!(doc["status"], "processing");
    // Flat document: no nested objects.
    assert!(doc.values().all(|v| !v.is_object()));
}

#[test]
fn update_merges_partial_fields_and_persists_synchronously() {
    let tmp = tempdir().unwrap();
    let store = JobStore::open(tmp.path());

    store.create(JobRecord::new("abc12345", 2)).unwrap();
    store
        .update(
            "abc12345",
            JobPatch::done("mysong", vec!["vocals.wav".into(), "accompaniment.wav".into()]),
        )
        .unwrap();

    let record = store.get("abc12345").unwrap();
    assert_eq!(record.status, JobStatus::Done);
    assert_eq!(record.stems, 2, "untouched fields survive the merge");
    assert_eq!(record.track_folder, "mysong");

    // The durable document already carries the merged record.
    let raw = fs::read_to_string(tmp.path().join("abc12345.json")).unwrap();
    assert!(raw.contains("accompaniment.wav"));
}

#[test]
fn restart_fidelity_fresh_cache_returns_the_last_persisted_record() {
    let tmp = tempdir().unwrap();

    let before = {
        let store = JobStore::open(tmp.path());
        store.create(JobRecord::new("abc12345", 2)).unwrap();
        store
            .update("abc12345", JobPatch::error("Separation failed: boom"))
            .unwrap();
        store.get("abc12345").unwrap()
    };

    // A fresh store starts with an empty cache and falls back to the
    // durable records transparently.
    let store = JobStore::open(tmp.path());
    let after = store.get("abc12345").unwrap();
    assert_eq!(before, after);
}

#[test]
fn concurrent_updates_are_serialized_by_the_store() {
    let tmp = tempdir().unwrap();
    let store = Arc::new(JobStore::open(tmp.path()));
    store.create(JobRecord::new("abc12345", 2)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store
                    .update(
                        "abc12345",
                        JobPatch {
                            track_folder: Some(format!("t{i}")),
                            ..JobPatch::default()
                        },
                    )
                    .unwrap();
                store.get("abc12345").unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let record = store.get("abc12345").unwrap();
    assert!(record.track_folder.starts_with('t'));
    assert_eq!(record.stems, 2, "merges never clobber unrelated fields");
}

#[test]
fn get_on_unknown_id_is_record_not_found() {
    let tmp = tempdir().unwrap();
    let store = JobStore::open(tmp.path());

    match store.get("nope") {
        Err(SplitterError::RecordNotFound(id)) => assert_eq!(id, "nope"),
        other => panic!("expected RecordNotFound, got {other:?}"),
    }
}
