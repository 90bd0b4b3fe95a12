//! Backup rotation, corruption recovery and failing disks.

use std::fs;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tds_model::{Classification, NewDraft};
use tds_persistence::{
    AutoSaveConfig, LoadSource, StateStore, StoreConfig, StoreEvent, load_state,
};
use tempfile::tempdir;

fn draft(subject: &str) -> NewDraft {
    NewDraft {
        classification: Classification::custom(),
        subject: subject.to_string(),
        body: "Body".to_string(),
        recipient: "helpdesk@example.com".to_string(),
    }
}

fn manual(dir: &std::path::Path) -> Arc<StateStore> {
    StateStore::new(StoreConfig::new(dir).with_autosave(AutoSaveConfig::disabled()))
}

#[test]
fn backup_lags_primary_by_one_save() {
    let dir = tempdir().unwrap();
    let store = manual(dir.path());
    store.load_or_initialize();

    for n in 0..3 {
        let previous = fs::read(&store.paths().primary).unwrap();
        store.append_draft(draft(&format!("save {n}"))).unwrap();
        store.flush_now().unwrap();
        assert_eq!(fs::read(&store.paths().backup).unwrap(), previous);
    }
}

#[test]
fn corrupt_primary_recovers_from_backup() {
    let dir = tempdir().unwrap();
    let store = manual(dir.path());
    store.load_or_initialize();
    store.append_draft(draft("kept")).unwrap();
    store.flush_now().unwrap();
    let expected = store.snapshot();
    store.append_draft(draft("lost")).unwrap();
    store.flush_now().unwrap();
    let paths = store.paths().clone();
    drop(store);

    fs::write(&paths.primary, b"{\"version\": 2, \"drafts\": [").unwrap();

    let recovered = manual(dir.path());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    recovered.subscribe(move |event| {
        if let StoreEvent::CorruptionRecovered { backup } = event {
            sink.lock().unwrap().push(backup.clone());
        }
    });

    let outcome = recovered.load_or_initialize();
    assert_eq!(outcome.source, LoadSource::Backup);
    assert_eq!(recovered.snapshot(), expected);
    assert_eq!(*events.lock().unwrap(), vec![paths.backup.clone()]);

    // Primary repaired, backup untouched, corrupt file set aside.
    assert_eq!(recovered.stats().saves, 1);
    assert_eq!(load_state(&paths.primary).unwrap(), expected);
    assert_eq!(load_state(&paths.backup).unwrap(), expected);
    assert!(paths.corrupt.exists());
}

#[test]
fn invalid_primary_is_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let store = manual(dir.path());
    store.load_or_initialize();
    store.append_draft(draft("one")).unwrap();
    store.flush_now().unwrap();
    store.flush_now().unwrap();
    let paths = store.paths().clone();
    drop(store);

    // Parses, but the counter no longer exceeds the stored id.
    let text = fs::read_to_string(&paths.primary).unwrap();
    let broken = text.replace("\"next_ticket_number\": 2", "\"next_ticket_number\": 1");
    assert_ne!(text, broken);
    fs::write(&paths.primary, broken).unwrap();

    let recovered = manual(dir.path());
    assert_eq!(recovered.load_or_initialize().source, LoadSource::Backup);
    assert_eq!(recovered.snapshot().generation.next_ticket_number, 2);
}

#[test]
fn newer_primary_is_kept_when_falling_back_to_defaults() {
    let dir = tempdir().unwrap();
    let store = manual(dir.path());
    store.load_or_initialize();
    store.append_draft(draft("written by a newer build")).unwrap();
    store.flush_now().unwrap();
    let paths = store.paths().clone();
    drop(store);
    fs::remove_file(&paths.backup).ok();

    let text = fs::read_to_string(&paths.primary).unwrap();
    let newer = text.replace("\"version\": 2", "\"version\": 3");
    assert_ne!(text, newer);
    fs::write(&paths.primary, &newer).unwrap();

    let fresh = manual(dir.path());
    assert_eq!(fresh.load_or_initialize().source, LoadSource::Defaults);
    assert!(fresh.snapshot().drafts.is_empty());
    fresh.flush_now().unwrap();

    assert_eq!(fs::read_to_string(&paths.corrupt).unwrap(), newer);
    assert!(load_state(&paths.primary).unwrap().drafts.is_empty());
}

#[test]
fn exhausted_counter_on_disk_is_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let store = manual(dir.path());
    store.load_or_initialize();
    store.flush_now().unwrap();
    let paths = store.paths().clone();
    drop(store);
    fs::remove_file(&paths.backup).ok();

    let text = fs::read_to_string(&paths.primary).unwrap();
    let broken = text.replace(
        "\"next_ticket_number\": 1",
        &format!("\"next_ticket_number\": {}", u64::MAX),
    );
    assert_ne!(text, broken);
    fs::write(&paths.primary, broken).unwrap();

    let fresh = manual(dir.path());
    assert_eq!(fresh.load_or_initialize().source, LoadSource::Defaults);
    assert_eq!(fresh.snapshot().generation.next_ticket_number, 1);
    assert!(paths.corrupt.exists());
    fresh.append_draft(draft("first")).unwrap();
}

#[test]
fn both_files_corrupt_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("appstate.json"), b"garbage").unwrap();
    fs::write(dir.path().join("appstate.backup.json"), b"garbage").unwrap();

    let store = manual(dir.path());
    assert_eq!(store.load_or_initialize().source, LoadSource::Defaults);
    assert!(load_state(&store.paths().primary).is_ok());
    assert_eq!(fs::read(&store.paths().corrupt).unwrap(), b"garbage");
}

#[test]
fn failing_disk_warns_and_retries_until_it_recovers() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, b"not a directory").unwrap();
    let state_dir = blocker.join("state");

    let store = StateStore::new(StoreConfig::new(&state_dir).with_autosave(AutoSaveConfig {
        debounce_ms: 20,
        retry_base_ms: 50,
        retry_max_ms: 200,
        ..AutoSaveConfig::default()
    }));
    let warnings = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&warnings);
    store.subscribe(move |event| {
        if let StoreEvent::PersistenceWarning(err) = event {
            assert!(!err.user_message().is_empty());
            *sink.lock().unwrap() += 1;
        }
    });

    let outcome = store.load_or_initialize();
    assert_eq!(outcome.source, LoadSource::Defaults);
    assert!(outcome.warning.is_some());

    // Mutations keep working in memory.
    store.append_draft(draft("in memory")).unwrap();
    thread::sleep(Duration::from_millis(150));
    assert!(store.is_dirty());
    assert!(store.stats().failures >= 2);
    assert!(*warnings.lock().unwrap() >= 2);

    fs::remove_file(&blocker).unwrap();
    let deadline = Instant::now() + Duration::from_secs(3);
    while store.is_dirty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(!store.is_dirty());
    assert_eq!(load_state(&store.paths().primary).unwrap().drafts.len(), 1);
}
