//! Legacy configuration import.

use std::fs;
use std::sync::{Arc, Mutex};
use std::thread;

use tds_persistence::{
    AutoSaveConfig, LoadSource, MigrationOutcome, StateStore, StoreConfig, StoreEvent, load_state,
};
use tempfile::tempdir;

#[test]
fn first_start_imports_legacy_file() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join(".env");
    fs::write(&legacy, "CLIENT_ID=abc123\nRECIPIENT_EMAIL=helpdesk@example.com\n").unwrap();

    let store = StateStore::new(
        StoreConfig::new(dir.path().join("state"))
            .with_legacy_path(&legacy)
            .with_autosave(AutoSaveConfig::disabled()),
    );
    let outcome = store.load_or_initialize();

    assert_eq!(outcome.source, LoadSource::Migrated);
    let state = store.snapshot();
    assert_eq!(state.connections.microsoft.client_id, "abc123");
    assert_eq!(
        state.connections.microsoft.recipient_email,
        "helpdesk@example.com"
    );
    assert!(state.migration.legacy_imported);
    assert!(state.migration.imported_at.is_some());
    assert_eq!(load_state(&store.paths().primary).unwrap(), state);
}

#[test]
fn legacy_counter_continues_numbering() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join(".env");
    fs::write(&legacy, "NUM_EMAILS=25\nWAIT_TIME_MS=200\n").unwrap();
    fs::write(
        dir.path().join("ticket_counter.json"),
        r#"{"last_ticket_number": 57}"#,
    )
    .unwrap();

    let store = StateStore::new(
        StoreConfig::new(dir.path().join("state"))
            .with_legacy_path(&legacy)
            .with_autosave(AutoSaveConfig::disabled()),
    );
    store.load_or_initialize();
    let generation = store.snapshot().generation;
    assert_eq!(generation.next_ticket_number, 58);
    assert_eq!(generation.email_count, 25);
    assert_eq!(generation.wait_time_ms, 200);
}

#[test]
fn migration_runs_once() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join(".env");
    fs::write(&legacy, "CLIENT_ID=abc123\n").unwrap();
    let config = StoreConfig::new(dir.path().join("state"))
        .with_legacy_path(&legacy)
        .with_autosave(AutoSaveConfig::disabled());

    let store = StateStore::new(config.clone());
    store.load_or_initialize();
    let saves = store.stats().saves;
    let before = store.snapshot();

    fs::write(&legacy, "CLIENT_ID=changed\n").unwrap();
    assert_eq!(
        store.migrate_legacy(&legacy).unwrap(),
        MigrationOutcome::Skipped
    );
    assert_eq!(store.snapshot(), before);
    assert_eq!(store.stats().saves, saves);
    drop(store);

    // A restart loads the migrated file instead of importing again.
    let reopened = StateStore::new(config);
    assert_eq!(reopened.load_or_initialize().source, LoadSource::Primary);
    assert_eq!(reopened.snapshot().connections.microsoft.client_id, "abc123");
}

#[test]
fn explicit_migration_into_fresh_state() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join("legacy.env");
    fs::write(&legacy, "FRESHSERVICE_DOMAIN=acme.freshservice.com\nEXTRA=1\n").unwrap();

    let store = StateStore::new(
        StoreConfig::new(dir.path().join("state")).with_autosave(AutoSaveConfig::disabled()),
    );
    assert_eq!(store.load_or_initialize().source, LoadSource::Defaults);

    let MigrationOutcome::Imported(import) = store.migrate_legacy(&legacy).unwrap() else {
        panic!("expected an import");
    };
    assert_eq!(import.applied, vec!["FRESHSERVICE_DOMAIN"]);
    assert_eq!(import.ignored, vec!["EXTRA".to_string()]);
    assert_eq!(
        load_state(&store.paths().primary)
            .unwrap()
            .connections
            .freshservice
            .domain,
        "acme.freshservice.com"
    );
}

#[test]
fn concurrent_migrations_import_once() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join("legacy.env");
    fs::write(&legacy, "CLIENT_ID=abc123\n").unwrap();
    fs::write(
        dir.path().join("ticket_counter.json"),
        r#"{"last_ticket_number": 9}"#,
    )
    .unwrap();

    let store = StateStore::new(
        StoreConfig::new(dir.path().join("state")).with_autosave(AutoSaveConfig::disabled()),
    );
    store.load_or_initialize();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let legacy = legacy.clone();
            thread::spawn(move || store.migrate_legacy(&legacy).unwrap())
        })
        .collect();
    let imported = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|outcome| matches!(outcome, MigrationOutcome::Imported(_)))
        .count();

    assert_eq!(imported, 1);
    assert_eq!(store.snapshot().generation.next_ticket_number, 10);
}

#[test]
fn migration_survives_a_failed_write() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join("legacy.env");
    fs::write(&legacy, "CLIENT_ID=abc123\n").unwrap();
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, b"not a directory").unwrap();

    let store = StateStore::new(
        StoreConfig::new(blocker.join("state")).with_autosave(AutoSaveConfig::disabled()),
    );
    assert!(store.load_or_initialize().warning.is_some());
    let warnings = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&warnings);
    store.subscribe(move |event| {
        if matches!(event, StoreEvent::PersistenceWarning(_)) {
            *sink.lock().unwrap() += 1;
        }
    });

    let outcome = store.migrate_legacy(&legacy).unwrap();
    assert!(matches!(outcome, MigrationOutcome::Imported(_)));
    assert_eq!(*warnings.lock().unwrap(), 1);
    assert_eq!(store.snapshot().connections.microsoft.client_id, "abc123");
    assert!(store.is_dirty());
}
