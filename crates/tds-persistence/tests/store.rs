//! Store behaviour against a real state directory.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tds_model::{
    Classification, ConnectionField, DraftStatus, GenerationUpdate, NewDraft, PreflightCheck,
    Provider, QualityLevel, SendBatchRecord, UiPreferences,
};
use tds_persistence::{AutoSaveConfig, LoadSource, StateStore, StoreConfig, StoreEvent, Subtree};
use tempfile::tempdir;

fn draft(subject: &str) -> NewDraft {
    NewDraft {
        classification: Classification::custom(),
        subject: subject.to_string(),
        body: "Details inside.".to_string(),
        recipient: "helpdesk@example.com".to_string(),
    }
}

fn debounced(dir: &std::path::Path, debounce_ms: u64) -> Arc<StateStore> {
    StateStore::new(StoreConfig::new(dir).with_autosave(AutoSaveConfig {
        debounce_ms,
        ..AutoSaveConfig::default()
    }))
}

#[test]
fn empty_directory_initializes_defaults_and_persists() {
    let dir = tempdir().unwrap();
    let store = debounced(dir.path(), 500);

    let outcome = store.load_or_initialize();
    assert_eq!(outcome.source, LoadSource::Defaults);
    assert!(outcome.warning.is_none());
    assert!(store.paths().primary.exists());
    assert_eq!(store.stats().saves, 1);
}

#[test]
fn rapid_updates_coalesce_into_one_save() {
    let dir = tempdir().unwrap();
    let store = debounced(dir.path(), 500);
    store.load_or_initialize();
    let baseline = store.stats().saves;

    for n in 0..5 {
        store
            .update_connection(
                Provider::Microsoft,
                ConnectionField::SenderEmail,
                &format!("sender{n}@example.com"),
            )
            .unwrap();
        thread::sleep(Duration::from_millis(80));
    }
    assert_eq!(store.stats().saves, baseline);

    thread::sleep(Duration::from_millis(600));
    assert_eq!(store.stats().saves, baseline + 1);
    assert!(!store.is_dirty());

    let on_disk = tds_persistence::load_state(&store.paths().primary).unwrap();
    assert_eq!(on_disk.connections.microsoft.sender_email, "sender4@example.com");
}

#[test]
fn spaced_updates_save_each_time() {
    let dir = tempdir().unwrap();
    let store = debounced(dir.path(), 50);
    store.load_or_initialize();
    let baseline = store.stats().saves;

    for count in [10, 20, 30] {
        store
            .update_generation(GenerationUpdate::EmailCount(count))
            .unwrap();
        thread::sleep(Duration::from_millis(250));
    }
    assert_eq!(store.stats().saves, baseline + 3);
}

#[test]
fn state_round_trips_across_restart() {
    let dir = tempdir().unwrap();
    let store = debounced(dir.path(), 500);
    store.load_or_initialize();

    store
        .update_connection(
            Provider::Freshservice,
            ConnectionField::Domain,
            "acme.freshservice.com",
        )
        .unwrap();
    store
        .update_connection(
            Provider::Microsoft,
            ConnectionField::ClientId,
            "12345678-abcd-ef01-2345-6789abcdef01",
        )
        .unwrap();
    store
        .update_generation(GenerationUpdate::Quality(QualityLevel::Polished))
        .unwrap();
    store
        .update_ui_preferences(UiPreferences {
            left_dock_width: 300,
            ..UiPreferences::default()
        })
        .unwrap();
    let first = store.append_draft(draft("VPN drops")).unwrap();
    store
        .update_draft_status(first.id, DraftStatus::Sent, None)
        .unwrap();
    store
        .record_send_batch(SendBatchRecord {
            batch_id: "b-1".into(),
            timestamp: chrono::Utc::now(),
            emails_sent: 1,
            emails_succeeded: 1,
            emails_failed: 0,
            recipient: "helpdesk@example.com".into(),
        })
        .unwrap();
    store.complete_onboarding().unwrap();
    let expected = store.snapshot();
    store.shutdown_flush().unwrap();
    drop(store);

    let reopened = debounced(dir.path(), 500);
    assert_eq!(reopened.load_or_initialize().source, LoadSource::Primary);
    assert_eq!(reopened.snapshot(), expected);
}

#[test]
fn ids_stay_monotonic_across_restarts() {
    let dir = tempdir().unwrap();
    let store = debounced(dir.path(), 500);
    store.load_or_initialize();
    for n in 0..3 {
        store.append_draft(draft(&format!("issue {n}"))).unwrap();
    }
    store.clear_drafts().unwrap();
    store.shutdown_flush().unwrap();
    drop(store);

    let reopened = debounced(dir.path(), 500);
    reopened.load_or_initialize();
    let next = reopened.append_draft(draft("after restart")).unwrap();
    assert_eq!(next.id, 4);
    assert_eq!(next.subject, "[TEST-TKT-4] after restart");
}

#[test]
fn notifications_name_the_changed_subtree() {
    let dir = tempdir().unwrap();
    let store = debounced(dir.path(), 500);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |event| {
        if let StoreEvent::Changed(subtree) = event {
            sink.lock().unwrap().push(*subtree);
        }
    });

    store.load_or_initialize();
    store.append_draft(draft("one")).unwrap();
    store
        .set_connection_status(Provider::Claude, true)
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Subtree::All, Subtree::Drafts, Subtree::Connections]
    );
    assert!(store.read(|s| s.connections.claude.last_checked.is_some()));
}

#[test]
fn preflight_persists_and_clearing_drafts_reopens_review() {
    let dir = tempdir().unwrap();
    let store = debounced(dir.path(), 500);
    store.load_or_initialize();
    store.append_draft(draft("reviewed")).unwrap();
    for check in PreflightCheck::ALL {
        store.record_preflight(check, true).unwrap();
    }
    assert!(store.read(|s| s.preflight.all_passed));
    store.shutdown_flush().unwrap();
    drop(store);

    let reopened = debounced(dir.path(), 500);
    reopened.load_or_initialize();
    assert!(reopened.read(|s| s.preflight.all_passed));

    reopened.clear_drafts().unwrap();
    let preflight = reopened.read(|s| s.preflight.clone());
    assert!(!preflight.drafts_checked);
    assert!(!preflight.all_passed);
    assert!(preflight.auth_checked);
}

#[test]
fn dropping_the_store_flushes_pending_changes() {
    let dir = tempdir().unwrap();
    let store = debounced(dir.path(), 60_000);
    store.load_or_initialize();
    store.append_draft(draft("pending")).unwrap();
    drop(store);

    let reopened = debounced(dir.path(), 500);
    reopened.load_or_initialize();
    assert_eq!(reopened.snapshot().drafts.len(), 1);
}
