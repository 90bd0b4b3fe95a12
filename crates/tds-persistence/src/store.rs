//! The application state store.
//!
//! [`StateStore`] is the sole owner of the [`ApplicationState`] tree. Every
//! mutation runs under a single gate: the change is validated and applied,
//! a debounced save is scheduled on the saver thread, and subscribers are
//! notified synchronously before the call returns. Disk writes never happen
//! on the mutating thread except for explicit flushes.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use chrono::Utc;
use tds_model::{
    ApplicationState, ConnectionField, DraftArtifact, DraftStatus, GenerationUpdate, NewDraft,
    PreflightCheck, Provider, SendBatchRecord, UiPreferences, push_capped,
};

use crate::autosave::{Saver, SaverMsg};
use crate::config::StoreConfig;
use crate::error::{PersistenceError, StoreError};
use crate::events::{StoreEvent, Subtree};
use crate::io::{load_state, remove_state_files, save_state};
use crate::legacy::{LegacyConfig, LegacyImport};
use crate::paths::StatePaths;

/// Callback registered with [`StateStore::subscribe`].
///
/// Called on the mutating thread while the mutation gate is held. It may
/// read the store but must not mutate it or (un)subscribe.
pub type Subscriber = Box<dyn Fn(&StoreEvent) + Send + Sync>;

/// Handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Save counters since the store was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveStats {
    pub saves: u64,
    pub failures: u64,
}

/// Where the in-memory tree came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Backup,
    Migrated,
    Defaults,
}

impl LoadSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "state file",
            Self::Backup => "backup (recovered)",
            Self::Migrated => "legacy configuration",
            Self::Defaults => "defaults",
        }
    }
}

/// Result of [`StateStore::load_or_initialize`].
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub source: LoadSource,
    /// Set when the startup save failed; the store runs in memory and keeps retrying.
    pub warning: Option<Arc<PersistenceError>>,
}

/// Result of [`StateStore::migrate_legacy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Imported(LegacyImport),
    /// The migration marker was already set.
    Skipped,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the store and its saver thread.
pub(crate) struct Shared {
    state: RwLock<ApplicationState>,
    /// Bumped on every change to `state`, under its write lock.
    revision: AtomicU64,
    /// Highest revision known to be on disk.
    saved_revision: AtomicU64,
    /// Serializes mutation and notification.
    gate: Mutex<()>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    /// At most one write in flight.
    save_lock: Mutex<()>,
    paths: StatePaths,
    saves: AtomicU64,
    failures: AtomicU64,
}

impl Shared {
    fn new(paths: StatePaths) -> Self {
        Self {
            state: RwLock::new(ApplicationState::default()),
            revision: AtomicU64::new(0),
            saved_revision: AtomicU64::new(0),
            gate: Mutex::new(()),
            subscribers: Mutex::new(Vec::new()),
            save_lock: Mutex::new(()),
            paths,
            saves: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.saved_revision.load(Ordering::Acquire) >= self.revision.load(Ordering::Acquire)
    }

    /// Write the current tree to disk.
    pub(crate) fn write_snapshot(&self) -> Result<(), PersistenceError> {
        let _save = lock(&self.save_lock);
        let (snapshot, revision) = {
            let state = read(&self.state);
            (state.clone(), self.revision.load(Ordering::Acquire))
        };
        match save_state(&snapshot, &self.paths) {
            Ok(()) => {
                self.saved_revision.fetch_max(revision, Ordering::AcqRel);
                self.saves.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    /// Deliver `event` to every subscriber. The caller holds the gate.
    fn dispatch(&self, event: &StoreEvent) {
        let subscribers = lock(&self.subscribers);
        for (_, subscriber) in subscribers.iter() {
            subscriber(event);
        }
    }

    /// Report a failed save to subscribers.
    pub(crate) fn warn(&self, err: PersistenceError) {
        let _gate = lock(&self.gate);
        self.dispatch(&StoreEvent::PersistenceWarning(Arc::new(err)));
    }
}

/// Reactive, crash-safe owner of the application state.
///
/// Construct once at startup and share via `Arc`.
pub struct StateStore {
    shared: Arc<Shared>,
    saver: Mutex<Option<Saver>>,
    config: StoreConfig,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("paths", &self.shared.paths)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl StateStore {
    /// Create a store holding the default tree and start its saver thread.
    ///
    /// Nothing is read from disk until [`load_or_initialize`](Self::load_or_initialize).
    pub fn new(config: StoreConfig) -> Arc<Self> {
        let shared = Arc::new(Shared::new(StatePaths::new(&config.state_dir)));
        let saver = if config.autosave.enabled {
            match Saver::spawn(Arc::clone(&shared), config.autosave.clone()) {
                Ok(saver) => Some(saver),
                Err(e) => {
                    tracing::error!(error = %e, "could not start saver thread; changes are saved on flush only");
                    None
                }
            }
        } else {
            None
        };
        Arc::new(Self {
            shared,
            saver: Mutex::new(saver),
            config,
            next_subscription: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn paths(&self) -> &StatePaths {
        &self.shared.paths
    }

    pub fn stats(&self) -> SaveStats {
        SaveStats {
            saves: self.shared.saves.load(Ordering::Relaxed),
            failures: self.shared.failures.load(Ordering::Relaxed),
        }
    }

    /// Whether the in-memory tree has changes not yet on disk.
    pub fn is_dirty(&self) -> bool {
        !self.shared.is_clean()
    }

    /// Clone of the current tree.
    pub fn snapshot(&self) -> ApplicationState {
        read(&self.shared.state).clone()
    }

    /// Run `f` against the current tree.
    pub fn read<R>(&self, f: impl FnOnce(&ApplicationState) -> R) -> R {
        f(&read(&self.shared.state))
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a subscriber. Subscribers are called in registration order.
    pub fn subscribe(&self, subscriber: impl Fn(&StoreEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let _gate = lock(&self.shared.gate);
        lock(&self.shared.subscribers).push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let _gate = lock(&self.shared.gate);
        let mut subscribers = lock(&self.shared.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Apply a mutation under the gate, schedule a save and notify.
    ///
    /// `apply` must leave the tree untouched when it returns an error.
    fn mutate<T>(
        &self,
        subtree: Subtree,
        apply: impl FnOnce(&mut ApplicationState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _gate = lock(&self.shared.gate);
        let value = {
            let mut state = write(&self.shared.state);
            let value = apply(&mut *state)?;
            state.touch();
            self.shared.revision.fetch_add(1, Ordering::AcqRel);
            value
        };
        self.schedule_save();
        self.shared.dispatch(&StoreEvent::Changed(subtree));
        Ok(value)
    }

    /// Like [`Self::mutate`], but leaves the tree, revision and subscribers
    /// alone when `skip` holds under the gate.
    fn mutate_unless<T>(
        &self,
        subtree: Subtree,
        skip: impl FnOnce(&ApplicationState) -> bool,
        apply: impl FnOnce(&mut ApplicationState) -> Result<T, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let _gate = lock(&self.shared.gate);
        let value = {
            let mut state = write(&self.shared.state);
            if skip(&*state) {
                return Ok(None);
            }
            let value = apply(&mut *state)?;
            state.touch();
            self.shared.revision.fetch_add(1, Ordering::AcqRel);
            value
        };
        self.schedule_save();
        self.shared.dispatch(&StoreEvent::Changed(subtree));
        Ok(Some(value))
    }

    fn schedule_save(&self) {
        if let Some(saver) = lock(&self.saver).as_ref() {
            saver.send(SaverMsg::Dirty);
        }
    }

    /// Validate and set one connection field.
    ///
    /// API keys are stored masked; only the last four characters persist.
    pub fn update_connection(
        &self,
        provider: Provider,
        field: ConnectionField,
        value: &str,
    ) -> Result<(), StoreError> {
        self.mutate(Subtree::Connections, |state| {
            Ok(state.connections.apply(provider, field, value)?)
        })
    }

    /// Set a provider's connected/validated flag and stamp last-checked.
    pub fn set_connection_status(&self, provider: Provider, validated: bool) -> Result<(), StoreError> {
        self.mutate(Subtree::Connections, |state| {
            state.connections.set_status(provider, validated, Utc::now());
            Ok(())
        })
    }

    pub fn update_generation(&self, update: GenerationUpdate) -> Result<(), StoreError> {
        self.mutate(Subtree::Generation, |state| {
            Ok(state.generation.apply(update)?)
        })
    }

    /// Replace the UI preferences as a whole.
    pub fn update_ui_preferences(&self, prefs: UiPreferences) -> Result<(), StoreError> {
        prefs.validate()?;
        self.mutate(Subtree::UiPreferences, |state| {
            state.ui = prefs;
            Ok(())
        })
    }

    /// Assign the next ticket number to `draft` and append it.
    ///
    /// The counter bump and the append land in the same revision, so every
    /// save carries both or neither.
    pub fn append_draft(&self, draft: NewDraft) -> Result<DraftArtifact, StoreError> {
        self.mutate(Subtree::Drafts, |state| {
            Ok(state.allocate_draft(draft)?.clone())
        })
    }

    /// Ids the next `count` appends would receive.
    pub fn peek_next_ids(&self, count: u32) -> Vec<u64> {
        self.read(|state| state.peek_ids(count).collect())
    }

    pub fn update_draft_status(
        &self,
        id: u64,
        status: DraftStatus,
        detail: Option<String>,
    ) -> Result<(), StoreError> {
        self.mutate(Subtree::Drafts, |state| {
            let draft = state.draft_mut(id).ok_or(StoreError::NotFound { id })?;
            Ok(draft.set_status(status, detail, Utc::now())?)
        })
    }

    /// Remove all drafts. The ticket counter is kept.
    ///
    /// Returns the number of drafts removed.
    pub fn clear_drafts(&self) -> Result<usize, StoreError> {
        self.mutate(Subtree::Drafts, |state| {
            let removed = state.drafts.len();
            state.drafts.clear();
            state.preflight.invalidate_drafts();
            Ok(removed)
        })
    }

    /// Record one pre-send check; `all_passed` follows the five flags.
    pub fn record_preflight(&self, check: PreflightCheck, passed: bool) -> Result<(), StoreError> {
        self.mutate(Subtree::Preflight, |state| {
            state.preflight.record(check, passed);
            Ok(())
        })
    }

    /// Append a send batch record, keeping the newest 100.
    pub fn record_send_batch(&self, record: SendBatchRecord) -> Result<(), StoreError> {
        record.validate()?;
        self.mutate(Subtree::History, |state| {
            push_capped(&mut state.history, record);
            Ok(())
        })
    }

    pub fn complete_onboarding(&self) -> Result<(), StoreError> {
        self.mutate(Subtree::Onboarding, |state| {
            state.first_run_complete = true;
            Ok(())
        })
    }

    /// Reinitialize to defaults and delete the persisted files.
    ///
    /// The files are recreated by the next save.
    pub fn reset(&self) -> Result<(), StoreError> {
        let _gate = lock(&self.shared.gate);
        {
            let _save = lock(&self.shared.save_lock);
            remove_state_files(&self.shared.paths)?;
            let mut state = write(&self.shared.state);
            *state = ApplicationState::default();
            let revision = self.shared.revision.fetch_add(1, Ordering::AcqRel) + 1;
            self.shared.saved_revision.store(revision, Ordering::Release);
        }
        tracing::info!(dir = %self.shared.paths.dir.display(), "application state reset");
        self.shared.dispatch(&StoreEvent::Changed(Subtree::All));
        Ok(())
    }

    // =========================================================================
    // Load, migration and flush
    // =========================================================================

    /// Replace the whole tree and notify.
    fn install(&self, state: ApplicationState) {
        let _gate = lock(&self.shared.gate);
        {
            let mut current = write(&self.shared.state);
            *current = state;
            self.shared.revision.fetch_add(1, Ordering::AcqRel);
        }
        self.shared.dispatch(&StoreEvent::Changed(Subtree::All));
    }

    /// Flush, or hand the failure to subscribers and the retrying saver.
    fn persist_or_warn(&self) -> Option<Arc<PersistenceError>> {
        match self.flush_now() {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(error = %err, "state could not be written; running in memory");
                let err = Arc::new(err);
                {
                    let _gate = lock(&self.shared.gate);
                    self.shared
                        .dispatch(&StoreEvent::PersistenceWarning(Arc::clone(&err)));
                }
                self.schedule_save();
                Some(err)
            }
        }
    }

    /// Startup load: primary, then backup, then legacy import, then defaults.
    ///
    /// Never fails. If even the default tree cannot be written, the store
    /// runs in memory and the outcome carries the persistence error.
    pub fn load_or_initialize(&self) -> LoadOutcome {
        let paths = &self.shared.paths;

        match load_state(&paths.primary) {
            Ok(state) => {
                tracing::info!(
                    path = %paths.primary.display(),
                    drafts = state.drafts.len(),
                    "loaded application state"
                );
                self.install(state);
                self.shared
                    .saved_revision
                    .store(self.shared.revision.load(Ordering::Acquire), Ordering::Release);
                return LoadOutcome {
                    source: LoadSource::Primary,
                    warning: None,
                };
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %paths.primary.display(), "no state file");
            }
            Err(e) => {
                tracing::warn!(error = %e, "primary state file unusable");
                self.set_aside_primary();
            }
        }

        match load_state(&paths.backup) {
            Ok(state) => {
                tracing::warn!(path = %paths.backup.display(), "recovered application state from backup");
                self.install(state);
                let warning = self.persist_or_warn();
                {
                    let _gate = lock(&self.shared.gate);
                    self.shared.dispatch(&StoreEvent::CorruptionRecovered {
                        backup: paths.backup.clone(),
                    });
                }
                return LoadOutcome {
                    source: LoadSource::Backup,
                    warning,
                };
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => tracing::warn!(error = %e, "backup state file unusable"),
        }

        if let Some(legacy) = self.config.legacy_path.as_deref()
            && legacy.exists()
        {
            match LegacyConfig::read(legacy) {
                Ok(config) => {
                    let mut state = ApplicationState::default();
                    let import = config.apply(&mut state, Utc::now());
                    tracing::info!(
                        path = %legacy.display(),
                        applied = ?import.applied,
                        ignored = ?import.ignored,
                        "imported legacy configuration"
                    );
                    self.install(state);
                    return LoadOutcome {
                        source: LoadSource::Migrated,
                        warning: self.persist_or_warn(),
                    };
                }
                Err(e) => tracing::warn!(error = %e, "legacy configuration unreadable"),
            }
        }

        tracing::info!(dir = %paths.dir.display(), "initializing default application state");
        self.install(ApplicationState::default());
        LoadOutcome {
            source: LoadSource::Defaults,
            warning: self.persist_or_warn(),
        }
    }

    /// Move an unusable primary to the corrupt slot so no fallback save
    /// overwrites it.
    fn set_aside_primary(&self) {
        let paths = &self.shared.paths;
        if !paths.primary.exists() {
            return;
        }
        match fs::rename(&paths.primary, &paths.corrupt) {
            Ok(()) => tracing::warn!(path = %paths.corrupt.display(), "moved unusable state file aside"),
            Err(e) => tracing::warn!(error = %e, "could not move unusable state file aside"),
        }
    }

    /// Import a legacy flat configuration once.
    ///
    /// A no-op returning [`MigrationOutcome::Skipped`] when the migration
    /// marker is already set; the marker is checked again under the gate so
    /// concurrent callers import at most once. The import is persisted
    /// immediately. A failed write is reported as a
    /// [`StoreEvent::PersistenceWarning`] and retried by the saver; the
    /// import itself stands.
    pub fn migrate_legacy(&self, path: &Path) -> Result<MigrationOutcome, StoreError> {
        if self.read(|state| state.migration.legacy_imported) {
            tracing::info!(path = %path.display(), "legacy configuration already imported; skipping");
            return Ok(MigrationOutcome::Skipped);
        }
        let config = LegacyConfig::read(path)?;
        let imported = self.mutate_unless(
            Subtree::All,
            |state| state.migration.legacy_imported,
            |state| Ok(config.apply(state, Utc::now())),
        )?;
        let Some(import) = imported else {
            tracing::info!(path = %path.display(), "legacy configuration imported concurrently; skipping");
            return Ok(MigrationOutcome::Skipped);
        };
        tracing::info!(
            path = %path.display(),
            applied = ?import.applied,
            ignored = ?import.ignored,
            "imported legacy configuration"
        );
        self.persist_or_warn();
        Ok(MigrationOutcome::Imported(import))
    }

    /// Write the current tree now, bypassing the debounce window.
    pub fn flush_now(&self) -> Result<(), PersistenceError> {
        self.shared.write_snapshot()
    }

    /// Stop the saver thread and write the tree one final time.
    pub fn shutdown_flush(&self) -> Result<(), PersistenceError> {
        let saver = lock(&self.saver).take();
        if let Some(mut saver) = saver {
            saver.stop(false);
        }
        self.flush_now()?;
        tracing::info!(path = %self.shared.paths.primary.display(), "state flushed on shutdown");
        Ok(())
    }
}
