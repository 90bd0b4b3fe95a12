//! Background saver thread.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};

use super::{AutoSaveConfig, DirtyTracker};
use crate::store::Shared;

pub(crate) enum SaverMsg {
    /// A mutation happened; (re)start the debounce timer.
    Dirty,
    /// Exit the loop, saving pending changes first when `flush` is set.
    Stop { flush: bool },
}

/// Handle to the dedicated saver thread.
pub(crate) struct Saver {
    tx: Sender<SaverMsg>,
    handle: Option<JoinHandle<()>>,
}

impl Saver {
    pub(crate) fn spawn(shared: Arc<Shared>, config: AutoSaveConfig) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("tds-saver".into())
            .spawn(move || run(&shared, &rx, &config))?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    pub(crate) fn send(&self, msg: SaverMsg) {
        if self.tx.send(msg).is_err() {
            tracing::debug!("saver thread already stopped");
        }
    }

    /// Stop the thread and wait for it.
    pub(crate) fn stop(&mut self, flush: bool) {
        self.send(SaverMsg::Stop { flush });
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("saver thread panicked");
        }
    }
}

impl Drop for Saver {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop(true);
        }
    }
}

fn run(shared: &Shared, rx: &mpsc::Receiver<SaverMsg>, config: &AutoSaveConfig) {
    let mut tracker = DirtyTracker::new();
    tracing::debug!(debounce_ms = config.debounce_ms, "saver started");

    loop {
        let msg = match tracker.time_until_due(config) {
            Some(wait) => rx.recv_timeout(wait),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match msg {
            Ok(SaverMsg::Dirty) => tracker.mark_dirty(),
            Ok(SaverMsg::Stop { flush }) => {
                if flush && tracker.is_dirty() {
                    save_pending(shared, &mut tracker, config);
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if tracker.should_auto_save(config) {
                    save_pending(shared, &mut tracker, config);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if tracker.is_dirty() {
                    save_pending(shared, &mut tracker, config);
                }
                break;
            }
        }
    }
    tracing::debug!("saver stopped");
}

fn save_pending(shared: &Shared, tracker: &mut DirtyTracker, config: &AutoSaveConfig) {
    if shared.is_clean() {
        // An explicit flush already wrote this revision.
        tracker.save_complete();
        return;
    }
    match shared.write_snapshot() {
        Ok(()) => {
            if tracker.failures() > 0 {
                tracing::info!(failures = tracker.failures(), "save succeeded after retries");
            }
            tracker.save_complete();
        }
        Err(err) => {
            let delay = tracker.save_failed(config);
            tracing::warn!(
                error = %err,
                failures = tracker.failures(),
                retry_in_ms = delay.as_millis() as u64,
                "background save failed"
            );
            shared.warn(err);
        }
    }
}
