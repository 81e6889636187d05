use std::{
    path::{Path, PathBuf},
    sync::mpsc::channel,
    thread::{self, JoinHandle},
    time::Duration,
};

use log::info;
use notify::{EventKind, RecommendedWatcher};

use crate::watcher::{debounce::Debouncer, watcher::setup_file_watcher};

/// A running watch on one file.
///
/// Owns the `notify` watcher and the debouncer thread; `on_change` runs on
/// the debouncer thread once per settled burst of changes.
pub struct WatcherService {
    watcher: Option<RecommendedWatcher>,
    debouncer_thread: Option<JoinHandle<()>>,
    watch_path: PathBuf,
}

impl WatcherService {
    pub fn start<F>(file: &Path, debounce_duration: Duration, on_change: F) -> Result<Self, notify::Error>
    where
        F: FnMut() + Send + 'static,
    {
        let (raw_tx, raw_rx) = channel::<EventKind>();
        let watcher = setup_file_watcher(file, raw_tx)?;

        let debouncer = Debouncer::new(debounce_duration);
        let debouncer_thread = thread::spawn(move || {
            debouncer.run(raw_rx, on_change);
        });

        info!("watcher: watching {}", file.display());
        Ok(WatcherService {
            watcher: Some(watcher),
            debouncer_thread: Some(debouncer_thread),
            watch_path: file.to_path_buf(),
        })
    }

    pub fn watch_path(&self) -> &Path {
        &self.watch_path
    }

    pub fn shutdown(&mut self) {
        // NOTE: dropping the watcher drops its event handler and with it the
        // raw sender, which ends the debouncer loop.
        self.watcher.take();

        if let Some(handle) = self.debouncer_thread.take() {
            let _ = handle.join();
            info!("watcher: stopped watching {}", self.watch_path.display());
        }
    }
}

impl Drop for WatcherService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
