//! The snippet store.
//!
//! [`SnippetStore`] owns the authoritative snippet collection backed by a
//! single YAML file. All mutations run on one writer thread, fed through a
//! queue, so caller operations and watcher-triggered reloads never
//! interleave. Readers take [`Snapshot`]s, immutable `Arc`s that are swapped
//! atomically after every successful change.
//!
//! # Failure model
//!
//! - A malformed file never costs the user their snippets: [`SnippetStore::load`]
//!   keeps the last known good collection and logs the problem, and
//!   [`SnippetStore::reload`] returns the error while keeping the collection.
//! - Bad entries are repaired rather than rejected: entries without a name
//!   or content are dropped, duplicate ids are renamed (see [`validate()`]).
//! - Writes are write-then-commit. If rotating backups or writing the file
//!   fails, the caller gets [`StoreError::Persistence`] and memory is unchanged.
//!
//! ```rust,no_run
//! use snip_core::domain::Snippet;
//! use snip_core::store::SnippetStore;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), snip_core::SnipError> {
//! let mut store = SnippetStore::open("/home/me/snippets/snippets.yaml");
//! store.watch(Duration::from_millis(500))?;
//!
//! let added = store.add(Snippet::new("Docker prune", "docker system prune -af"))?;
//! assert_eq!(added.id, "docker-prune");
//!
//! store.delete(&[added.id.as_str()])?;
//! println!("{} snippets", store.snapshot().len());
//! # Ok(())
//! # }
//! ```

pub mod backup;
mod file;
pub mod validate;
mod worker;

pub use backup::{BackupInfo, MAX_BACKUPS};
pub use file::{SCHEMA_VERSION, sample_snippets};
pub use validate::{Validated, ValidationError, validate};

use crate::config::EngineConfig;
use crate::domain::Snippet;
use crate::watcher::service::WatcherService;
use arc_swap::ArcSwap;
use log::info;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use worker::{Command, Reply, Writer};

/// An immutable view of the collection at one point in time.
pub type Snapshot = Arc<Vec<Snippet>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {0}")]
    Missing(PathBuf),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to save {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snippet id(s) not found: {}", .0.join(", "))]
    NotFound(Vec<String>),

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("snippet store is shut down")]
    Closed,
}

pub struct SnippetStore {
    path: PathBuf,
    published: Arc<ArcSwap<Vec<Snippet>>>,
    commands: Option<Sender<Command>>,
    writer: Option<JoinHandle<()>>,
    watcher: Option<WatcherService>,
}

impl SnippetStore {
    /// Starts a store for the snippet file at `path` and loads it.
    ///
    /// A missing file is created with the built-in sample collection.
    pub fn open(path: impl Into<PathBuf>) -> SnippetStore {
        let path = path.into();
        let published = Arc::new(ArcSwap::from_pointee(Vec::new()));
        let (tx, rx) = mpsc::channel::<Command>();

        let writer = Writer::new(path.clone(), Arc::clone(&published));
        let handle = thread::spawn(move || writer.run(rx));

        let store = SnippetStore {
            path,
            published,
            commands: Some(tx),
            writer: Some(handle),
            watcher: None,
        };
        store.load();
        store
    }

    /// Opens the store named by `config` and, if `auto_reload` is set,
    /// starts watching it.
    pub fn from_config(config: &EngineConfig) -> Result<SnippetStore, StoreError> {
        let mut store = SnippetStore::open(&config.snippet_file);
        if config.auto_reload {
            store.watch(config.reload_debounce())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current collection. Never blocks on the writer.
    pub fn snapshot(&self) -> Snapshot {
        self.published.load_full()
    }

    /// Re-reads the file, falling back to the last known good collection if
    /// it cannot be read or parsed.
    pub fn load(&self) -> Snapshot {
        let (tx, rx) = mpsc::channel();
        let sent = self
            .commands
            .as_ref()
            .is_some_and(|commands| commands.send(Command::Load(tx)).is_ok());
        if !sent {
            return self.snapshot();
        }
        rx.recv().unwrap_or_else(|_| self.snapshot())
    }

    /// Re-reads the file and swaps the collection only if it parses.
    pub fn reload(&self) -> Result<Snapshot, StoreError> {
        self.request(|reply| Command::Reload(Some(reply)))
    }

    /// Appends `snippet` and saves.
    ///
    /// An empty id is derived from the name; an id already in use gets a
    /// `-1`, `-2`, ... suffix. Tags are normalized. Returns the snippet as
    /// stored.
    pub fn add(&self, snippet: Snippet) -> Result<Snippet, StoreError> {
        self.request(|reply| Command::Add(snippet, reply))
    }

    /// Replaces the snippet with the same id and saves.
    ///
    /// `modified` is set to today.
    pub fn update(&self, snippet: Snippet) -> Result<Snippet, StoreError> {
        self.request(|reply| Command::Update(snippet, reply))
    }

    /// Removes every snippet in `ids` and saves.
    ///
    /// If any id is unknown nothing is removed and
    /// [`StoreError::NotFound`] lists the unknown ids.
    pub fn delete<S: AsRef<str>>(&self, ids: &[S]) -> Result<(), StoreError> {
        let ids = ids.iter().map(|id| id.as_ref().to_string()).collect();
        self.request(|reply| Command::Delete(ids, reply))
    }

    /// Sorted, de-duplicated tags of the current collection.
    pub fn all_tags(&self) -> Vec<String> {
        let snapshot = self.snapshot();
        let tags: BTreeSet<&str> = snapshot
            .iter()
            .flat_map(|s| s.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(str::to_string).collect()
    }

    /// Rotation backups currently on disk, most recent first.
    pub fn list_backups(&self) -> Vec<BackupInfo> {
        backup::list(&self.path)
    }

    /// Replaces the snippet file with the backup in `slot` (1 = newest).
    ///
    /// The backup must parse; the current file is itself backed up first.
    pub fn restore_backup(&self, slot: u8) -> Result<Snapshot, StoreError> {
        self.request(|reply| Command::Restore(slot, reply))
    }

    /// Reloads automatically whenever the snippet file changes.
    ///
    /// Bursts of change events closer together than `window` cause a single
    /// reload, `window` after the last event. Calling this again while
    /// already watching does nothing.
    pub fn watch(&mut self, window: Duration) -> Result<(), StoreError> {
        if self.watcher.is_some() {
            return Ok(());
        }
        let commands = self.commands.clone().ok_or(StoreError::Closed)?;
        let service = WatcherService::start(&self.path, window, move || {
            let _ = commands.send(Command::Reload(None));
        })?;
        self.watcher = Some(service);
        Ok(())
    }

    /// Stops watching, drains the writer queue and joins the writer thread.
    ///
    /// Later calls that need the writer return [`StoreError::Closed`];
    /// [`SnippetStore::snapshot`] keeps working.
    pub fn shutdown(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.shutdown();
        }
        // NOTE: dropping the last sender ends the writer loop.
        self.commands.take();
        if let Some(handle) = self.writer.take() {
            let _ = handle.join();
            info!("store: shut down {}", self.path.display());
        }
    }

    fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, StoreError> {
        let commands = self.commands.as_ref().ok_or(StoreError::Closed)?;
        let (tx, rx) = mpsc::channel();
        commands.send(make(tx)).map_err(|_| StoreError::Closed)?;
        rx.recv().map_err(|_| StoreError::Closed)?
    }
}

impl Drop for SnippetStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
