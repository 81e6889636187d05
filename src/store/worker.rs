use super::backup::{self, backup_path};
use super::file::{self, sample_snippets};
use super::validate::{ValidationError, unique_id};
use super::{Snapshot, StoreError};
use crate::domain::{Snippet, derive_id, normalize_tags, today};
use arc_swap::ArcSwap;
use log::{error, info};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};

pub(crate) type Reply<T> = Sender<Result<T, StoreError>>;

/// Work for the writer thread. Every mutation of the collection is one
/// of these, processed strictly in arrival order.
pub(crate) enum Command {
    Load(Sender<Snapshot>),
    /// `None` when triggered by the file watcher; errors are only logged.
    Reload(Option<Reply<Snapshot>>),
    Add(Snippet, Reply<Snippet>),
    Update(Snippet, Reply<Snippet>),
    Delete(Vec<String>, Reply<()>),
    Restore(u8, Reply<Snapshot>),
}

/// Owner of the authoritative collection.
///
/// Lives on its own thread; callers talk to it through [`Command`]s and
/// read the result through the shared [`ArcSwap`].
pub(crate) struct Writer {
    path: PathBuf,
    published: Arc<ArcSwap<Vec<Snippet>>>,
    last_good: Snapshot,
}

impl Writer {
    pub(crate) fn new(path: PathBuf, published: Arc<ArcSwap<Vec<Snippet>>>) -> Self {
        let last_good = published.load_full();
        Writer {
            path,
            published,
            last_good,
        }
    }

    pub(crate) fn run(mut self, commands: Receiver<Command>) {
        while let Ok(command) = commands.recv() {
            self.handle(command);
        }
        info!("store: writer for {} stopped", self.path.display());
    }

    fn handle(&mut self, command: Command) {
        // A closed reply channel means the caller went away; nothing to do.
        match command {
            Command::Load(reply) => {
                let _ = reply.send(self.load());
            }
            Command::Reload(Some(reply)) => {
                let _ = reply.send(self.reload());
            }
            Command::Reload(None) => {
                let _ = self.reload();
            }
            Command::Add(snippet, reply) => {
                let _ = reply.send(self.add(snippet));
            }
            Command::Update(snippet, reply) => {
                let _ = reply.send(self.update(snippet));
            }
            Command::Delete(ids, reply) => {
                let _ = reply.send(self.delete(ids));
            }
            Command::Restore(slot, reply) => {
                let _ = reply.send(self.restore(slot));
            }
        }
    }

    fn commit(&mut self, snippets: Vec<Snippet>) -> Snapshot {
        let snapshot = Arc::new(snippets);
        self.published.store(Arc::clone(&snapshot));
        self.last_good = Arc::clone(&snapshot);
        snapshot
    }

    fn load(&mut self) -> Snapshot {
        if !self.path.exists() {
            return self.materialize_sample();
        }

        match file::read(&self.path) {
            Ok(validated) => {
                info!(
                    "store: loaded {} snippets from {}",
                    validated.snippets.len(),
                    self.path.display()
                );
                self.commit(validated.snippets)
            }
            Err(e) => {
                error!(
                    "store: {e}; keeping last known good state ({} snippets)",
                    self.last_good.len()
                );
                Arc::clone(&self.last_good)
            }
        }
    }

    fn materialize_sample(&mut self) -> Snapshot {
        let sample = sample_snippets();
        match file::write(&self.path, &sample) {
            Ok(()) => info!("store: created sample snippet file at {}", self.path.display()),
            Err(e) => error!("store: could not create sample snippet file: {e}"),
        }
        self.commit(sample)
    }

    fn reload(&mut self) -> Result<Snapshot, StoreError> {
        match file::read(&self.path) {
            Ok(validated) => {
                info!(
                    "store: reloaded {} snippets from {}",
                    validated.snippets.len(),
                    self.path.display()
                );
                Ok(self.commit(validated.snippets))
            }
            Err(e) => {
                error!(
                    "store: reload failed, keeping {} snippets: {e}",
                    self.last_good.len()
                );
                Err(e)
            }
        }
    }

    fn add(&mut self, snippet: Snippet) -> Result<Snippet, StoreError> {
        let mut snippet = prepare(snippet)?;

        let base = if snippet.id.trim().is_empty() {
            derive_id(&snippet.name)
        } else {
            snippet.id.clone()
        };
        let taken: HashSet<&str> = self.last_good.iter().map(|s| s.id.as_str()).collect();
        snippet.id = if taken.contains(base.as_str()) {
            unique_id(&base, |candidate| taken.contains(candidate))
        } else {
            base
        };

        let mut next = Vec::with_capacity(self.last_good.len() + 1);
        next.extend(self.last_good.iter().cloned());
        next.push(snippet.clone());

        file::write(&self.path, &next)?;
        self.commit(next);
        info!("store: added snippet '{}' ({})", snippet.name, snippet.id);
        Ok(snippet)
    }

    fn update(&mut self, snippet: Snippet) -> Result<Snippet, StoreError> {
        let Some(index) = self.last_good.iter().position(|s| s.id == snippet.id) else {
            return Err(StoreError::NotFound(vec![snippet.id]));
        };
        let mut snippet = prepare(snippet)?;
        snippet.modified = today();

        let mut next: Vec<Snippet> = self.last_good.as_ref().clone();
        next[index] = snippet.clone();

        file::write(&self.path, &next)?;
        self.commit(next);
        info!("store: updated snippet '{}' ({})", snippet.name, snippet.id);
        Ok(snippet)
    }

    fn delete(&mut self, ids: Vec<String>) -> Result<(), StoreError> {
        let existing: HashSet<&str> = self.last_good.iter().map(|s| s.id.as_str()).collect();
        let mut missing: Vec<String> = Vec::new();
        for id in &ids {
            if !existing.contains(id.as_str()) && !missing.contains(id) {
                missing.push(id.clone());
            }
        }
        if !missing.is_empty() {
            return Err(StoreError::NotFound(missing));
        }
        if ids.is_empty() {
            return Ok(());
        }

        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let next: Vec<Snippet> = self
            .last_good
            .iter()
            .filter(|s| !doomed.contains(s.id.as_str()))
            .cloned()
            .collect();

        file::write(&self.path, &next)?;
        self.commit(next);
        info!("store: deleted {} snippet(s): {}", ids.len(), ids.join(", "));
        Ok(())
    }

    fn restore(&mut self, slot: u8) -> Result<Snapshot, StoreError> {
        let source = backup_path(&self.path, slot);
        if !(1..=backup::MAX_BACKUPS).contains(&slot) || !source.exists() {
            return Err(StoreError::Missing(source));
        }

        let validated = file::read(&source)?;
        file::write(&self.path, &validated.snippets)?;
        info!("store: restored {} snippets from {}", validated.snippets.len(), source.display());
        Ok(self.commit(validated.snippets))
    }
}

/// Checks required fields and normalizes tags of a caller-supplied snippet.
fn prepare(mut snippet: Snippet) -> Result<Snippet, ValidationError> {
    let entry = if snippet.id.trim().is_empty() {
        format!("'{}'", snippet.name)
    } else {
        snippet.id.clone()
    };
    if snippet.name.trim().is_empty() {
        return Err(ValidationError::MissingField { entry, field: "name" });
    }
    if snippet.content.trim().is_empty() {
        return Err(ValidationError::MissingField {
            entry,
            field: "content",
        });
    }
    snippet.tags = normalize_tags(&snippet.tags);
    Ok(snippet)
}
