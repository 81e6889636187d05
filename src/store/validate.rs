use crate::domain::{Snippet, SnippetRecord, derive_id, today};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::HashSet;
use thiserror::Error;

/// A problem found in snippet entries.
///
/// Inside [`validate`] these are repaired (the entry is dropped or renamed)
/// and only reported; [`super::SnippetStore::add`] returns them as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("entry {entry} is missing required field '{field}'")]
    MissingField { entry: String, field: &'static str },

    #[error("entry {entry} is malformed: {message}")]
    Malformed { entry: String, message: String },

    #[error("duplicate id '{original}' renamed to '{renamed}'")]
    DuplicateId { original: String, renamed: String },
}

/// Result of validating a batch of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    pub snippets: Vec<Snippet>,

    /// Everything that was dropped or renamed, in file order.
    pub issues: Vec<ValidationError>,
}

impl Validated {
    pub fn renames(&self) -> impl Iterator<Item = &ValidationError> {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, ValidationError::DuplicateId { .. }))
    }
}

/// Turns raw entries into snippets.
///
/// Entries without a name or content are dropped. Entries without an id get
/// one derived from their name. When an id repeats, every occurrence after
/// the first is renamed to `<id>-1`, `<id>-2`, ... (first free suffix).
/// Running this again on its own output changes nothing.
pub fn validate(records: Vec<SnippetRecord>) -> Validated {
    let mut out = Validated::default();
    let mut seen: HashSet<String> = HashSet::new();
    let today = today();

    for (index, record) in records.into_iter().enumerate() {
        let label = entry_label(index, record.id.as_deref());

        let Some(name) = non_empty(record.name) else {
            out.issues.push(missing(label, "name"));
            continue;
        };
        let Some(content) = non_empty(record.content) else {
            out.issues.push(missing(label, "content"));
            continue;
        };

        let mut id = match non_empty(record.id) {
            Some(id) => id,
            None => {
                let id = derive_id(&name);
                debug!("store: entry #{index} has no id, using '{id}'");
                id
            }
        };
        if seen.contains(&id) {
            let renamed = unique_id(&id, |candidate| seen.contains(candidate));
            warn!("store: duplicate id '{id}' renamed to '{renamed}'");
            out.issues.push(ValidationError::DuplicateId {
                original: id,
                renamed: renamed.clone(),
            });
            id = renamed;
        }
        seen.insert(id.clone());

        out.snippets.push(Snippet {
            id,
            name,
            description: record.description.unwrap_or_default(),
            content,
            tags: record.tags.map(|t| t.normalized()).unwrap_or_default(),
            created: parse_date(record.created.as_deref(), today),
            modified: parse_date(record.modified.as_deref(), today),
        });
    }

    out
}

/// First `<base>-<n>` (n = 1, 2, ...) for which `is_taken` is false.
pub(crate) fn unique_id(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut counter = 1usize;
    loop {
        let candidate = format!("{base}-{counter}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

pub(crate) fn entry_label(index: usize, id: Option<&str>) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => format!("#{index} ({id})"),
        _ => format!("#{index}"),
    }
}

fn missing(entry: String, field: &'static str) -> ValidationError {
    let issue = ValidationError::MissingField { entry, field };
    warn!("store: {issue}, skipping");
    issue
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(value: Option<&str>, fallback: NaiveDate) -> NaiveDate {
    value
        .and_then(|v| v.trim().parse::<NaiveDate>().ok())
        .unwrap_or(fallback)
}
