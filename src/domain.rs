use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A single text snippet as held by the store.
///
/// `id`, `name` and `content` are never empty once a snippet has passed
/// through [`crate::store::validate()`] or [`crate::store::SnippetStore::add`].
///
/// Written to the file as is; reading goes through [`SnippetRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub id: String,
    pub name: String,
    pub description: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created: NaiveDate,
    pub modified: NaiveDate,
}

impl Snippet {
    /// Creates an in-memory snippet with no id yet.
    ///
    /// The store assigns an id derived from the name when the snippet is
    /// added. Both dates are set to today.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Snippet {
        let today = today();
        Snippet {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            content: content.into(),
            tags: Vec::new(),
            created: today,
            modified: today,
        }
    }

    /// Returns a copy of this snippet with an explicit id.
    pub fn with_id(&self, id: impl Into<String>) -> Snippet {
        Snippet {
            id: id.into(),
            ..self.clone()
        }
    }

    /// Returns a copy of this snippet with a new description.
    pub fn with_description(&self, description: impl Into<String>) -> Snippet {
        Snippet {
            description: description.into(),
            ..self.clone()
        }
    }

    /// Returns a copy of this snippet with new content.
    ///
    /// Does not touch `modified`; the store stamps that when the
    /// replacement is saved.
    pub fn with_content(&self, content: impl Into<String>) -> Snippet {
        Snippet {
            content: content.into(),
            ..self.clone()
        }
    }

    /// Returns a copy of this snippet with the given tags, normalized.
    pub fn with_tags<I, S>(&self, tags: I) -> Snippet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Snippet {
            tags: normalize_tags(tags),
            ..self.clone()
        }
    }
}

/// One entry of the backing file exactly as parsed.
///
/// Every field is optional so that a single bad entry can be dropped
/// without failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SnippetRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Option<TagList>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// Tags as they may appear in the file: a list, or one comma-separated string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    List(Vec<String>),
    Text(String),
}

impl TagList {
    pub fn normalized(&self) -> Vec<String> {
        match self {
            TagList::List(tags) => normalize_tags(tags),
            TagList::Text(text) => parse_tags(text),
        }
    }
}

impl From<&Snippet> for SnippetRecord {
    fn from(snippet: &Snippet) -> Self {
        SnippetRecord {
            id: Some(snippet.id.clone()),
            name: Some(snippet.name.clone()),
            description: Some(snippet.description.clone()),
            content: Some(snippet.content.clone()),
            tags: Some(TagList::List(snippet.tags.clone())),
            created: Some(snippet.created.to_string()),
            modified: Some(snippet.modified.to_string()),
        }
    }
}

/// Normalizes a tag list: trims, lowercases, replaces spaces with hyphens,
/// drops empty entries and later duplicates.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase().replace(' ', "-");
        if tag.is_empty() || out.contains(&tag) {
            continue;
        }
        out.push(tag);
    }
    out
}

/// Splits comma-separated tag input (`"git, Version Control,,"`) and
/// normalizes the result.
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

/// Derives an id from a display name.
///
/// `"Undo last commit (keep changes)"` becomes `"undo-last-commit-keep-changes"`.
/// Falls back to a random UUID when the name has no ASCII alphanumerics.
pub fn derive_id(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        Uuid::new_v4().simple().to_string()
    } else {
        slug.to_string()
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Writes `data` to `path` atomically.
///
/// Data goes to a temporary file in the target directory which is then
/// renamed over `path`, so readers never observe a half-written file.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
