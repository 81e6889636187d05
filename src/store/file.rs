use super::StoreError;
use super::backup;
use super::validate::{Validated, ValidationError, entry_label, validate};
use crate::domain::{Snippet, SnippetRecord, today, write_atomic};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Schema version written to the backing file.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Deserialize)]
struct RawDocument {
    version: Option<u32>,
    snippets: Vec<serde_yaml::Value>,
}

#[derive(Serialize)]
struct Document<'a> {
    version: u32,
    snippets: &'a [Snippet],
}

/// Parses file text into raw entries.
///
/// Fails only if the document as a whole is unusable. Entries with the
/// wrong shape (e.g. `tags: {a: 1}`) are returned as issues instead.
pub(crate) fn parse(text: &str) -> Result<(Vec<SnippetRecord>, Vec<ValidationError>), serde_yaml::Error> {
    let doc: RawDocument = serde_yaml::from_str(text)?;
    if let Some(version) = doc.version {
        if version > SCHEMA_VERSION {
            warn!("store: file schema version {version} is newer than {SCHEMA_VERSION}, reading anyway");
        }
    }

    let mut records = Vec::with_capacity(doc.snippets.len());
    let mut rejected = Vec::new();
    for (index, value) in doc.snippets.into_iter().enumerate() {
        match serde_yaml::from_value::<SnippetRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                let issue = ValidationError::Malformed {
                    entry: entry_label(index, None),
                    message: e.to_string(),
                };
                warn!("store: {issue}, skipping");
                rejected.push(issue);
            }
        }
    }
    Ok((records, rejected))
}

pub(crate) fn render(snippets: &[Snippet]) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&Document {
        version: SCHEMA_VERSION,
        snippets,
    })
}

/// Reads and validates the snippet file at `path`.
pub(crate) fn read(path: &Path) -> Result<Validated, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => StoreError::Missing(path.to_path_buf()),
        _ => StoreError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let (records, mut issues) = parse(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut validated = validate(records);
    issues.append(&mut validated.issues);
    validated.issues = issues;
    Ok(validated)
}

/// Rotates backups, then atomically replaces `path` with `snippets`.
pub(crate) fn write(path: &Path, snippets: &[Snippet]) -> Result<(), StoreError> {
    let persistence = |source: std::io::Error| StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let text = render(snippets).map_err(|e| persistence(std::io::Error::other(e)))?;
    backup::rotate(path).map_err(persistence)?;
    write_atomic(path, text.as_bytes()).map_err(persistence)?;

    info!("store: saved {} snippets to {}", snippets.len(), path.display());
    Ok(())
}

/// The collection written when no snippet file exists yet.
pub fn sample_snippets() -> Vec<Snippet> {
    let today = today();
    let sample = |id: &str, name: &str, description: &str, content: &str, tags: &[&str]| Snippet {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        content: content.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        created: today,
        modified: today,
    };

    vec![
        sample(
            "ps-list-files",
            "List files by size",
            "PowerShell command to list files sorted by size",
            "Get-ChildItem -Path . -File -Recurse |\n\
             Sort-Object -Property Length -Descending |\n\
             Select-Object -First 20 @{Name=\"Size(MB)\";Expression={[math]::Round($_.Length/1MB,2)}}, FullName\n",
            &["powershell", "files", "disk"],
        ),
        sample(
            "flask-run",
            "Flask development server",
            "Start Flask app with custom port and debug enabled",
            "python -m flask --app {{app_name:app}} run --debug --port {{port:5000}}\n",
            &["python", "flask", "development"],
        ),
        sample(
            "git-uncommit",
            "Undo last commit (keep changes)",
            "Git command to undo last commit but keep changes in working directory",
            "git reset --soft HEAD~1",
            &["git", "version-control"],
        ),
        sample(
            "llm-code-review",
            "Code review prompt",
            "Request detailed code review from LLM",
            "Please review the following code for:\n\
             - Performance issues\n\
             - Security vulnerabilities\n\
             - Code style and readability\n\
             - Edge cases and error handling\n\
             \n\
             Code:\n\
             ```\n\
             {{code_snippet}}\n\
             ```\n",
            &["llm", "code-review", "ai"],
        ),
        sample(
            "win-reset-network",
            "Reset network adapter",
            "Reset all network settings (requires admin)",
            "ipconfig /release\n\
             ipconfig /renew\n\
             netsh winsock reset catalog\n\
             netsh int ip reset reset.log\n",
            &["windows", "network", "admin"],
        ),
        sample(
            "ps-file-search",
            "Find file by pattern",
            "Search for files matching name pattern, return metadata",
            "Get-ChildItem -Path {{search_path:.}} -Filter {{pattern:*.txt}} -Recurse -ErrorAction SilentlyContinue |\n\
             Select-Object FullName, LastWriteTime |\n\
             Sort-Object LastWriteTime -Descending\n",
            &["powershell", "files", "search"],
        ),
    ]
}
