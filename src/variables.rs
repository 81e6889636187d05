//! Template placeholders inside snippet content.
//!
//! A placeholder is `{{name}}` or `{{name:default}}`. Names are ASCII
//! letters, digits and underscores; surrounding whitespace inside the braces
//! is tolerated, so `{{ name }}` is the same variable as `{{name}}`. The
//! default is everything after the first `:`, which keeps values such as
//! `{{url:https://example.com}}` or `{{time:12:30:45}}` intact.
//!
//! ```rust
//! use snip_core::variables::{detect, substitute};
//! use std::collections::HashMap;
//!
//! let content = "Hello {{name}}, port {{port:8080}}";
//! assert_eq!(detect(content).len(), 2);
//!
//! let values = HashMap::from([("name".to_string(), "Alice".to_string())]);
//! assert_eq!(substitute(content, &values).unwrap(), "Hello Alice, port 8080");
//! ```

use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariableError {
    #[error("no value provided for variable '{0}' and no default specified")]
    MissingValue(String),
}

/// A variable found in snippet content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub default: Option<String>,
}

/// One `{{...}}` span with a valid name.
struct Placeholder<'a> {
    name: &'a str,
    default: Option<&'a str>,
    /// Byte offset just past the closing `}}`.
    end: usize,
}

/// Memoized forward search for one needle.
///
/// Callers ask from positions that mostly move forward, so the last hit is
/// reused until the scan passes it and each byte is searched about once.
struct NextMatch<'a> {
    haystack: &'a str,
    needle: &'static str,
    searched_from: usize,
    found: Option<usize>,
}

impl<'a> NextMatch<'a> {
    fn new(haystack: &'a str, needle: &'static str) -> Self {
        NextMatch {
            haystack,
            needle,
            searched_from: usize::MAX,
            found: None,
        }
    }

    /// First occurrence at or after byte `from`.
    fn next_from(&mut self, from: usize) -> Option<usize> {
        let cached = from >= self.searched_from && self.found.is_none_or(|at| at >= from);
        if !cached {
            self.searched_from = from;
            self.found = self
                .haystack
                .get(from..)
                .and_then(|rest| rest.find(self.needle))
                .map(|at| at + from);
        }
        self.found
    }
}

/// Finds placeholders in one piece of content.
///
/// Queries must come in increasing `start` order to stay linear overall.
struct Scanner<'a> {
    content: &'a str,
    closes: NextMatch<'a>,
    newlines: NextMatch<'a>,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Scanner {
            content,
            closes: NextMatch::new(content, "}}"),
            newlines: NextMatch::new(content, "\n"),
        }
    }

    /// Parses a placeholder starting exactly at byte `start`, if there is one.
    ///
    /// The body is the shortest non-empty run up to the next `}}` and may
    /// not cross a line break.
    fn at(&mut self, start: usize) -> Option<Placeholder<'a>> {
        let content = self.content;
        if !content.get(start..)?.starts_with("{{") {
            return None;
        }

        let body_start = start + 2;
        let first = content[body_start..].chars().next()?;
        let close = self.closes.next_from(body_start + first.len_utf8())?;
        if self.newlines.next_from(body_start).is_some_and(|at| at < close) {
            return None;
        }

        // Only the name is scanned here; the default runs to `close`.
        let body = content[body_start..close].trim_start();
        let name_len = body
            .find(|c: char| !is_name_char(c))
            .unwrap_or(body.len());
        let (name, rest) = body.split_at(name_len);
        if name.is_empty() {
            return None;
        }
        let rest = rest.trim_start();
        let default = if rest.is_empty() {
            None
        } else {
            Some(rest.strip_prefix(':')?)
        };

        Some(Placeholder {
            name,
            default,
            end: close + 2,
        })
    }
}

/// Byte offsets of every `{{`, overlapping ones included.
fn openings(content: &str) -> impl Iterator<Item = usize> + '_ {
    content
        .as_bytes()
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] == b'{' && pair[1] == b'{')
        .map(|(start, _)| start)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lists the variables in `content` in order of first appearance.
///
/// Every `{{` opens a candidate, including ones nested inside another
/// candidate, so `{{{var}}}` yields `var`. Spans whose name is not valid are
/// ignored. A repeated variable is reported once with the first occurrence's
/// default.
pub fn detect(content: &str) -> Vec<Variable> {
    let mut variables: Vec<Variable> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut scanner = Scanner::new(content);

    for start in openings(content) {
        let Some(placeholder) = scanner.at(start) else {
            continue;
        };
        if !seen.insert(placeholder.name) {
            continue;
        }
        variables.push(Variable {
            name: placeholder.name.to_string(),
            default: placeholder.default.map(str::to_string),
        });
    }

    variables
}

/// Returns true if `content` holds at least one placeholder.
pub fn has_variables(content: &str) -> bool {
    let mut scanner = Scanner::new(content);
    openings(content).any(|start| scanner.at(start).is_some())
}

/// Replaces every placeholder in `content`.
///
/// Each variable resolves to `values[name]`, else to its detected default.
/// If any variable has neither, nothing is substituted and
/// [`VariableError::MissingValue`] names the first such variable. Values are
/// inserted verbatim.
pub fn substitute(content: &str, values: &HashMap<String, String>) -> Result<String, VariableError> {
    let mut resolved: HashMap<String, String> = HashMap::new();
    for variable in detect(content) {
        let value = match values.get(&variable.name) {
            Some(value) => value.clone(),
            None => variable
                .default
                .ok_or_else(|| VariableError::MissingValue(variable.name.clone()))?,
        };
        resolved.insert(variable.name, value);
    }

    let mut scanner = Scanner::new(content);
    let mut out = String::with_capacity(content.len());
    let mut pos = 0;
    while pos < content.len() {
        if let Some(placeholder) = scanner.at(pos) {
            if let Some(value) = resolved.get(placeholder.name) {
                out.push_str(value);
                pos = placeholder.end;
                continue;
            }
        }
        let Some(c) = content[pos..].chars().next() else {
            break;
        };
        out.push(c);
        pos += c.len_utf8();
    }

    Ok(out)
}
