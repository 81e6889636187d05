//! Fuzzy relevance search over snippets.
//!
//! Each snippet is scored against the query field by field, using
//! [`fuzzy::partial_ratio`] so that substrings, typos and case differences
//! still match. Field scores are combined into a weighted average:
//!
//! | field         | weight |
//! |---------------|--------|
//! | `name`        | 3      |
//! | `description` | 2      |
//! | `tags`        | 2 (best single tag) |
//! | `content`     | 1      |
//!
//! Empty fields take part in neither the numerator nor the denominator.
//!
//! # Usage
//!
//! ```rust
//! use snip_core::domain::Snippet;
//! use snip_core::search::{search, SearchOptions};
//!
//! let snippets = vec![
//!     Snippet::new("Flask development server", "python -m flask run").with_id("flask-run"),
//!     Snippet::new("Undo last commit", "git reset --soft HEAD~1").with_id("git-uncommit"),
//! ];
//!
//! // "flsk" is a typo for "flask".
//! let hits = search("flsk", &snippets, &SearchOptions::default());
//! assert_eq!(hits[0].snippet.id, "flask-run");
//! ```

pub mod fuzzy;
pub mod tags;

pub use fuzzy::{Matcher, partial_ratio};
pub use tags::suggest_tags;

use crate::config::{DEFAULT_FUZZY_THRESHOLD, DEFAULT_MAX_RESULTS};
use crate::domain::Snippet;
use std::cmp::Ordering;

pub const WEIGHT_NAME: f64 = 3.0;
pub const WEIGHT_DESCRIPTION: f64 = 2.0;
pub const WEIGHT_TAGS: f64 = 2.0;
pub const WEIGHT_CONTENT: f64 = 1.0;

/// Options for a single search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Minimum overall score (0 to 100) a snippet needs to be returned.
    ///
    /// Defaults to `60.0`.
    pub threshold: f64,

    /// Maximum number of hits returned, applied after sorting.
    ///
    /// Defaults to `10`.
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// A snippet that matched a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub snippet: &'a Snippet,

    /// Weighted relevance score, 0 to 100, rounded to two decimals.
    pub score: f64,
}

/// Ranks `snippets` against `query`.
///
/// Returns an empty list for an empty or whitespace-only query; deciding what
/// to show in that case is up to the caller. Hits below
/// `options.threshold` are dropped, the rest are sorted by descending score
/// (ties by ascending name) and truncated to `options.max_results`.
pub fn search<'a>(query: &str, snippets: &'a [Snippet], options: &SearchOptions) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut matcher = Matcher::default();
    let mut hits: Vec<SearchHit<'a>> = snippets
        .iter()
        .map(|snippet| SearchHit {
            snippet,
            score: score_with(&mut matcher, &query, snippet),
        })
        .filter(|hit| hit.score >= options.threshold)
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.snippet.name.cmp(&b.snippet.name))
    });
    hits.truncate(options.max_results);
    hits
}

/// Weighted score of one snippet for an already trimmed, lowercased query.
pub fn score_snippet(query: &str, snippet: &Snippet) -> f64 {
    score_with(&mut Matcher::default(), query, snippet)
}

fn score_with(matcher: &mut Matcher, query: &str, snippet: &Snippet) -> f64 {
    let mut total = 0.0;
    let mut weights = 0.0;

    let mut add = |score: f64, weight: f64| {
        total += score * weight;
        weights += weight;
    };

    if !snippet.name.is_empty() {
        add(matcher.partial_ratio(query, &snippet.name.to_lowercase()), WEIGHT_NAME);
    }
    if !snippet.description.is_empty() {
        add(
            matcher.partial_ratio(query, &snippet.description.to_lowercase()),
            WEIGHT_DESCRIPTION,
        );
    }
    let best_tag = snippet
        .tags
        .iter()
        .filter(|tag| !tag.is_empty())
        .map(|tag| matcher.partial_ratio(query, &tag.to_lowercase()))
        .fold(None, |best: Option<f64>, score| Some(best.map_or(score, |b| b.max(score))));
    if let Some(score) = best_tag {
        add(score, WEIGHT_TAGS);
    }
    if !snippet.content.is_empty() {
        add(matcher.partial_ratio(query, &snippet.content.to_lowercase()), WEIGHT_CONTENT);
    }

    if weights == 0.0 {
        return 0.0;
    }
    ((total / weights) * 100.0).round() / 100.0
}
