use super::fuzzy::Matcher;
use std::cmp::Ordering;

/// Minimum score for a tag suggestion; lower than the search threshold
/// because the input is usually a fragment of a word.
pub const SUGGESTION_CUTOFF: f64 = 40.0;

/// Suggests existing tags for partially typed `input`.
///
/// Tags starting with the input score 100; others are scored with
/// [`Matcher::partial_ratio`]. Suggestions below [`SUGGESTION_CUTOFF`] are dropped.
/// Results are ordered by descending score, then alphabetically, and capped
/// at `limit`. Empty input returns the first `limit` tags as given.
pub fn suggest_tags<'a>(input: &str, tags: &'a [String], limit: usize) -> Vec<&'a str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return tags.iter().take(limit).map(String::as_str).collect();
    }

    let mut matcher = Matcher::default();
    let mut scored: Vec<(&'a str, f64)> = tags
        .iter()
        .map(|tag| {
            let lower = tag.to_lowercase();
            let score = if lower.starts_with(&input) {
                100.0
            } else {
                matcher.partial_ratio(&input, &lower)
            };
            (tag.as_str(), score)
        })
        .filter(|(_, score)| *score >= SUGGESTION_CUTOFF)
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    scored.into_iter().take(limit).map(|(tag, _)| tag).collect()
}
