//! Fuzzy search over registry catalogs.
//!
//! Private registries only offer a flat `_catalog`, so image search there
//! ranks catalog entries with nucleo-matcher (the fzf algorithm).

use nucleo_matcher::{Config, Matcher, pattern::Normalization, pattern::Pattern};

pub use nucleo_matcher::pattern::CaseMatching;


/// A search result with relevance score.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchResult {
    /// The matched string.
    pub value: String,
    /// Relevance score (higher is better).
    pub score: u32,
}

impl SearchResult {
    pub fn new(value: String, score: u32) -> Self {
        Self { value, score }
    }
}

/// Ranks `targets` against `query`.
///
/// An empty query keeps the catalog order, truncated to `limit`, which is
/// the default set offered before the user types anything. Otherwise query
/// characters must appear in order but need not be contiguous; results are
/// sorted by score, then alphabetically.
///
/// # Examples
///
/// ```
/// use libberth::search::rank;
///
/// let repos = vec!["alpine".to_string(), "ubuntu".to_string(), "team/api".to_string()];
/// let results = rank("alp", &repos, 10);
/// assert_eq!(results[0].value, "alpine");
/// ```
pub fn rank(query: &str, targets: &[String], limit: usize) -> Vec<SearchResult> {
    let query = query.trim();
    if query.is_empty() {
        return targets
            .iter()
            .take(limit)
            .map(|t| SearchResult::new(t.clone(), 0))
            .collect();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);

    let mut results: Vec<SearchResult> = pattern
        .match_list(targets.iter().map(|s| s.as_str()), &mut matcher)
        .into_iter()
        .map(|(value, score)| SearchResult::new(value.to_string(), score))
        .collect();

    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.value.cmp(&b.value)));
    results.truncate(limit);
    results
}
