//! The published result of one filter pass.

use super::Match;
use std::sync::Arc;

/// Matches produced by one filter pass, plus what they were produced from.
///
/// Published by the filter loop as a whole (`Arc` swap); readers never see a
/// half-built view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    matches: Vec<Match>,
    query: Arc<str>,
    matcher: &'static str,
    generation: u64,
    total: usize,
}

impl FilteredView {
    /// A view of `matches` produced from the session state at `generation`.
    pub fn new(
        matches: Vec<Match>,
        query: impl Into<Arc<str>>,
        matcher: &'static str,
        generation: u64,
        total: usize,
    ) -> Self {
        Self {
            matches,
            query: query.into(),
            matcher,
            generation,
            total,
        }
    }

    /// Matches in display order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Match at `index`.
    pub fn get(&self, index: usize) -> Option<&Match> {
        self.matches.get(index)
    }

    /// Query the pass ran with.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Name of the matcher the pass ran with.
    pub fn matcher(&self) -> &'static str {
        self.matcher
    }

    /// Session state generation the pass snapshotted.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Buffer length at snapshot time.
    pub fn total(&self) -> usize {
        self.total
    }
}
