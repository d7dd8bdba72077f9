//! Substring matchers.
//!
//! The query is split on whitespace into terms. A line is accepted when every
//! term occurs in its display text; every occurrence of every term is
//! highlighted. Accepted lines keep buffer order.

use super::Matcher;
use crate::model::{Line, Match};
use rayon::prelude::*;
use std::ops::Range;
use std::sync::Arc;

/// Below this many lines per task rayon's splitting costs more than it saves.
const MIN_LINES_PER_TASK: usize = 1024;

/// Case-insensitive substring matching. The default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCase;

/// Case-sensitive substring matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseSensitive;

/// Case-sensitive only when the query contains an uppercase character.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartCase;

impl Matcher for IgnoreCase {
    fn name(&self) -> &'static str {
        "IgnoreCase"
    }

    fn filter(&self, query: &str, lines: &[Arc<Line>]) -> Vec<Match> {
        substring_pass(query, lines, false)
    }
}

impl Matcher for CaseSensitive {
    fn name(&self) -> &'static str {
        "CaseSensitive"
    }

    fn filter(&self, query: &str, lines: &[Arc<Line>]) -> Vec<Match> {
        substring_pass(query, lines, true)
    }
}

impl Matcher for SmartCase {
    fn name(&self) -> &'static str {
        "SmartCase"
    }

    fn filter(&self, query: &str, lines: &[Arc<Line>]) -> Vec<Match> {
        let case_sensitive = query.chars().any(char::is_uppercase);
        substring_pass(query, lines, case_sensitive)
    }
}

fn substring_pass(query: &str, lines: &[Arc<Line>], case_sensitive: bool) -> Vec<Match> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| {
            if case_sensitive {
                term.to_string()
            } else {
                fold_case(term)
            }
        })
        .collect();

    if terms.is_empty() {
        return lines
            .iter()
            .map(|line| Match::unfiltered(Arc::clone(line)))
            .collect();
    }

    let query: Arc<str> = Arc::from(query);
    lines
        .par_iter()
        .with_min_len(MIN_LINES_PER_TASK)
        .filter_map(|line| {
            let found = if case_sensitive {
                find_all(line.display(), &terms)
            } else {
                Folded::new(line.display()).find_all(&terms)
            };
            let ranges = found?;
            Some(Match::new(Arc::clone(line), Arc::clone(&query), ranges))
        })
        .collect()
}

/// Occurrences of every term, or `None` if any term is missing.
fn find_all(text: &str, terms: &[String]) -> Option<Vec<Range<usize>>> {
    let mut ranges = Vec::new();
    for term in terms {
        let before = ranges.len();
        ranges.extend(
            text.match_indices(term.as_str())
                .map(|(start, found)| start..start + found.len()),
        );
        if ranges.len() == before {
            return None;
        }
    }
    Some(merge(ranges))
}

/// Sort ranges and coalesce overlapping or touching ones.
fn merge(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

// ===== Folded =====

/// Lowercased copy of a text with a map back to original byte offsets.
///
/// Lowercasing can change a character's UTF-8 length, so ranges found in the
/// folded text are translated through per-byte origin tables. ASCII text folds
/// byte-for-byte and skips the tables.
struct Folded<'a> {
    original: &'a str,
    text: String,
    origins: Option<Vec<Range<usize>>>,
}

impl<'a> Folded<'a> {
    fn new(original: &'a str) -> Self {
        if original.is_ascii() {
            return Self {
                original,
                text: original.to_ascii_lowercase(),
                origins: None,
            };
        }

        let mut text = String::with_capacity(original.len());
        let mut origins = Vec::with_capacity(original.len());
        for (start, ch) in original.char_indices() {
            let source = start..start + ch.len_utf8();
            for lower in ch.to_lowercase() {
                text.push(lower);
                origins.extend(std::iter::repeat_n(source.clone(), lower.len_utf8()));
            }
        }
        Self {
            original,
            text,
            origins: Some(origins),
        }
    }

    fn find_all(&self, terms: &[String]) -> Option<Vec<Range<usize>>> {
        let ranges = find_all(&self.text, terms)?;
        Some(merge(
            ranges.into_iter().map(|r| self.to_original(r)).collect(),
        ))
    }

    fn to_original(&self, range: Range<usize>) -> Range<usize> {
        match &self.origins {
            None => range,
            Some(origins) => {
                let start = origins[range.start].start;
                let end = origins[range.end - 1].end;
                start..end.min(self.original.len())
            }
        }
    }
}
