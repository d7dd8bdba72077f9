//! Input lines and match annotations.
//!
//! A [`Line`] is created once at ingestion and never mutated. A [`Match`] is
//! produced fresh by every filter pass; old matches are discarded, never
//! patched in place, so the render loop can hold a view while the filter loop
//! builds the next one.

use std::ops::Range;
use std::sync::Arc;

// ===== LineId =====

/// Stable ordinal of a line in input order.
///
/// Assigned sequentially from zero by the coordinator as lines are fed.
/// Eviction from a capped buffer never renumbers surviving lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u64);

impl LineId {
    /// Create an id from a raw ordinal.
    pub fn new(ordinal: u64) -> Self {
        Self(ordinal)
    }

    /// Raw ordinal value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Ordinal as an index into the original input sequence.
    ///
    /// Returns `None` if the ordinal does not fit in `usize`.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

// ===== Line =====

/// One immutable input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    id: LineId,
    display: String,
    output: Option<String>,
}

impl Line {
    /// Create a line whose output equals its display text.
    pub fn new(id: LineId, display: impl Into<String>) -> Self {
        Self {
            id,
            display: display.into(),
            output: None,
        }
    }

    /// Create a line with a separate output value.
    pub fn with_output(id: LineId, display: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id,
            display: display.into(),
            output: Some(output.into()),
        }
    }

    /// Parse a raw input record.
    ///
    /// With `null_separator` enabled, `display\0output` splits on the first NUL.
    /// Records without a NUL keep a single value for both roles.
    pub fn parse(id: LineId, raw: &str, null_separator: bool) -> Self {
        if null_separator {
            if let Some((display, output)) = raw.split_once('\0') {
                return Self::with_output(id, display, output);
            }
        }
        Self::new(id, raw)
    }

    /// Stable input ordinal.
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Text shown to the user and matched against the query.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Value handed back to the caller.
    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.display)
    }

    /// Whether the output differs from the display text.
    pub fn has_separate_output(&self) -> bool {
        self.output.is_some()
    }
}

// ===== Match =====

/// A line annotated by one filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    line: Arc<Line>,
    query: Arc<str>,
    ranges: Vec<Range<usize>>,
    selected: bool,
}

impl Match {
    /// Create a match with highlight ranges (byte offsets into the display text).
    pub fn new(line: Arc<Line>, query: Arc<str>, ranges: Vec<Range<usize>>) -> Self {
        Self {
            line,
            query,
            ranges,
            selected: false,
        }
    }

    /// Seed match for a line that has not been filtered by any query.
    pub fn unfiltered(line: Arc<Line>) -> Self {
        Self::new(line, Arc::from(""), Vec::new())
    }

    /// Copy of this match with the selected flag set.
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// The underlying input line.
    pub fn line(&self) -> &Arc<Line> {
        &self.line
    }

    /// Input ordinal of the underlying line.
    pub fn id(&self) -> LineId {
        self.line.id()
    }

    /// Display text of the underlying line.
    pub fn display(&self) -> &str {
        self.line.display()
    }

    /// Output value of the underlying line.
    pub fn output(&self) -> &str {
        self.line.output()
    }

    /// Query this match was produced for.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Matched byte ranges, sorted and non-overlapping.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Whether the line was chosen when this match was produced.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether this is a seed match (empty query, no ranges).
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_empty() && self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_without_null_separator_keeps_whole_record() {
        let line = Line::parse(LineId::new(0), "key\0value", false);
        assert_eq!(line.display(), "key\0value");
        assert_eq!(line.output(), "key\0value");
        assert!(!line.has_separate_output());
    }

    #[test]
    fn parse_with_null_separator_splits_on_first_nul() {
        let line = Line::parse(LineId::new(3), "shown\0returned\0tail", true);
        assert_eq!(line.display(), "shown");
        assert_eq!(line.output(), "returned\0tail");
        assert_eq!(line.id(), LineId::new(3));
    }

    #[test]
    fn parse_with_null_separator_and_no_nul_uses_display_as_output() {
        let line = Line::parse(LineId::new(1), "plain", true);
        assert_eq!(line.output(), "plain");
        assert!(!line.has_separate_output());
    }

    #[test]
    fn unfiltered_match_has_no_ranges() {
        let line = Arc::new(Line::new(LineId::new(0), "abc"));
        let m = Match::unfiltered(line);
        assert!(m.is_unfiltered());
        assert!(!m.is_selected());
        assert_eq!(m.output(), "abc");
    }

    #[test]
    fn with_selected_does_not_touch_line() {
        let line = Arc::new(Line::new(LineId::new(7), "abc"));
        let m = Match::new(Arc::clone(&line), Arc::from("b"), vec![1..2]).with_selected(true);
        assert!(m.is_selected());
        assert!(!m.is_unfiltered());
        assert!(Arc::ptr_eq(m.line(), &line), "match must share the buffer's line");
    }

    #[test]
    fn line_id_index_round_trips_small_values() {
        assert_eq!(LineId::new(42).index(), Some(42));
    }
}
