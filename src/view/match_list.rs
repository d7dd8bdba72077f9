//! The page of matches around the cursor.

use super::{RenderSnapshot, Styles};
use crate::model::Layout;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

/// First view index of the page containing `cursor`.
pub fn page_start(cursor: usize, rows: usize) -> usize {
    if rows == 0 {
        return 0;
    }
    (cursor / rows) * rows
}

/// Styled spans for one row, cut to `width` terminal cells.
///
/// `ranges` are byte ranges into `text`; characters inside them get
/// `highlight` patched over `base`. Control characters render as spaces.
pub fn line_spans(
    text: &str,
    ranges: &[Range<usize>],
    base: Style,
    highlight: Style,
    width: usize,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut used = 0;
    let mut current = String::new();
    let mut current_style = base;
    let mut ranges = ranges.iter().peekable();

    for (offset, ch) in text.char_indices() {
        while ranges.peek().is_some_and(|r| r.end <= offset) {
            ranges.next();
        }
        let style = if ranges.peek().is_some_and(|r| r.start <= offset) {
            base.patch(highlight)
        } else {
            base
        };
        let ch = if ch.is_control() { ' ' } else { ch };
        let cells = ch.width().unwrap_or(0);
        if used + cells > width {
            break;
        }
        used += cells;

        if style != current_style && !current.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current), current_style));
        }
        current_style = style;
        current.push(ch);
    }
    if !current.is_empty() {
        spans.push(Span::styled(current, current_style));
    }
    spans
}

pub(super) fn render(frame: &mut Frame, area: Rect, snapshot: &RenderSnapshot, styles: &Styles) {
    let rows = usize::from(area.height);
    let width = usize::from(area.width);
    let view = &snapshot.view;
    let start = page_start(snapshot.cursor.min(view.len().saturating_sub(1)), rows);

    let mut lines: Vec<Line<'static>> = view
        .matches()
        .iter()
        .enumerate()
        .skip(start)
        .take(rows)
        .map(|(index, m)| {
            let mut base = Style::default();
            if snapshot.chosen.contains(&m.id()) {
                base = base.patch(styles.chosen);
            }
            if index == snapshot.cursor {
                base = base.patch(styles.cursor_line);
            }
            Line::from(line_spans(m.display(), m.ranges(), base, styles.highlight, width)).style(base)
        })
        .collect();

    if snapshot.layout == Layout::BottomUp {
        lines.reverse();
        let padding = rows.saturating_sub(lines.len());
        lines.splice(0..0, std::iter::repeat_n(Line::default(), padding));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn texts(spans: &[Span<'_>]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn page_start_snaps_to_page_boundary() {
        assert_eq!(page_start(0, 10), 0);
        assert_eq!(page_start(9, 10), 0);
        assert_eq!(page_start(10, 10), 10);
        assert_eq!(page_start(25, 10), 20);
        assert_eq!(page_start(5, 0), 0);
    }

    #[test]
    fn line_spans_split_on_highlight_boundaries() {
        let hl = Style::default().add_modifier(Modifier::BOLD);
        let spans = line_spans("Banana", &[1..3], Style::default(), hl, 80);
        assert_eq!(texts(&spans), vec!["B", "an", "ana"]);
        assert_eq!(spans[1].style, hl);
    }

    #[test]
    fn line_spans_truncate_to_width() {
        let spans = line_spans("abcdef", &[], Style::default(), Style::default(), 4);
        assert_eq!(texts(&spans), vec!["abcd"]);
    }

    #[test]
    fn line_spans_count_wide_characters_as_two_cells() {
        let spans = line_spans("日本語", &[], Style::default(), Style::default(), 5);
        assert_eq!(texts(&spans), vec!["日本"]);
    }

    #[test]
    fn line_spans_replace_control_characters() {
        let spans = line_spans("a\tb", &[], Style::default(), Style::default(), 10);
        assert_eq!(texts(&spans), vec!["a b"]);
    }
}
