//! Prompt and query line.

use super::{RenderSnapshot, Styles};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Draw `PROMPT query` with the caret shown as a reversed cell.
pub(super) fn render(frame: &mut Frame, area: Rect, snapshot: &RenderSnapshot, styles: &Styles) {
    frame.render_widget(Paragraph::new(prompt_line(snapshot, styles)), area);
}

fn prompt_line(snapshot: &RenderSnapshot, styles: &Styles) -> Line<'static> {
    // Split query into before/after caret
    let before: String = snapshot.query.chars().take(snapshot.caret).collect();
    let mut rest = snapshot.query.chars().skip(snapshot.caret);
    let under_caret = rest.next().map_or_else(|| " ".to_string(), String::from);
    let after: String = rest.collect();

    Line::from(vec![
        Span::styled(snapshot.prompt.clone(), styles.prompt),
        Span::raw(" "),
        Span::raw(before),
        Span::styled(under_caret, styles.caret),
        Span::raw(after),
    ])
}
