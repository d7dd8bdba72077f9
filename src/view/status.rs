//! Status line: matcher, counts, page.

use super::{match_list::page_start, RenderSnapshot, Styles};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub(super) fn render(
    frame: &mut Frame,
    area: Rect,
    snapshot: &RenderSnapshot,
    styles: &Styles,
    rows: usize,
) {
    let line = Line::styled(status_text(snapshot, rows), styles.status);
    frame.render_widget(Paragraph::new(line), area);
}

fn status_text(snapshot: &RenderSnapshot, rows: usize) -> String {
    let view = &snapshot.view;
    let pages = if rows == 0 { 1 } else { view.len().div_ceil(rows).max(1) };
    let page = if rows == 0 || view.is_empty() {
        1
    } else {
        page_start(snapshot.cursor.min(view.len() - 1), rows) / rows + 1
    };

    let mut text = format!(
        "{} [{}/{}] page {}/{}",
        view.matcher(),
        view.len(),
        snapshot.total,
        page,
        pages
    );
    if !snapshot.chosen.is_empty() {
        text.push_str(&format!(" ({} chosen)", snapshot.chosen.len()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FilteredView, Layout, Line as InputLine, LineId, Match};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn snapshot(count: usize, cursor: usize) -> RenderSnapshot {
        let matches = (0..count)
            .map(|i| {
                Match::unfiltered(Arc::new(InputLine::new(LineId::new(i as u64), format!("l{i}"))))
            })
            .collect();
        RenderSnapshot {
            prompt: ">".to_string(),
            query: String::new(),
            caret: 0,
            view: Arc::new(FilteredView::new(matches, "", "SmartCase", 1, 50)),
            cursor,
            chosen: BTreeSet::new(),
            total: 50,
            layout: Layout::TopDown,
        }
    }

    #[test]
    fn reports_page_of_cursor() {
        assert_eq!(status_text(&snapshot(25, 12), 10), "SmartCase [25/50] page 2/3");
    }

    #[test]
    fn empty_view_is_page_one_of_one() {
        assert_eq!(status_text(&snapshot(0, 3), 10), "SmartCase [0/50] page 1/1");
    }

    #[test]
    fn mentions_chosen_count() {
        let mut snap = snapshot(3, 0);
        snap.chosen.insert(LineId::new(1));
        assert!(status_text(&snap, 10).ends_with("(1 chosen)"));
    }
}
