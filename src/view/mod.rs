//! Screen rendering.
//!
//! Rendering is a pure function of a [`RenderSnapshot`]: the render loop
//! captures one from the coordinator, then draws it without holding any lock.

mod match_list;
mod prompt;
mod status;
pub mod styles;

pub use match_list::{line_spans, page_start};
pub use styles::{ColorConfig, Styles};

use crate::model::{FilteredView, Layout, LineId};
use ratatui::layout::{Constraint, Layout as Split, Rect};
use ratatui::Frame;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    /// Prompt shown before the query.
    pub prompt: String,
    /// Current query text.
    pub query: String,
    /// Caret position in characters.
    pub caret: usize,
    /// Latest published view.
    pub view: Arc<FilteredView>,
    /// Cursor index into the view.
    pub cursor: usize,
    /// Lines chosen for multi-selection.
    pub chosen: BTreeSet<LineId>,
    /// Current buffer length.
    pub total: usize,
    /// Screen orientation.
    pub layout: Layout,
}

/// Split the frame into prompt, list and status areas.
fn areas(area: Rect, layout: Layout) -> (Rect, Rect, Rect) {
    match layout {
        Layout::TopDown => {
            let [prompt, list, status] = Split::vertical([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .areas(area);
            (prompt, list, status)
        }
        Layout::BottomUp => {
            let [list, status, prompt] = Split::vertical([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);
            (prompt, list, status)
        }
    }
}

/// Draw a full frame. Returns the number of list rows available.
pub fn render(frame: &mut Frame, snapshot: &RenderSnapshot, styles: &Styles) -> usize {
    let (prompt_area, list_area, status_area) = areas(frame.area(), snapshot.layout);
    let rows = usize::from(list_area.height);

    prompt::render(frame, prompt_area, snapshot, styles);
    match_list::render(frame, list_area, snapshot, styles);
    status::render(frame, status_area, snapshot, styles, rows);

    rows
}
