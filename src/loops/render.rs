//! Render loop: the only writer to the terminal.

use super::RenderRequest;
use crate::coordinator::Coordinator;
use crate::terminal::Screen;
use std::io;
use std::sync::mpsc::Receiver;
use tracing::trace;

/// Render loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Waiting for a request.
    Idle,
    /// Drawing a frame; `refresh` clears the screen first.
    Rendering {
        /// Repaint every cell.
        refresh: bool,
    },
    /// Loop finished.
    Stopped,
}

/// Fold a batch of queued requests into the next state.
///
/// Any `Stop` wins; otherwise one frame is drawn, with a clear if any
/// request asked for one.
pub fn transition(requests: impl IntoIterator<Item = RenderRequest>) -> RenderState {
    let mut next = RenderState::Idle;
    for request in requests {
        next = match (request, next) {
            (RenderRequest::Stop, _) => return RenderState::Stopped,
            (RenderRequest::Refresh, _) => RenderState::Rendering { refresh: true },
            (RenderRequest::Redraw, RenderState::Rendering { refresh }) => {
                RenderState::Rendering { refresh }
            }
            (RenderRequest::Redraw, _) => RenderState::Rendering { refresh: false },
        };
    }
    next
}

pub(crate) fn run(
    coordinator: &Coordinator,
    requests: &Receiver<RenderRequest>,
    mut screen: Box<dyn Screen>,
) -> io::Result<()> {
    let mut state = RenderState::Idle;
    loop {
        state = match state {
            RenderState::Idle => match requests.recv() {
                Ok(first) => transition(std::iter::once(first).chain(requests.try_iter())),
                Err(_) => RenderState::Stopped,
            },
            RenderState::Rendering { .. } if coordinator.is_exiting() => RenderState::Stopped,
            RenderState::Rendering { refresh } => {
                if refresh {
                    screen.clear()?;
                }
                let snapshot = coordinator.render_snapshot();
                let rows = screen.draw(&snapshot)?;
                coordinator.set_page_rows(rows);
                trace!(rows, matched = snapshot.view.len(), "Frame drawn");
                RenderState::Idle
            }
            RenderState::Stopped => break,
        };
    }
    Ok(())
}
