//! Filter loop: re-runs the matcher and publishes views.

use super::FilterRequest;
use crate::coordinator::Coordinator;
use std::io;
use std::sync::mpsc::Receiver;
use tracing::trace;

/// Drain every queued request into one decision.
///
/// Returns `None` when the loop should stop, `Some(count)` with the number of
/// coalesced run requests otherwise.
pub fn coalesce(first: FilterRequest, rest: impl Iterator<Item = FilterRequest>) -> Option<usize> {
    let mut runs = 0;
    for request in std::iter::once(first).chain(rest) {
        match request {
            FilterRequest::Run => runs += 1,
            FilterRequest::Stop => return None,
        }
    }
    Some(runs)
}

pub(crate) fn run(coordinator: &Coordinator, requests: &Receiver<FilterRequest>) -> io::Result<()> {
    while let Ok(first) = requests.recv() {
        let Some(runs) = coalesce(first, requests.try_iter()) else {
            break;
        };
        if coordinator.is_exiting() {
            break;
        }
        trace!(runs, "Filter pass requested");
        coordinator.filter_pass();
        coordinator.schedule_redraw();
    }
    Ok(())
}
