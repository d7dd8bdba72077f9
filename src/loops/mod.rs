//! The four session loops.
//!
//! Each loop runs on its own named thread behind [`run_guarded`], which turns
//! an error or panic into a recorded [`LoopFault`] plus a FAULT exit so the
//! other loops wind down and the terminal is restored.

pub mod filter;
pub mod input;
pub mod render;
pub mod signal;

use crate::coordinator::Coordinator;
use crate::model::{ExitStatus, LoopFault, LoopKind};
use crate::terminal::TerminalParts;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Message to the filter loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRequest {
    /// Run one pass on the current state.
    Run,
    /// Leave the loop.
    Stop,
}

/// Message to the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    /// Draw a frame.
    Redraw,
    /// Clear the screen, then draw a frame.
    Refresh,
    /// Leave the loop.
    Stop,
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Run one loop body, containing any failure.
pub fn run_guarded<F>(coordinator: &Coordinator, kind: LoopKind, body: F)
where
    F: FnOnce(&Coordinator) -> io::Result<()>,
{
    debug!(loop_kind = %kind, "Loop started");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(coordinator)));
    let failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(payload) => Some(panic_message(payload.as_ref())),
    };
    if let Some(message) = failure {
        coordinator.record_fault(LoopFault { kind, message });
        coordinator.request_exit(ExitStatus::FAULT);
    }
    coordinator.loop_finished();
    debug!(loop_kind = %kind, "Loop stopped");
}

fn spawn<F>(coordinator: &Coordinator, kind: LoopKind, body: F) -> Option<(LoopKind, JoinHandle<()>)>
where
    F: FnOnce(&Coordinator) -> io::Result<()> + Send + 'static,
{
    let handle = coordinator.clone();
    handle.loop_started();
    let spawned = thread::Builder::new()
        .name(format!("cull-{}", kind.name()))
        .spawn({
            let handle = handle.clone();
            move || run_guarded(&handle, kind, body)
        });
    match spawned {
        Ok(join) => Some((kind, join)),
        Err(err) => {
            handle.loop_finished();
            handle.record_fault(LoopFault {
                kind,
                message: format!("thread spawn failed: {err}"),
            });
            handle.request_exit(ExitStatus::FAULT);
            None
        }
    }
}

/// Start every loop. Returns the handles that were spawned, in launch order.
pub(crate) fn spawn_all(
    coordinator: &Coordinator,
    filter_requests: Receiver<FilterRequest>,
    render_requests: Receiver<RenderRequest>,
    parts: TerminalParts,
) -> Vec<(LoopKind, JoinHandle<()>)> {
    let TerminalParts {
        screen,
        events,
        signals,
    } = parts;

    [
        spawn(coordinator, LoopKind::Render, move |c| {
            render::run(c, &render_requests, screen)
        }),
        spawn(coordinator, LoopKind::Filter, move |c| {
            filter::run(c, &filter_requests)
        }),
        spawn(coordinator, LoopKind::Input, move |c| input::run(c, events)),
        spawn(coordinator, LoopKind::Signal, move |c| signal::run(c, signals)),
    ]
    .into_iter()
    .flatten()
    .collect()
}
