//! Signal loop: host notifications.

use crate::coordinator::Coordinator;
use crate::model::ExitStatus;
use crate::terminal::{Notification, SignalSource};
use std::io;
use tracing::debug;

/// Exit status a notification forces, if any.
pub fn exit_status_for(notification: Notification) -> Option<ExitStatus> {
    match notification {
        Notification::Resize => None,
        Notification::Interrupt => Some(ExitStatus::INTERRUPTED),
        Notification::Terminate => Some(ExitStatus::TERMINATED),
    }
}

pub(crate) fn run(coordinator: &Coordinator, mut signals: Box<dyn SignalSource>) -> io::Result<()> {
    while let Some(notification) = signals.wait() {
        debug!(?notification, "Host notification");
        match exit_status_for(notification) {
            Some(status) => {
                coordinator.request_exit(status);
            }
            None => coordinator.request_redraw(),
        }
        if coordinator.is_exiting() {
            break;
        }
    }
    Ok(())
}
