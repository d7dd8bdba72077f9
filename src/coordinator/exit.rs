//! One-shot exit signalling.
//!
//! The first requested status wins. Winning runs every registered closer,
//! which is how blocked loops (channel receivers, the signal iterator) are
//! woken up to observe the exit.

use crate::model::ExitStatus;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::debug;

type Closer = Box<dyn Fn() + Send + Sync>;

/// Exit status slot plus the hooks that stop the loops.
#[derive(Default)]
pub struct ExitSignal {
    status: OnceLock<ExitStatus>,
    closers: Mutex<Vec<Closer>>,
}

impl std::fmt::Debug for ExitSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExitSignal")
            .field("status", &self.status.get())
            .finish_non_exhaustive()
    }
}

impl ExitSignal {
    /// No exit requested yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request exit with `status`.
    ///
    /// Returns `true` if this call set the status; later calls are no-ops.
    pub fn request(&self, status: ExitStatus) -> bool {
        if self.status.set(status).is_err() {
            return false;
        }
        debug!(%status, "Exit requested");
        let closers = std::mem::take(&mut *self.lock_closers());
        for closer in closers {
            closer();
        }
        true
    }

    /// The winning status, once set.
    pub fn status(&self) -> Option<ExitStatus> {
        self.status.get().copied()
    }

    /// Whether exit has been requested.
    pub fn is_requested(&self) -> bool {
        self.status.get().is_some()
    }

    /// Run `closer` when exit is requested, or now if it already was.
    pub fn on_exit(&self, closer: impl Fn() + Send + Sync + 'static) {
        let mut closers = self.lock_closers();
        if self.is_requested() {
            drop(closers);
            closer();
        } else {
            closers.push(Box::new(closer));
        }
    }

    fn lock_closers(&self) -> std::sync::MutexGuard<'_, Vec<Closer>> {
        self.closers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn first_status_wins() {
        let signal = ExitSignal::new();
        assert!(signal.request(ExitStatus::CANCELED));
        assert!(!signal.request(ExitStatus::SUCCESS));
        assert_eq!(signal.status(), Some(ExitStatus::CANCELED));
    }

    #[test]
    fn closers_run_once_on_first_request() {
        let signal = ExitSignal::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        signal.on_exit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        signal.request(ExitStatus::SUCCESS);
        signal.request(ExitStatus::FAULT);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closer_registered_after_exit_runs_immediately() {
        let signal = ExitSignal::new();
        signal.request(ExitStatus::INTERRUPTED);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        signal.on_exit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_requests_set_exactly_one_status() {
        let signal = Arc::new(ExitSignal::new());
        let winners: usize = (0..8)
            .map(|i| {
                let signal = Arc::clone(&signal);
                std::thread::spawn(move || signal.request(ExitStatus::new(i)))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| usize::from(handle.join().unwrap()))
            .sum();
        assert_eq!(winners, 1);
        assert!(signal.is_requested());
    }
}
