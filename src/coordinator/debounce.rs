//! Single-shot debounce timer.
//!
//! The first trigger in a quiet period arms the timer; later triggers are
//! dropped until it fires. The armed flag is cleared before the action runs,
//! so a trigger that lands while the action is running arms a fresh timer and
//! the last trigger of any burst is always followed by a fire.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{trace, warn};

/// Quiet interval used by the coordinator.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

type Action = Box<dyn FnOnce() + Send + 'static>;

/// Coalesces bursts of triggers into one delayed action.
#[derive(Debug)]
pub struct Debouncer {
    name: &'static str,
    delay: Duration,
    armed: Arc<AtomicBool>,
}

impl Debouncer {
    /// Create an idle debouncer.
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Arm the timer to run `action` once after the quiet interval.
    ///
    /// Returns `false` without scheduling anything if a timer is already
    /// armed; the pending fire is not postponed.
    pub fn schedule<F>(&self, action: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self
            .armed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!(debouncer = self.name, "Trigger coalesced into pending fire");
            return false;
        }

        let slot: Arc<Mutex<Option<Action>>> = Arc::new(Mutex::new(Some(Box::new(action))));
        let timer_slot = Arc::clone(&slot);
        let armed = Arc::clone(&self.armed);
        let delay = self.delay;

        let spawned = thread::Builder::new()
            .name(format!("cull-debounce-{}", self.name))
            .spawn(move || {
                thread::sleep(delay);
                armed.store(false, Ordering::Release);
                if let Some(action) = take(&timer_slot) {
                    action();
                }
            });

        if let Err(err) = spawned {
            warn!(debouncer = self.name, %err, "Timer thread unavailable, firing inline");
            self.armed.store(false, Ordering::Release);
            if let Some(action) = take(&slot) {
                action();
            }
        }
        true
    }
}

fn take(slot: &Mutex<Option<Action>>) -> Option<Action> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Instant;

    #[test]
    fn burst_of_triggers_fires_once() {
        let debouncer = Debouncer::new("test", Duration::from_millis(50));
        let fired = Arc::new(AtomicUsize::new(0));

        let mut accepted = 0;
        for _ in 0..20 {
            let fired = Arc::clone(&fired);
            if debouncer.schedule(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1, "only the first trigger arms the timer");

        thread::sleep(Duration::from_millis(200));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn fire_is_not_postponed_by_later_triggers() {
        let debouncer = Debouncer::new("test", Duration::from_millis(80));
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();

        debouncer.schedule(move || tx.send(Instant::now()).unwrap_or(()));
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(10));
            debouncer.schedule(|| {});
        }

        let fired_at = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(
            fired_at.duration_since(started) < Duration::from_millis(500),
            "timer must fire roughly one interval after the first trigger"
        );
    }

    #[test]
    fn trigger_during_action_rearms() {
        let debouncer = Arc::new(Debouncer::new("test", Duration::from_millis(20)));
        let (tx, rx) = mpsc::channel();

        let inner = Arc::clone(&debouncer);
        let first_tx = tx.clone();
        debouncer.schedule(move || {
            let rearmed = inner.schedule(move || tx.send("second").unwrap_or(()));
            first_tx.send(if rearmed { "rearmed" } else { "dropped" }).unwrap_or(());
        });

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "rearmed");
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "second");
    }

    #[test]
    fn concurrent_triggers_arm_exactly_once() {
        let debouncer = Arc::new(Debouncer::new("test", Duration::from_millis(100)));
        let accepted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let debouncer = Arc::clone(&debouncer);
                let accepted = Arc::clone(&accepted);
                thread::spawn(move || {
                    if debouncer.schedule(|| {}) {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }
}
