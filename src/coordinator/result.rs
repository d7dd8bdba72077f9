//! Result delivery.
//!
//! The final selection is pushed through a channel once every loop has
//! stopped, then the sending side is closed. Readers drain it on first access
//! and keep the drained list, so `result()` is repeatable.

use crate::model::Match;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Write-once channel carrying the selected matches.
#[derive(Debug)]
pub struct ResultSlot {
    sender: Mutex<Option<Sender<Match>>>,
    receiver: Mutex<Receiver<Match>>,
    closed: AtomicBool,
    drained: Mutex<Option<Vec<Match>>>,
}

impl Default for ResultSlot {
    fn default() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(receiver),
            closed: AtomicBool::new(false),
            drained: Mutex::new(None),
        }
    }
}

impl ResultSlot {
    /// An open, empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `matches` and close the channel.
    ///
    /// Only the first delivery is accepted.
    pub fn deliver(&self, matches: Vec<Match>) -> bool {
        let Some(sender) = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            warn!("Result already delivered, ignoring second delivery");
            return false;
        };
        let count = matches.len();
        for m in matches {
            // The receiver lives as long as self.
            let _ = sender.send(m);
        }
        drop(sender);
        self.closed.store(true, Ordering::Release);
        debug!(count, "Result channel closed");
        true
    }

    /// Whether the result has been delivered.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The delivered matches, or empty before delivery.
    pub fn collect(&self) -> Vec<Match> {
        let mut drained = self.drained.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(matches) = drained.as_ref() {
            return matches.clone();
        }
        if !self.is_closed() {
            return Vec::new();
        }
        let matches: Vec<Match> = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_iter()
            .collect();
        *drained = Some(matches.clone());
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Line, LineId};
    use std::sync::Arc;

    fn matches(texts: &[&str]) -> Vec<Match> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Match::unfiltered(Arc::new(Line::new(LineId::new(i as u64), *t))))
            .collect()
    }

    #[test]
    fn collect_before_delivery_is_empty() {
        let slot = ResultSlot::new();
        assert!(slot.collect().is_empty());
        assert!(!slot.is_closed());
    }

    #[test]
    fn collect_is_repeatable_and_ordered() {
        let slot = ResultSlot::new();
        assert!(slot.deliver(matches(&["b", "a"])));
        let first: Vec<String> = slot.collect().iter().map(|m| m.display().to_string()).collect();
        let second: Vec<String> = slot.collect().iter().map(|m| m.display().to_string()).collect();
        assert_eq!(first, vec!["b", "a"]);
        assert_eq!(first, second, "result must be stable across calls");
    }

    #[test]
    fn second_delivery_is_rejected() {
        let slot = ResultSlot::new();
        slot.deliver(matches(&["x"]));
        assert!(!slot.deliver(matches(&["y", "z"])));
        assert_eq!(slot.collect().len(), 1);
    }
}
