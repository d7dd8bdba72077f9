//! Deterministic terminal for tests and demos.
//!
//! A [`ScriptedTerminal`] replays a fixed list of input events (with pauses)
//! and host notifications (at fixed offsets from acquisition), and draws into
//! ratatui's `TestBackend`. A [`ScriptedTerminalProbe`] observes it from the
//! outside after the backend has been lent to a session.

use super::{
    Backend, EventSource, Notification, RatatuiScreen, Screen, SignalSource, TerminalParts,
};
use crate::view::{RenderSnapshot, Styles};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Step {
    Event(Event),
    Pause(Duration),
}

#[derive(Debug, Default)]
struct ProbeState {
    acquired: AtomicUsize,
    released: AtomicUsize,
    frames: AtomicUsize,
    screen: Mutex<Vec<String>>,
}

/// Read-only view of a [`ScriptedTerminal`]'s activity.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTerminalProbe {
    state: Arc<ProbeState>,
}

impl ScriptedTerminalProbe {
    /// Successful acquisitions so far.
    pub fn acquire_count(&self) -> usize {
        self.state.acquired.load(Ordering::Acquire)
    }

    /// Releases so far.
    pub fn release_count(&self) -> usize {
        self.state.released.load(Ordering::Acquire)
    }

    /// Frames drawn so far.
    pub fn frame_count(&self) -> usize {
        self.state.frames.load(Ordering::Acquire)
    }

    /// Text of the last drawn frame, one entry per row, trailing spaces removed.
    pub fn screen_lines(&self) -> Vec<String> {
        self.state
            .screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A [`Backend`] that plays back a script.
///
/// When the event script runs out the input loop sees an
/// `UnexpectedEof` error, which ends the session with a fault, unless
/// [`ScriptedTerminal::idle_when_done`] was set.
#[derive(Debug)]
pub struct ScriptedTerminal {
    steps: Vec<Step>,
    notifications: Vec<(Duration, Notification)>,
    width: u16,
    height: u16,
    fail_on_acquire: bool,
    idle_when_done: bool,
    probe: ScriptedTerminalProbe,
}

impl Default for ScriptedTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTerminal {
    /// An empty script on a 40x10 screen.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            notifications: Vec::new(),
            width: 40,
            height: 10,
            fail_on_acquire: false,
            idle_when_done: false,
            probe: ScriptedTerminalProbe::default(),
        }
    }

    /// Screen size in cells.
    #[must_use]
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Append a raw event.
    #[must_use]
    pub fn event(mut self, event: Event) -> Self {
        self.steps.push(Step::Event(event));
        self
    }

    /// Append an unmodified key press.
    #[must_use]
    pub fn key(self, code: KeyCode) -> Self {
        self.key_with(code, KeyModifiers::NONE)
    }

    /// Append a key press with modifiers.
    #[must_use]
    pub fn key_with(self, code: KeyCode, modifiers: KeyModifiers) -> Self {
        self.event(Event::Key(KeyEvent::new(code, modifiers)))
    }

    /// Append a Ctrl chord.
    #[must_use]
    pub fn ctrl(self, ch: char) -> Self {
        self.key_with(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    /// Append one key press per character.
    #[must_use]
    pub fn type_str(self, text: &str) -> Self {
        text.chars()
            .fold(self, |script, ch| script.key(KeyCode::Char(ch)))
    }

    /// Append a bracketed paste.
    #[must_use]
    pub fn paste(self, text: &str) -> Self {
        self.event(Event::Paste(text.to_string()))
    }

    /// Append a pause during which no event arrives.
    #[must_use]
    pub fn pause(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Pause(duration));
        self
    }

    /// Deliver `notification` this long after acquisition.
    #[must_use]
    pub fn notify_after(mut self, delay: Duration, notification: Notification) -> Self {
        self.notifications.push((delay, notification));
        self
    }

    /// Make [`Backend::acquire`] fail.
    #[must_use]
    pub fn fail_on_acquire(mut self) -> Self {
        self.fail_on_acquire = true;
        self
    }

    /// Keep reporting "no event" after the script is exhausted.
    #[must_use]
    pub fn idle_when_done(mut self) -> Self {
        self.idle_when_done = true;
        self
    }

    /// Observer that stays valid while the terminal is lent out.
    pub fn probe(&self) -> ScriptedTerminalProbe {
        self.probe.clone()
    }
}

impl Backend for ScriptedTerminal {
    fn acquire(&mut self) -> io::Result<TerminalParts> {
        if self.fail_on_acquire {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "scripted terminal refused acquisition",
            ));
        }
        let backend = TestBackend::new(self.width, self.height);
        let screen = RecordingScreen {
            inner: RatatuiScreen::new(backend, Styles::default())?,
            probe: Arc::clone(&self.probe.state),
        };
        let events = ScriptedEvents {
            steps: std::mem::take(&mut self.steps).into(),
            idle_when_done: self.idle_when_done,
        };
        let mut notifications = std::mem::take(&mut self.notifications);
        notifications.sort_by_key(|(delay, _)| *delay);
        let (close_tx, close_rx) = mpsc::channel();
        let signals = ScriptedSignals {
            started: Instant::now(),
            pending: notifications.into(),
            close_tx,
            close_rx,
        };
        self.probe.state.acquired.fetch_add(1, Ordering::AcqRel);
        Ok(TerminalParts {
            screen: Box::new(screen),
            events: Box::new(events),
            signals: Box::new(signals),
        })
    }

    fn release(&mut self) -> io::Result<()> {
        self.probe.state.released.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

// ===== Parts =====

struct RecordingScreen {
    inner: RatatuiScreen<TestBackend>,
    probe: Arc<ProbeState>,
}

impl RecordingScreen {
    fn capture(&self) -> Vec<String> {
        let buffer = self.inner.terminal().backend().buffer();
        let width = usize::from(buffer.area.width).max(1);
        buffer
            .content()
            .chunks(width)
            .map(|row| {
                let text: String = row.iter().map(|cell| cell.symbol()).collect();
                text.trim_end().to_string()
            })
            .collect()
    }
}

impl Screen for RecordingScreen {
    fn draw(&mut self, snapshot: &RenderSnapshot) -> io::Result<usize> {
        let rows = self.inner.draw(snapshot)?;
        let lines = self.capture();
        *self
            .probe
            .screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = lines;
        self.probe.frames.fetch_add(1, Ordering::AcqRel);
        Ok(rows)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.inner.clear()
    }
}

#[derive(Debug)]
struct ScriptedEvents {
    steps: VecDeque<Step>,
    idle_when_done: bool,
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        match self.steps.pop_front() {
            Some(Step::Event(event)) => Ok(Some(event)),
            Some(Step::Pause(remaining)) => {
                let slice = remaining.min(timeout);
                std::thread::sleep(slice);
                let left = remaining.saturating_sub(slice);
                if !left.is_zero() {
                    self.steps.push_front(Step::Pause(left));
                }
                Ok(None)
            }
            None if self.idle_when_done => {
                std::thread::sleep(timeout);
                Ok(None)
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "event script exhausted",
            )),
        }
    }
}

#[derive(Debug)]
struct ScriptedSignals {
    started: Instant,
    pending: VecDeque<(Duration, Notification)>,
    close_tx: Sender<()>,
    close_rx: Receiver<()>,
}

impl SignalSource for ScriptedSignals {
    fn wait(&mut self) -> Option<Notification> {
        let Some((at, notification)) = self.pending.pop_front() else {
            let _ = self.close_rx.recv();
            return None;
        };
        let due = (self.started + at).saturating_duration_since(Instant::now());
        match self.close_rx.recv_timeout(due) {
            Err(RecvTimeoutError::Timeout) => Some(notification),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn closer(&self) -> Box<dyn Fn() + Send + Sync> {
        let tx = self.close_tx.clone();
        Box::new(move || {
            let _ = tx.send(());
        })
    }
}
