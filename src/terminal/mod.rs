//! Terminal boundary.
//!
//! The coordinator never touches the terminal directly. A [`Backend`] is
//! acquired once per session and split into three parts, each owned by
//! exactly one loop:
//!
//! - [`Screen`] by the render loop (the only writer)
//! - [`EventSource`] by the input loop
//! - [`SignalSource`] by the signal loop
//!
//! [`CrosstermTerminal`] is the real implementation; [`ScriptedTerminal`]
//! replays a fixed script against ratatui's `TestBackend`.

mod crossterm_backend;
mod scripted;
mod signals;

pub use crossterm_backend::CrosstermTerminal;
pub use scripted::{ScriptedTerminal, ScriptedTerminalProbe};
pub use signals::HostSignals;

use crate::view::{self, RenderSnapshot, Styles};
use crossterm::event::Event;
use ratatui::backend::Backend as RatatuiBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;

/// Host notification relevant to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The terminal was resized.
    Resize,
    /// Interactive interrupt (SIGINT).
    Interrupt,
    /// Termination request (SIGTERM, SIGHUP).
    Terminate,
}

/// Drawing surface owned by the render loop.
pub trait Screen: Send {
    /// Draw one frame. Returns the number of list rows that fit.
    fn draw(&mut self, snapshot: &RenderSnapshot) -> io::Result<usize>;

    /// Forget what is on screen so the next draw repaints every cell.
    fn clear(&mut self) -> io::Result<()>;
}

/// Keyboard, paste and resize events.
pub trait EventSource: Send {
    /// Wait up to `timeout` for the next event.
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

/// Blocking stream of host notifications.
pub trait SignalSource: Send {
    /// Block until the next notification. `None` once the source is closed.
    fn wait(&mut self) -> Option<Notification>;

    /// A handle that closes this source from another thread, unblocking [`SignalSource::wait`].
    fn closer(&self) -> Box<dyn Fn() + Send + Sync>;
}

/// The pieces of an acquired terminal.
pub struct TerminalParts {
    /// Drawing surface.
    pub screen: Box<dyn Screen>,
    /// Input events.
    pub events: Box<dyn EventSource>,
    /// Host signals.
    pub signals: Box<dyn SignalSource>,
}

impl std::fmt::Debug for TerminalParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalParts").finish_non_exhaustive()
    }
}

/// Terminal setup and teardown.
pub trait Backend {
    /// Enter interactive mode and hand out the session's terminal parts.
    ///
    /// # Errors
    ///
    /// Any I/O failure here aborts the session before a loop starts.
    fn acquire(&mut self) -> io::Result<TerminalParts>;

    /// Restore the terminal. Called once after every loop has stopped.
    ///
    /// # Errors
    ///
    /// Returns the I/O failure; the session result is unaffected.
    fn release(&mut self) -> io::Result<()>;
}

// ===== RatatuiScreen =====

/// [`Screen`] over any ratatui backend.
pub struct RatatuiScreen<B: RatatuiBackend> {
    terminal: Terminal<B>,
    styles: Styles,
}

impl<B: RatatuiBackend> RatatuiScreen<B> {
    /// Wrap a ratatui backend.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot report its size.
    pub fn new(backend: B, styles: Styles) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            styles,
        })
    }

    /// The wrapped ratatui terminal.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: RatatuiBackend + Send> Screen for RatatuiScreen<B> {
    fn draw(&mut self, snapshot: &RenderSnapshot) -> io::Result<usize> {
        let mut rows = 0;
        let styles = &self.styles;
        self.terminal.draw(|frame| {
            rows = view::render(frame, snapshot, styles);
        })?;
        Ok(rows)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.terminal.clear()
    }
}
