//! Interactive terminal via crossterm.
//!
//! The session draws on stderr so stdout stays free for the selected lines.

use super::{Backend, EventSource, HostSignals, RatatuiScreen, TerminalParts};
use crate::view::Styles;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use std::io;
use std::time::Duration;
use tracing::{debug, warn};

/// Raw-mode, alternate-screen terminal on stderr.
#[derive(Debug)]
pub struct CrosstermTerminal {
    styles: Styles,
    active: bool,
}

impl CrosstermTerminal {
    /// Terminal with styles taken from the environment (`NO_COLOR`).
    pub fn new() -> Self {
        Self::with_styles(Styles::from_env())
    }

    /// Terminal with explicit styles.
    pub fn with_styles(styles: Styles) -> Self {
        Self {
            styles,
            active: false,
        }
    }

    fn enter(&mut self) -> io::Result<TerminalParts> {
        enable_raw_mode()?;
        self.active = true;
        let mut stderr = io::stderr();
        execute!(
            stderr,
            EnterAlternateScreen,
            EnableBracketedPaste,
            cursor::Hide
        )?;
        let screen = RatatuiScreen::new(CrosstermBackend::new(stderr), self.styles)?;
        let signals = HostSignals::new()?;
        Ok(TerminalParts {
            screen: Box::new(screen),
            events: Box::new(CrosstermEvents),
            signals: Box::new(signals),
        })
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CrosstermTerminal {
    fn acquire(&mut self) -> io::Result<TerminalParts> {
        match self.enter() {
            Ok(parts) => {
                debug!("Terminal acquired");
                Ok(parts)
            }
            Err(err) => {
                if let Err(restore) = self.release() {
                    warn!(%restore, "Terminal restore after failed setup also failed");
                }
                Err(err)
            }
        }
    }

    fn release(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let mut stderr = io::stderr();
        let screen = execute!(
            stderr,
            DisableBracketedPaste,
            LeaveAlternateScreen,
            cursor::Show
        );
        // Raw mode goes even if the escape sequences could not be written.
        disable_raw_mode()?;
        screen?;
        debug!("Terminal released");
        Ok(())
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!(%err, "Terminal restore on drop failed");
        }
    }
}

/// Events read from the process terminal.
#[derive(Debug)]
struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            event::read().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ColorConfig;

    #[test]
    fn release_before_acquire_leaves_terminal_alone() {
        let mut terminal = CrosstermTerminal::with_styles(Styles::with_color_config(
            ColorConfig::from_env_and_args(true),
        ));
        assert!(!terminal.active);
        terminal
            .release()
            .expect("releasing an unacquired terminal is a no-op");
        terminal.release().expect("release is idempotent");
        assert!(!terminal.active);
    }
}
