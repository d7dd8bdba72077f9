//! Error types for the cull selector.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via `?` and
//! `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`Error`] - Top-level error returned by [`crate::select`] and [`crate::Coordinator::run`]
//!   - [`ConfigurationError`] - Unknown matcher/layout, bad key map, unreadable rc file
//!   - [`InputError`] - Line source failures in the `cull` binary (file not found, no input)
//!   - `TerminalInit` - The terminal backend could not be acquired
//!   - `InternalConsistency` - A selected line could not be mapped back to a caller choice
//!
//! # Propagation
//!
//! Configuration and terminal errors surface synchronously, before any loop starts. Failures
//! inside a running loop never propagate as [`Error`]: they are recorded as a [`LoopFault`]
//! and converted into a non-zero exit status so the terminal is always restored.
//! User cancellation is not an error at all.

use crate::config::ConfigError;
use crate::model::line::LineId;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error encompassing every failure a caller can observe.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration was rejected before the session started.
    ///
    /// No terminal resource has been touched when this is returned.
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The choice list was empty (or contained only `None`).
    ///
    /// Returned before any terminal interaction begins.
    #[error("No choices to select from: the choice list is empty")]
    NoChoices,

    /// The terminal backend failed to initialise (raw mode, alternate screen, ...).
    ///
    /// No loops were started.
    #[error("Failed to initialise terminal: {0}")]
    TerminalInit(#[source] std::io::Error),

    /// A returned match does not correspond to any caller-supplied choice.
    ///
    /// This indicates a bug in the ingestion/result protocol, not caller misuse.
    #[error("Selected line {line:?} ({display:?}) does not map to an input choice")]
    InternalConsistency {
        /// Ordinal of the offending line.
        line: LineId,
        /// Display text of the offending line.
        display: String,
    },

    /// Reading input lines failed.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),
}

/// Errors raised while validating a session configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No matcher is registered under the requested name.
    #[error(transparent)]
    UnknownMatcher(#[from] UnknownMatcherError),

    /// The layout name is neither `top-down` nor `bottom-up`.
    #[error("Unknown layout: '{0}' (expected 'top-down' or 'bottom-up')")]
    UnknownLayout(String),

    /// A `[keymap]` entry could not be understood.
    #[error("Invalid keymap entry '{key}': {reason}")]
    InvalidKeymap {
        /// The key string as written in the rc file.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The rc file could not be read or parsed.
    #[error(transparent)]
    File(#[from] ConfigError),
}

/// Lookup failure in the matcher registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown matcher: '{name}' (available: {})", available.join(", "))]
pub struct UnknownMatcherError {
    /// The name that was requested.
    pub name: String,
    /// Names that are registered.
    pub available: Vec<&'static str>,
}

/// Errors encountered when opening the line source for the `cull` binary.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified input file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use cull::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.txt")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.txt"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// No file argument was given and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Generic I/O failure while reading lines.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which of the four session loops an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// Terminal drawing.
    Render,
    /// Matcher execution.
    Filter,
    /// Keyboard and paste events.
    Input,
    /// Host signals (resize, interrupt, terminate).
    Signal,
}

impl LoopKind {
    /// All loops, in launch order.
    pub const ALL: [LoopKind; 4] = [
        LoopKind::Render,
        LoopKind::Filter,
        LoopKind::Input,
        LoopKind::Signal,
    ];

    /// Short lowercase name, also used for thread names.
    pub fn name(self) -> &'static str {
        match self {
            LoopKind::Render => "render",
            LoopKind::Filter => "filter",
            LoopKind::Input => "input",
            LoopKind::Signal => "signal",
        }
    }
}

impl std::fmt::Display for LoopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A contained failure inside one session loop.
///
/// Faults are recorded on the coordinator and force a non-zero exit; they are never
/// re-raised past [`crate::Coordinator::run`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} loop fault: {message}")]
pub struct LoopFault {
    /// The loop that failed.
    pub kind: LoopKind,
    /// Panic payload or error description.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn unknown_matcher_lists_available_names() {
        let err = UnknownMatcherError {
            name: "Fuzzy".to_string(),
            available: vec!["IgnoreCase", "CaseSensitive"],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Fuzzy'"));
        assert!(msg.contains("IgnoreCase, CaseSensitive"));
    }

    #[test]
    fn configuration_error_wraps_unknown_matcher_transparently() {
        let err: ConfigurationError = UnknownMatcherError {
            name: "Nope".to_string(),
            available: vec![],
        }
        .into();
        assert!(err.to_string().starts_with("Unknown matcher"));
    }

    #[test]
    fn unknown_layout_display_names_both_options() {
        let msg = ConfigurationError::UnknownLayout("sideways".to_string()).to_string();
        assert!(msg.contains("'sideways'"));
        assert!(msg.contains("top-down"));
        assert!(msg.contains("bottom-up"));
    }

    #[test]
    fn error_from_configuration_error() {
        let err: Error = ConfigurationError::UnknownLayout("x".to_string()).into();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn no_choices_message_is_descriptive() {
        assert!(Error::NoChoices.to_string().contains("empty"));
    }

    #[test]
    fn terminal_init_keeps_source() {
        let err = Error::TerminalInit(io::Error::new(io::ErrorKind::Other, "no tty"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("no tty"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn loop_fault_display_names_loop() {
        let fault = LoopFault {
            kind: LoopKind::Filter,
            message: "boom".to_string(),
        };
        assert_eq!(fault.to_string(), "filter loop fault: boom");
    }
}
