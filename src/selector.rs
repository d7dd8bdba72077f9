//! Library entry point: pick values from a list of labelled choices.
//!
//! ```no_run
//! use cull::{select, Choice, Config};
//!
//! let choices = vec![
//!     Choice::new("apple", 1),
//!     Choice::new("Banana", 2),
//!     Choice::new("cherry", 3),
//! ];
//! let picked = select(choices, &Config::default())?;
//! if picked.is_canceled() {
//!     std::process::exit(picked.status.code());
//! }
//! for choice in picked.items {
//!     println!("{} -> {}", choice.label, choice.value);
//! }
//! # Ok::<(), cull::Error>(())
//! ```

use crate::config::{load_config_file, Config};
use crate::coordinator::Coordinator;
use crate::matcher::configure_parallelism;
use crate::model::{ConfigurationError, Error, ExitStatus};
use crate::terminal::{Backend, CrosstermTerminal};
use tracing::debug;

/// One selectable entry: the text shown and matched, plus the caller's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<T> {
    /// Display text.
    pub label: String,
    /// Value handed back when the entry is selected.
    pub value: T,
}

impl<T> Choice<T> {
    /// Pair a label with a value.
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl<S: Into<String>, T> From<(S, T)> for Choice<T> {
    fn from((label, value): (S, T)) -> Self {
        Self::new(label, value)
    }
}

/// Outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected<T> {
    /// Chosen entries in input order. Empty unless `status` is success.
    pub items: Vec<Choice<T>>,
    /// How the session ended.
    pub status: ExitStatus,
}

impl<T> Selected<T> {
    /// Whether the session ended without a confirmed selection.
    pub fn is_canceled(&self) -> bool {
        !self.status.is_success()
    }
}

/// Run an interactive selection on the process terminal.
///
/// `None` entries are skipped.
///
/// # Errors
///
/// - [`Error::NoChoices`] if nothing is left to choose from
/// - [`Error::Configuration`] for an unknown matcher, layout, key map entry
///   or an unreadable rc file
/// - [`Error::TerminalInit`] if the terminal cannot be set up
///
/// A canceled or interrupted session is not an error; see [`Selected::status`].
pub fn select<T, I, C>(choices: I, config: &Config) -> Result<Selected<T>, Error>
where
    I: IntoIterator<Item = C>,
    C: Into<Option<Choice<T>>>,
{
    let mut terminal = CrosstermTerminal::new();
    select_with(choices, config, &mut terminal)
}

/// Like [`select`] on a caller-provided backend.
///
/// # Errors
///
/// Same as [`select`], plus [`Error::InternalConsistency`] if a selected
/// line cannot be traced back to its choice.
pub fn select_with<T, I, C>(
    choices: I,
    config: &Config,
    backend: &mut dyn Backend,
) -> Result<Selected<T>, Error>
where
    I: IntoIterator<Item = C>,
    C: Into<Option<Choice<T>>>,
{
    // Indexed by input ordinal; taken as results are mapped back.
    let mut slots: Vec<Option<Choice<T>>> = choices
        .into_iter()
        .filter_map(Into::into)
        .map(Some)
        .collect();
    if slots.is_empty() {
        return Err(Error::NoChoices);
    }

    configure_parallelism();
    let config = resolve_config(config)?;
    let coordinator = Coordinator::start(config)?;
    coordinator.feed_lines(slots.iter().flatten().map(|choice| choice.label.as_str()));

    let status = coordinator.run(backend)?;

    let mut items = Vec::new();
    for found in coordinator.result() {
        let choice = found
            .id()
            .index()
            .and_then(|index| slots.get_mut(index))
            .and_then(Option::take);
        match choice {
            Some(choice) => items.push(choice),
            None => {
                return Err(Error::InternalConsistency {
                    line: found.id(),
                    display: found.display().to_string(),
                })
            }
        }
    }
    debug!(count = items.len(), %status, "Selection mapped back to choices");
    Ok(Selected { items, status })
}

fn resolve_config(config: &Config) -> Result<Config, ConfigurationError> {
    let Some(path) = &config.rcfile else {
        return Ok(config.clone());
    };
    match load_config_file(path)? {
        Some(file) => Ok(config.clone().layer_file(file)),
        None => Ok(config.clone()),
    }
}
