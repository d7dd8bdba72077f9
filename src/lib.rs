//! cull: an embeddable interactive line filter.
//!
//! Given a list of text lines, cull draws them in the terminal, narrows the
//! visible set as the user types a query, and returns the lines the user
//! selects. [`select`] is the one-call entry point; [`Coordinator`] exposes
//! the session itself for callers that stream lines in while it runs.
//!
//! A session runs four loops on their own threads (render, filter, input,
//! signal) around one shared [`Coordinator`]. Only the render loop writes to
//! the terminal, and the result is delivered after every loop has stopped.

pub mod config;
pub mod coordinator;
pub mod logging;
pub mod loops;
pub mod matcher;
pub mod model;
pub mod selector;
pub mod source;
pub mod state;
pub mod terminal;
pub mod view;

pub use config::Config;
pub use coordinator::Coordinator;
pub use matcher::{Matcher, Registry};
pub use model::{Error, ExitStatus, Line, LineId, Match};
pub use selector::{select, select_with, Choice, Selected};
