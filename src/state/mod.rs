//! Interactive state (pure).
//!
//! Query editing and cursor/selection bookkeeping. Nothing here knows about
//! threads or the terminal; the coordinator guards these values and the
//! input loop drives them.

pub mod query;
pub mod selection;

pub use query::QueryState;
pub use selection::Selection;
