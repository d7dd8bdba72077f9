//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod filtered;
pub mod key_action;
pub mod layout;
pub mod line;
pub mod status;

// Re-export for convenience
pub use error::{
    ConfigurationError, Error, InputError, LoopFault, LoopKind, UnknownMatcherError,
};
pub use filtered::FilteredView;
pub use key_action::KeyAction;
pub use layout::Layout;
pub use line::{Line, LineId, Match};
pub use status::ExitStatus;
