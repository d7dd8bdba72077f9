//! Matching strategies and the registry that names them.
//!
//! A [`Matcher`] is a pure function from a query and a line set to an ordered
//! sequence of [`Match`] values. The filter loop calls it through the trait
//! object without knowing which strategy is active.
//!
//! The [`Registry`] is an explicit registration table built once per session.
//! Strategies are looked up by name (case-insensitively) and can be rotated at
//! runtime, but the table itself is never mutated after construction.

mod substring;

pub use substring::{CaseSensitive, IgnoreCase, SmartCase};

use crate::model::{Line, Match, UnknownMatcherError};
use std::sync::{Arc, Once};
use tracing::debug;

/// Name of the matcher used when the configuration does not pick one.
pub const DEFAULT_MATCHER: &str = "IgnoreCase";

/// Environment variable that, when set, leaves thread-pool sizing to rayon.
pub const PARALLELISM_ENV: &str = "RAYON_NUM_THREADS";

/// A named line-filtering strategy.
///
/// Implementations must be pure: the same query and lines always produce the
/// same matches. Ordering is the strategy's own ranking but must be stable,
/// so lines of equal rank keep their buffer order.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Registry name of this strategy.
    fn name(&self) -> &'static str;

    /// Filter `lines` by `query`, annotating each accepted line with its matched ranges.
    fn filter(&self, query: &str, lines: &[Arc<Line>]) -> Vec<Match>;
}

// ===== Registry =====

/// Static table of available matchers.
#[derive(Debug, Clone)]
pub struct Registry {
    matchers: Vec<Arc<dyn Matcher>>,
}

impl Registry {
    /// The built-in strategies, with the default first.
    pub fn builtin() -> Self {
        Self::new(vec![
            Arc::new(IgnoreCase),
            Arc::new(CaseSensitive),
            Arc::new(SmartCase),
        ])
    }

    /// Build a registry from an explicit list.
    ///
    /// The first entry is the default. An empty list falls back to the built-ins.
    pub fn new(matchers: Vec<Arc<dyn Matcher>>) -> Self {
        if matchers.is_empty() {
            return Self::builtin();
        }
        Self { matchers }
    }

    /// Registered names, in rotation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// The first registered matcher.
    pub fn default_matcher(&self) -> Arc<dyn Matcher> {
        Arc::clone(&self.matchers[0])
    }

    /// Look up a matcher by name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMatcherError`] listing the registered names if none matches.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Matcher>, UnknownMatcherError> {
        self.matchers
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .map(Arc::clone)
            .ok_or_else(|| UnknownMatcherError {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// The matcher registered after `name`, wrapping around.
    ///
    /// An unknown name rotates to the default.
    pub fn next_after(&self, name: &str) -> Arc<dyn Matcher> {
        let position = self
            .matchers
            .iter()
            .position(|m| m.name().eq_ignore_ascii_case(name));
        match position {
            Some(index) => Arc::clone(&self.matchers[(index + 1) % self.matchers.len()]),
            None => self.default_matcher(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ===== Parallelism =====

/// Size rayon's global pool to every available processing unit.
///
/// Skipped when [`PARALLELISM_ENV`] is set, in which case rayon honours it.
/// Best effort: if the global pool already exists this is a no-op.
pub fn configure_parallelism() {
    static CONFIGURE: Once = Once::new();
    CONFIGURE.call_once(|| {
        if std::env::var_os(PARALLELISM_ENV).is_some() {
            return;
        }
        let threads = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            Ok(()) => debug!(threads, "Configured matcher thread pool"),
            Err(err) => debug!(%err, "Matcher thread pool already configured"),
        }
    });
}
