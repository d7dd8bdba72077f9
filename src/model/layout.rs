//! Screen layout orientation.

use crate::model::error::ConfigurationError;
use std::str::FromStr;

/// Orientation of the prompt and the match list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Prompt on the first row, matches listed downward.
    #[default]
    TopDown,
    /// Prompt on the last row, matches listed upward from it.
    BottomUp,
}

impl Layout {
    /// Name as accepted in configuration.
    pub fn name(self) -> &'static str {
        match self {
            Layout::TopDown => "top-down",
            Layout::BottomUp => "bottom-up",
        }
    }

    /// Translate an on-screen upward move into a change of cursor index.
    ///
    /// In `top-down` the first match is at the top, so "up" means a smaller index.
    /// In `bottom-up` the first match sits next to the prompt at the bottom.
    pub fn upward_step(self) -> isize {
        match self {
            Layout::TopDown => -1,
            Layout::BottomUp => 1,
        }
    }
}

impl FromStr for Layout {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "top-down" => Ok(Layout::TopDown),
            "bottom-up" => Ok(Layout::BottomUp),
            other => Err(ConfigurationError::UnknownLayout(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_layouts() {
        assert_eq!("top-down".parse::<Layout>(), Ok(Layout::TopDown));
        assert_eq!("bottom-up".parse::<Layout>(), Ok(Layout::BottomUp));
    }

    #[test]
    fn empty_name_means_default() {
        assert_eq!("".parse::<Layout>(), Ok(Layout::default()));
    }

    #[test]
    fn unknown_layout_is_a_configuration_error() {
        assert_eq!(
            "diagonal".parse::<Layout>(),
            Err(ConfigurationError::UnknownLayout("diagonal".to_string()))
        );
    }

    #[test]
    fn upward_step_flips_with_orientation() {
        assert_eq!(Layout::TopDown.upward_step(), -1);
        assert_eq!(Layout::BottomUp.upward_step(), 1);
    }
}
