//! Selector styling.
//!
//! Every visual distinction has a modifier-only fallback so the UI stays
//! usable when colours are disabled.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== Styles =====

/// Styles for each element of the selector screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Styles {
    /// The prompt text before the query.
    pub prompt: Style,
    /// The character under the caret.
    pub caret: Style,
    /// Matched ranges within a line.
    pub highlight: Style,
    /// The row under the cursor.
    pub cursor_line: Style,
    /// Rows chosen for multi-selection.
    pub chosen: Style,
    /// The status line.
    pub status: Style,
}

impl Styles {
    /// Styles according to `NO_COLOR`.
    pub fn from_env() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }

    /// Styles for the given colour setting.
    pub fn with_color_config(config: ColorConfig) -> Self {
        let cursor_line = Style::default().add_modifier(Modifier::REVERSED);
        let caret = Style::default().add_modifier(Modifier::REVERSED);
        if config.colors_enabled() {
            Self {
                prompt: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                caret,
                highlight: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                cursor_line,
                chosen: Style::default().fg(Color::Magenta),
                status: Style::default().fg(Color::DarkGray),
            }
        } else {
            Self {
                prompt: Style::default().add_modifier(Modifier::BOLD),
                caret,
                highlight: Style::default().add_modifier(Modifier::UNDERLINED),
                cursor_line,
                chosen: Style::default().add_modifier(Modifier::BOLD),
                status: Style::default().add_modifier(Modifier::DIM),
            }
        }
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::from_env()
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn color_config_respects_no_color_flag() {
        let config = ColorConfig::from_env_and_args(true);
        assert!(
            !config.colors_enabled(),
            "--no-color flag should disable colors"
        );
    }

    #[test]
    #[serial(no_color)]
    fn color_config_no_color_env_any_value_disables() {
        std::env::set_var("NO_COLOR", "");
        let config = ColorConfig::from_env_and_args(false);
        assert!(
            !config.colors_enabled(),
            "NO_COLOR with empty string should disable colors"
        );
        std::env::remove_var("NO_COLOR");
    }

    #[test]
    #[serial(no_color)]
    fn color_config_enables_colors_by_default() {
        std::env::remove_var("NO_COLOR");
        let config = ColorConfig::from_env_and_args(false);
        assert!(config.colors_enabled(), "Colors should be enabled by default");
    }

    #[test]
    fn disabled_colors_use_no_foreground() {
        let styles = Styles::with_color_config(ColorConfig::from_env_and_args(true));
        assert!(styles.highlight.fg.is_none());
        assert!(styles.chosen.fg.is_none());
        assert!(
            styles.highlight.add_modifier.contains(Modifier::UNDERLINED),
            "Highlights must stay visible without colour"
        );
    }

    #[test]
    fn enabled_colors_have_highlight_foreground() {
        let styles = Styles::with_color_config(ColorConfig { enabled: true });
        assert_eq!(styles.highlight.fg, Some(Color::Yellow));
    }
}
