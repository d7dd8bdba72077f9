//! Configuration file loading with precedence handling.

use crate::matcher::DEFAULT_MATCHER;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an rc file.
pub const CONFIG_ENV: &str = "CULL_CONFIG";

/// Environment variable overriding the initial matcher.
pub const MATCHER_ENV: &str = "CULL_MATCHER";

/// Environment variable overriding the layout.
pub const LAYOUT_ENV: &str = "CULL_LAYOUT";

/// Default prompt shown before the query.
pub const DEFAULT_PROMPT: &str = "QUERY>";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML rc file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/cull/config.toml`:
///
/// ```toml
/// prompt = "FIND>"
/// layout = "bottom-up"
/// initial_matcher = "SmartCase"
///
/// [keymap]
/// "C-j" = "finish"
/// "M-a" = "select_all"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Initial query text.
    #[serde(default)]
    pub query: Option<String>,

    /// Prompt shown before the query.
    #[serde(default)]
    pub prompt: Option<String>,

    /// `top-down` or `bottom-up`.
    #[serde(default)]
    pub layout: Option<String>,

    /// Matcher selected at start.
    #[serde(default)]
    pub initial_matcher: Option<String>,

    /// Maximum lines kept in the buffer (0 = unbounded).
    #[serde(default)]
    pub buffer_size: Option<usize>,

    /// Split records on NUL into display and output.
    #[serde(default)]
    pub null_separator: Option<bool>,

    /// 1-based initial cursor row.
    #[serde(default)]
    pub initial_index: Option<i64>,

    /// Allow choosing more than one line.
    #[serde(default)]
    pub multi_select: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Key string to action name overrides.
    #[serde(default)]
    pub keymap: Option<BTreeMap<String, String>>,
}

// ===== Config =====

/// Session configuration after applying precedence rules.
///
/// Immutable once handed to [`crate::Coordinator::start`]. Created by merging
/// defaults, rc file, env vars, and CLI args, or built directly by a library
/// caller via struct update syntax on [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Initial query text.
    pub query: String,
    /// Rc file to layer under the caller's settings (library use).
    pub rcfile: Option<PathBuf>,
    /// Maximum lines kept in the buffer; the oldest are evicted. 0 = unbounded.
    pub buffer_size: usize,
    /// Split records on NUL into display and output.
    pub null_separator: bool,
    /// 1-based initial cursor row; values `<= 0` mean the first row.
    pub initial_index: i64,
    /// Matcher selected at start.
    pub initial_matcher: String,
    /// Prompt shown before the query.
    pub prompt: String,
    /// `top-down` or `bottom-up`; validated by [`crate::Coordinator::start`].
    pub layout: String,
    /// Allow choosing more than one line.
    pub multi_select: bool,
    /// Key string to action name overrides.
    pub keymap: BTreeMap<String, String>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query: String::new(),
            rcfile: None,
            buffer_size: 0,
            null_separator: false,
            initial_index: 1,
            initial_matcher: DEFAULT_MATCHER.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            layout: String::new(),
            multi_select: true,
            keymap: BTreeMap::new(),
            log_file_path: default_log_path(),
        }
    }
}

impl Config {
    /// Zero-based cursor row derived from [`Config::initial_index`].
    pub fn initial_cursor(&self) -> usize {
        usize::try_from(self.initial_index.max(1) - 1).unwrap_or(0)
    }

    /// Fill every field still at its default from `file`.
    ///
    /// Used when a library caller names an rc file: explicit settings win,
    /// the file supplies the rest. Key map entries the caller did not bind
    /// are added.
    #[must_use]
    pub fn layer_file(mut self, file: ConfigFile) -> Self {
        let defaults = Self::default();

        fn fill<T: PartialEq>(slot: &mut T, default: &T, value: Option<T>) {
            if let Some(value) = value {
                if *slot == *default {
                    *slot = value;
                }
            }
        }

        fill(&mut self.query, &defaults.query, file.query);
        fill(&mut self.prompt, &defaults.prompt, file.prompt);
        fill(&mut self.layout, &defaults.layout, file.layout);
        fill(
            &mut self.initial_matcher,
            &defaults.initial_matcher,
            file.initial_matcher,
        );
        fill(&mut self.buffer_size, &defaults.buffer_size, file.buffer_size);
        fill(
            &mut self.null_separator,
            &defaults.null_separator,
            file.null_separator,
        );
        fill(
            &mut self.initial_index,
            &defaults.initial_index,
            file.initial_index,
        );
        fill(&mut self.multi_select, &defaults.multi_select, file.multi_select);
        fill(
            &mut self.log_file_path,
            &defaults.log_file_path,
            file.log_file_path,
        );
        for (key, action) in file.keymap.unwrap_or_default() {
            self.keymap.entry(key).or_insert(action);
        }
        self
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/cull/cull.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("cull").join("cull.log")
    } else {
        PathBuf::from("cull.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/cull/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cull").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--rcfile`)
/// 2. `CULL_CONFIG` environment variable
/// 3. Default path `~/.config/cull/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create a session config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> Config {
    match config_file {
        Some(file) => Config::default().layer_file(file),
        None => Config::default(),
    }
}

/// Apply environment variable overrides.
///
/// Checks for:
/// - `CULL_MATCHER`: Override the initial matcher
/// - `CULL_LAYOUT`: Override the layout
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(matcher) = std::env::var(MATCHER_ENV) {
        config.initial_matcher = matcher;
    }

    if let Ok(layout) = std::env::var(LAYOUT_ENV) {
        config.layout = layout;
    }

    config
}

/// Values set explicitly on the command line.
///
/// `None` means the flag was absent and lower-precedence sources stand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--query`
    pub query: Option<String>,
    /// `--buffer-size`
    pub buffer_size: Option<usize>,
    /// `--null`
    pub null_separator: Option<bool>,
    /// `--initial-index`, already converted to 1-based.
    pub initial_index: Option<i64>,
    /// `--initial-matcher`
    pub initial_matcher: Option<String>,
    /// `--prompt`
    pub prompt: Option<String>,
    /// `--layout`
    pub layout: Option<String>,
}

/// Apply CLI argument overrides.
///
/// CLI args have the highest precedence and override all other sources.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(query) = cli.query {
        config.query = query;
    }
    if let Some(buffer_size) = cli.buffer_size {
        config.buffer_size = buffer_size;
    }
    if let Some(null_separator) = cli.null_separator {
        config.null_separator = null_separator;
    }
    if let Some(initial_index) = cli.initial_index {
        config.initial_index = initial_index;
    }
    if let Some(matcher) = cli.initial_matcher {
        config.initial_matcher = matcher;
    }
    if let Some(prompt) = cli.prompt {
        config.prompt = prompt;
    }
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
