//! Configuration module.
//!
//! [`Config`] is the immutable per-session configuration. The loader resolves
//! it from defaults, the TOML rc file, environment variables and CLI flags;
//! [`KeyBindings`] turns its `[keymap]` table into a key-event lookup.

pub mod keybindings;
pub mod loader;

pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, Config,
    ConfigError, ConfigFile,
};
