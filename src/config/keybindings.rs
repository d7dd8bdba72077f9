//! Keyboard bindings configuration.
//!
//! Key strings use the emacs notation common to rc files: `C-` for Control,
//! `M-` for Alt, then either a single character or a key name such as
//! `Enter`, `Tab`, `BS`, `PgDn` or `F5`.

use crate::model::{ConfigurationError, KeyAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::{BTreeMap, HashMap};

/// Maps keyboard events to domain actions.
///
/// Provides default emacs-style bindings with option to override via configuration.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&normalize(key)).copied()
    }

    /// Defaults with `[keymap]` entries applied on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidKeymap`] for an unparseable key
    /// string or an unknown action name.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, ConfigurationError> {
        let mut bindings = Self::default();
        for (key, action) in overrides {
            let event = parse_key(key).map_err(|reason| ConfigurationError::InvalidKeymap {
                key: key.clone(),
                reason,
            })?;
            let action: KeyAction =
                action
                    .parse()
                    .map_err(|reason| ConfigurationError::InvalidKeymap {
                        key: key.clone(),
                        reason,
                    })?;
            bindings.bind(event, action);
        }
        Ok(bindings)
    }

    fn bind(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(normalize(key), action);
    }
}

/// Strip event kind/state and the Shift flag on characters.
///
/// Terminals disagree on whether an uppercase letter carries Shift, so the
/// character itself is authoritative.
pub fn normalize(key: KeyEvent) -> KeyEvent {
    let modifiers = match key.code {
        KeyCode::Char(_) => key.modifiers.difference(KeyModifiers::SHIFT),
        _ => key.modifiers,
    };
    KeyEvent::new(key.code, modifiers)
}

/// Parse an rc-file key string such as `C-n`, `M-Enter` or `PgDn`.
///
/// # Errors
///
/// Returns a human-readable reason when the string names no key.
pub fn parse_key(spec: &str) -> Result<KeyEvent, String> {
    let mut modifiers = KeyModifiers::NONE;
    let mut rest = spec;
    loop {
        if let Some(tail) = rest.strip_prefix("C-").filter(|t| !t.is_empty()) {
            modifiers |= KeyModifiers::CONTROL;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("M-").filter(|t| !t.is_empty()) {
            modifiers |= KeyModifiers::ALT;
            rest = tail;
        } else {
            break;
        }
    }

    let code = match rest {
        "Enter" | "Return" => KeyCode::Enter,
        "Esc" | "Escape" => KeyCode::Esc,
        "Tab" => KeyCode::Tab,
        "BS" | "Backspace" => KeyCode::Backspace,
        "Del" | "Delete" => KeyCode::Delete,
        "Up" | "ArrowUp" => KeyCode::Up,
        "Down" | "ArrowDown" => KeyCode::Down,
        "Left" | "ArrowLeft" => KeyCode::Left,
        "Right" | "ArrowRight" => KeyCode::Right,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PgUp" | "PageUp" => KeyCode::PageUp,
        "PgDn" | "PageDown" => KeyCode::PageDown,
        "Space" => KeyCode::Char(' '),
        other => {
            if let Some(n) = other
                .strip_prefix('F')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=12).contains(n))
            {
                KeyCode::F(n)
            } else {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => KeyCode::Char(ch),
                    (None, _) => return Err("empty key".to_string()),
                    _ => return Err(format!("unknown key name '{other}'")),
                }
            }
        }
    };
    Ok(KeyEvent::new(code, modifiers))
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        let alt = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::ALT);
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        // Finish / cancel
        bindings.bind(key(KeyCode::Enter), KeyAction::Finish);
        bindings.bind(ctrl('m'), KeyAction::Finish);
        bindings.bind(key(KeyCode::Esc), KeyAction::Cancel);
        bindings.bind(ctrl('c'), KeyAction::Cancel);
        bindings.bind(ctrl('g'), KeyAction::Cancel);

        // Query editing
        bindings.bind(key(KeyCode::Backspace), KeyAction::DeleteBackwardChar);
        bindings.bind(ctrl('h'), KeyAction::DeleteBackwardChar);
        bindings.bind(key(KeyCode::Delete), KeyAction::DeleteForwardChar);
        bindings.bind(ctrl('d'), KeyAction::DeleteForwardChar);
        bindings.bind(ctrl('w'), KeyAction::DeleteBackwardWord);
        bindings.bind(ctrl('k'), KeyAction::KillEndOfLine);
        bindings.bind(ctrl('u'), KeyAction::KillBeginningOfLine);

        // Caret movement
        bindings.bind(ctrl('f'), KeyAction::ForwardChar);
        bindings.bind(key(KeyCode::Right), KeyAction::ForwardChar);
        bindings.bind(ctrl('b'), KeyAction::BackwardChar);
        bindings.bind(key(KeyCode::Left), KeyAction::BackwardChar);
        bindings.bind(ctrl('a'), KeyAction::BeginningOfLine);
        bindings.bind(key(KeyCode::Home), KeyAction::BeginningOfLine);
        bindings.bind(ctrl('e'), KeyAction::EndOfLine);
        bindings.bind(key(KeyCode::End), KeyAction::EndOfLine);

        // Cursor movement
        bindings.bind(ctrl('n'), KeyAction::SelectDown);
        bindings.bind(key(KeyCode::Down), KeyAction::SelectDown);
        bindings.bind(ctrl('p'), KeyAction::SelectUp);
        bindings.bind(key(KeyCode::Up), KeyAction::SelectUp);
        bindings.bind(key(KeyCode::PageDown), KeyAction::PageDown);
        bindings.bind(ctrl('v'), KeyAction::PageDown);
        bindings.bind(key(KeyCode::PageUp), KeyAction::PageUp);
        bindings.bind(alt('v'), KeyAction::PageUp);

        // Multi-selection
        bindings.bind(ctrl(' '), KeyAction::ToggleSelection);
        bindings.bind(key(KeyCode::Tab), KeyAction::ToggleSelectionAndSelectNext);
        bindings.bind(alt('a'), KeyAction::SelectAll);
        bindings.bind(alt('u'), KeyAction::SelectNone);

        // Session
        bindings.bind(ctrl('r'), KeyAction::RotateMatcher);
        bindings.bind(ctrl('l'), KeyAction::Refresh);

        bindings
    }
}
