//! Domain-level keyboard actions independent of key bindings.

use std::str::FromStr;

/// Domain-level actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
/// Names used in the rc file `[keymap]` table are the snake_case forms
/// returned by [`KeyAction::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Session
    /// Confirm the current selection and finish. Default: Enter
    Finish,
    /// Abandon the session with an empty result. Default: Esc/Ctrl+c/Ctrl+g
    Cancel,

    // Query editing
    /// Delete the character before the caret. Default: Backspace/Ctrl+h
    DeleteBackwardChar,
    /// Delete the character under the caret. Default: Delete/Ctrl+d
    DeleteForwardChar,
    /// Delete the word before the caret. Default: Ctrl+w
    DeleteBackwardWord,
    /// Delete from the caret to the end of the query. Default: Ctrl+k
    KillEndOfLine,
    /// Delete from the start of the query to the caret. Default: Ctrl+u
    KillBeginningOfLine,
    /// Move the caret one character right. Default: Right/Ctrl+f
    ForwardChar,
    /// Move the caret one character left. Default: Left/Ctrl+b
    BackwardChar,
    /// Move the caret to the start of the query. Default: Home/Ctrl+a
    BeginningOfLine,
    /// Move the caret to the end of the query. Default: End/Ctrl+e
    EndOfLine,

    // Cursor movement
    /// Move the cursor one line up on screen. Default: Up/Ctrl+p
    SelectUp,
    /// Move the cursor one line down on screen. Default: Down/Ctrl+n
    SelectDown,
    /// Move the cursor one page up on screen. Default: PageUp
    PageUp,
    /// Move the cursor one page down on screen. Default: PageDown
    PageDown,

    // Multi-select
    /// Toggle the line under the cursor in the chosen set. Default: Ctrl+Space
    ToggleSelection,
    /// Toggle the line under the cursor, then move down. Default: Tab
    ToggleSelectionAndSelectNext,
    /// Choose every line in the current view.
    SelectAll,
    /// Clear the chosen set.
    SelectNone,

    // Miscellaneous
    /// Switch to the next registered matcher. Default: Ctrl+r
    RotateMatcher,
    /// Redraw the screen. Default: Ctrl+l
    Refresh,
}

impl KeyAction {
    /// Every action, in declaration order.
    pub const ALL: [KeyAction; 21] = [
        KeyAction::Finish,
        KeyAction::Cancel,
        KeyAction::DeleteBackwardChar,
        KeyAction::DeleteForwardChar,
        KeyAction::DeleteBackwardWord,
        KeyAction::KillEndOfLine,
        KeyAction::KillBeginningOfLine,
        KeyAction::ForwardChar,
        KeyAction::BackwardChar,
        KeyAction::BeginningOfLine,
        KeyAction::EndOfLine,
        KeyAction::SelectUp,
        KeyAction::SelectDown,
        KeyAction::PageUp,
        KeyAction::PageDown,
        KeyAction::ToggleSelection,
        KeyAction::ToggleSelectionAndSelectNext,
        KeyAction::SelectAll,
        KeyAction::SelectNone,
        KeyAction::RotateMatcher,
        KeyAction::Refresh,
    ];

    /// The snake_case name used in rc files.
    pub fn name(self) -> &'static str {
        match self {
            KeyAction::Finish => "finish",
            KeyAction::Cancel => "cancel",
            KeyAction::DeleteBackwardChar => "delete_backward_char",
            KeyAction::DeleteForwardChar => "delete_forward_char",
            KeyAction::DeleteBackwardWord => "delete_backward_word",
            KeyAction::KillEndOfLine => "kill_end_of_line",
            KeyAction::KillBeginningOfLine => "kill_beginning_of_line",
            KeyAction::ForwardChar => "forward_char",
            KeyAction::BackwardChar => "backward_char",
            KeyAction::BeginningOfLine => "beginning_of_line",
            KeyAction::EndOfLine => "end_of_line",
            KeyAction::SelectUp => "select_up",
            KeyAction::SelectDown => "select_down",
            KeyAction::PageUp => "page_up",
            KeyAction::PageDown => "page_down",
            KeyAction::ToggleSelection => "toggle_selection",
            KeyAction::ToggleSelectionAndSelectNext => "toggle_selection_and_select_next",
            KeyAction::SelectAll => "select_all",
            KeyAction::SelectNone => "select_none",
            KeyAction::RotateMatcher => "rotate_matcher",
            KeyAction::Refresh => "refresh",
        }
    }

    /// Whether the action edits the query text (and therefore needs a filter pass).
    pub fn edits_query(self) -> bool {
        matches!(
            self,
            KeyAction::DeleteBackwardChar
                | KeyAction::DeleteForwardChar
                | KeyAction::DeleteBackwardWord
                | KeyAction::KillEndOfLine
                | KeyAction::KillBeginningOfLine
        )
    }
}

impl FromStr for KeyAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyAction::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}
