//! Query editing (pure state transitions).
//!
//! The caret is a character index, not a byte offset, so editing stays
//! correct for multi-byte input. All functions take the state by value and
//! return the updated state; none of them touch the terminal.

use crate::model::KeyAction;

// ===== QueryState =====

/// Query text plus caret position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    text: String,
    caret: usize,
}

impl QueryState {
    /// Create a query with the caret at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let caret = text.chars().count();
        Self { text, caret }
    }

    /// Query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caret position in characters.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Number of characters in the query.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the query is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }
}

/// Insert a character at the caret and advance it.
pub fn insert_char(mut state: QueryState, ch: char) -> QueryState {
    let at = state.byte_offset(state.caret);
    state.text.insert(at, ch);
    state.caret += 1;
    state
}

/// Insert pasted text at the caret.
///
/// Control characters (newlines, tabs, escapes) are dropped; a query is a
/// single line.
pub fn insert_str(mut state: QueryState, pasted: &str) -> QueryState {
    let clean: String = pasted.chars().filter(|c| !c.is_control()).collect();
    let at = state.byte_offset(state.caret);
    state.text.insert_str(at, &clean);
    state.caret += clean.chars().count();
    state
}

/// Delete the character before the caret. No-op at the start.
pub fn delete_backward_char(mut state: QueryState) -> QueryState {
    if state.caret == 0 {
        return state;
    }
    let at = state.byte_offset(state.caret - 1);
    state.text.remove(at);
    state.caret -= 1;
    state
}

/// Delete the character under the caret. No-op at the end.
pub fn delete_forward_char(mut state: QueryState) -> QueryState {
    if state.caret >= state.len_chars() {
        return state;
    }
    let at = state.byte_offset(state.caret);
    state.text.remove(at);
    state
}

/// Delete the word before the caret, including whitespace between it and the caret.
pub fn delete_backward_word(mut state: QueryState) -> QueryState {
    let chars: Vec<char> = state.text.chars().collect();
    let mut start = state.caret;
    while start > 0 && chars[start - 1].is_whitespace() {
        start -= 1;
    }
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    let from = state.byte_offset(start);
    let to = state.byte_offset(state.caret);
    state.text.replace_range(from..to, "");
    state.caret = start;
    state
}

/// Delete from the caret to the end of the query.
pub fn kill_end_of_line(mut state: QueryState) -> QueryState {
    let at = state.byte_offset(state.caret);
    state.text.truncate(at);
    state
}

/// Delete from the start of the query to the caret.
pub fn kill_beginning_of_line(mut state: QueryState) -> QueryState {
    let at = state.byte_offset(state.caret);
    state.text.replace_range(..at, "");
    state.caret = 0;
    state
}

/// Move the caret one character right. Saturates at the end.
pub fn forward_char(mut state: QueryState) -> QueryState {
    state.caret = (state.caret + 1).min(state.len_chars());
    state
}

/// Move the caret one character left. Saturates at 0.
pub fn backward_char(mut state: QueryState) -> QueryState {
    state.caret = state.caret.saturating_sub(1);
    state
}

/// Move the caret to the start.
pub fn beginning_of_line(mut state: QueryState) -> QueryState {
    state.caret = 0;
    state
}

/// Move the caret to the end.
pub fn end_of_line(mut state: QueryState) -> QueryState {
    state.caret = state.len_chars();
    state
}

/// Apply a query-related key action.
///
/// Actions that do not concern the query return the state unchanged.
pub fn apply(state: QueryState, action: KeyAction) -> QueryState {
    match action {
        KeyAction::DeleteBackwardChar => delete_backward_char(state),
        KeyAction::DeleteForwardChar => delete_forward_char(state),
        KeyAction::DeleteBackwardWord => delete_backward_word(state),
        KeyAction::KillEndOfLine => kill_end_of_line(state),
        KeyAction::KillBeginningOfLine => kill_beginning_of_line(state),
        KeyAction::ForwardChar => forward_char(state),
        KeyAction::BackwardChar => backward_char(state),
        KeyAction::BeginningOfLine => beginning_of_line(state),
        KeyAction::EndOfLine => end_of_line(state),
        _ => state,
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
