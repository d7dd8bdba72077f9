//! Tests for query editing transitions.

use super::*;

fn at(text: &str, caret: usize) -> QueryState {
    beginning_of_line_then_forward(QueryState::new(text), caret)
}

fn beginning_of_line_then_forward(state: QueryState, steps: usize) -> QueryState {
    (0..steps).fold(beginning_of_line(state), |s, _| forward_char(s))
}

// ===== Construction =====

#[test]
fn new_places_caret_at_end_in_chars() {
    let state = QueryState::new("héllo");
    assert_eq!(state.caret(), 5, "caret counts characters, not bytes");
    assert_eq!(state.len_chars(), 5);
}

// ===== Insertion =====

#[test]
fn insert_char_at_end() {
    let state = insert_char(QueryState::new("ab"), 'c');
    assert_eq!(state.text(), "abc");
    assert_eq!(state.caret(), 3);
}

#[test]
fn insert_char_in_middle_after_multibyte() {
    let state = insert_char(at("é1", 1), 'x');
    assert_eq!(state.text(), "éx1");
    assert_eq!(state.caret(), 2);
}

#[test]
fn insert_str_drops_control_characters() {
    let state = insert_str(QueryState::new(""), "foo\nbar\t!");
    assert_eq!(state.text(), "foobar!");
    assert_eq!(state.caret(), 7);
}

// ===== Deletion =====

#[test]
fn delete_backward_char_at_start_is_noop() {
    let state = delete_backward_char(at("abc", 0));
    assert_eq!(state.text(), "abc");
    assert_eq!(state.caret(), 0);
}

#[test]
fn delete_backward_char_removes_multibyte_char() {
    let state = delete_backward_char(QueryState::new("añ"));
    assert_eq!(state.text(), "a");
    assert_eq!(state.caret(), 1);
}

#[test]
fn delete_forward_char_at_end_is_noop() {
    let state = delete_forward_char(QueryState::new("abc"));
    assert_eq!(state.text(), "abc");
}

#[test]
fn delete_forward_char_keeps_caret() {
    let state = delete_forward_char(at("abc", 1));
    assert_eq!(state.text(), "ac");
    assert_eq!(state.caret(), 1);
}

#[test]
fn delete_backward_word_removes_word_and_trailing_space() {
    let state = delete_backward_word(QueryState::new("foo bar  "));
    assert_eq!(state.text(), "foo ");
    assert_eq!(state.caret(), 4);
}

#[test]
fn delete_backward_word_mid_query_keeps_tail() {
    let state = delete_backward_word(at("alpha beta gamma", 10));
    assert_eq!(state.text(), "alpha  gamma");
    assert_eq!(state.caret(), 6);
}

#[test]
fn kill_end_of_line_truncates_at_caret() {
    let state = kill_end_of_line(at("abcdef", 2));
    assert_eq!(state.text(), "ab");
    assert_eq!(state.caret(), 2);
}

#[test]
fn kill_beginning_of_line_removes_prefix() {
    let state = kill_beginning_of_line(at("abcdef", 2));
    assert_eq!(state.text(), "cdef");
    assert_eq!(state.caret(), 0);
}

// ===== Caret movement =====

#[test]
fn forward_char_saturates_at_end() {
    let state = forward_char(QueryState::new("ab"));
    assert_eq!(state.caret(), 2);
}

#[test]
fn backward_char_saturates_at_start() {
    let state = backward_char(at("ab", 0));
    assert_eq!(state.caret(), 0);
}

#[test]
fn end_of_line_after_beginning() {
    let state = end_of_line(beginning_of_line(QueryState::new("xyz")));
    assert_eq!(state.caret(), 3);
}

// ===== apply =====

#[test]
fn apply_ignores_non_query_actions() {
    let before = QueryState::new("keep");
    let after = apply(before.clone(), KeyAction::SelectDown);
    assert_eq!(before, after);
}

#[test]
fn apply_dispatches_editing_actions() {
    let state = apply(QueryState::new("ab"), KeyAction::DeleteBackwardChar);
    assert_eq!(state.text(), "a");
}
