//! Input loop: keyboard and paste events.

use crate::coordinator::Coordinator;
use crate::model::{ExitStatus, KeyAction};
use crate::state::query;
use crate::terminal::EventSource;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;
use tracing::{debug, trace};

/// Longest wait for an event before the exit flag is checked again.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) fn run(coordinator: &Coordinator, mut events: Box<dyn EventSource>) -> io::Result<()> {
    while !coordinator.is_exiting() {
        match events.next_event(POLL_INTERVAL) {
            Ok(Some(event)) => handle_event(coordinator, event),
            Ok(None) => {}
            Err(err) if coordinator.is_exiting() => {
                debug!(%err, "Event source failed during shutdown");
                break;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Apply one terminal event to the session.
pub fn handle_event(coordinator: &Coordinator, event: Event) {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(coordinator, key),
        Event::Paste(text) => coordinator.edit_and_filter(|q| query::insert_str(q, &text)),
        Event::Resize(..) => coordinator.request_redraw(),
        _ => {}
    }
}

fn handle_key(coordinator: &Coordinator, key: KeyEvent) {
    if let Some(action) = coordinator.bindings().get(key) {
        dispatch(coordinator, action);
        return;
    }
    match key.code {
        KeyCode::Char(ch) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            coordinator.edit_and_filter(|q| query::insert_char(q, ch));
        }
        _ => trace!(?key, "Unbound key ignored"),
    }
}

/// Perform a bound action.
pub fn dispatch(coordinator: &Coordinator, action: KeyAction) {
    let up = coordinator.layout().upward_step();
    match action {
        KeyAction::Finish => {
            coordinator.request_exit(ExitStatus::SUCCESS);
        }
        KeyAction::Cancel => {
            coordinator.request_exit(ExitStatus::CANCELED);
        }
        KeyAction::SelectUp => coordinator.move_cursor(up),
        KeyAction::SelectDown => coordinator.move_cursor(-up),
        KeyAction::PageUp => coordinator.move_page(up),
        KeyAction::PageDown => coordinator.move_page(-up),
        KeyAction::ToggleSelection => {
            coordinator.toggle_selection();
        }
        KeyAction::ToggleSelectionAndSelectNext => {
            if coordinator.toggle_selection() {
                coordinator.move_cursor(1);
            }
        }
        KeyAction::SelectAll => coordinator.select_all(),
        KeyAction::SelectNone => coordinator.select_none(),
        KeyAction::RotateMatcher => {
            coordinator.rotate_matcher();
        }
        KeyAction::Refresh => coordinator.request_refresh(),
        editing => coordinator.edit_and_filter(|q| query::apply(q, editing)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn coordinator() -> Coordinator {
        Coordinator::start(Config::default()).unwrap()
    }

    #[test]
    fn printable_characters_extend_query() {
        let c = coordinator();
        handle_event(&c, key(KeyCode::Char('a'), KeyModifiers::NONE));
        handle_event(&c, key(KeyCode::Char('N'), KeyModifiers::SHIFT));
        assert_eq!(c.query(), "aN");
    }

    #[test]
    fn control_characters_are_not_inserted() {
        let c = coordinator();
        handle_event(&c, key(KeyCode::Char('z'), KeyModifiers::CONTROL));
        assert_eq!(c.query(), "");
    }

    #[test]
    fn release_events_are_ignored() {
        let c = coordinator();
        let mut release = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        handle_event(&c, Event::Key(release));
        assert_eq!(c.query(), "");
    }

    #[test]
    fn paste_inserts_text_without_newlines() {
        let c = coordinator();
        handle_event(&c, Event::Paste("foo\nbar".to_string()));
        assert_eq!(c.query(), "foobar");
    }

    #[test]
    fn backspace_edits_query() {
        let c = coordinator();
        c.set_query("abc");
        handle_event(&c, key(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(c.query(), "ab");
    }

    #[test]
    fn enter_finishes_with_success() {
        let c = coordinator();
        handle_event(&c, key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(c.exit_status(), Some(ExitStatus::SUCCESS));
    }

    #[test]
    fn escape_cancels() {
        let c = coordinator();
        handle_event(&c, key(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(c.exit_status(), Some(ExitStatus::CANCELED));
    }

    #[test]
    fn rotate_matcher_cycles_registry() {
        let c = coordinator();
        handle_event(&c, key(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(c.matcher_name(), "CaseSensitive");
    }
}
