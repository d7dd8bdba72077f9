//! Piped stdin input for the `cull` binary.

use crate::model::error::InputError;
use std::io::{self, IsTerminal, Stdin};

/// Stdin, if it is not an interactive terminal.
///
/// # Errors
///
/// Returns `InputError::NoInput` when stdin is a TTY: there is nothing piped
/// to read and the session needs the terminal for keystrokes.
pub fn piped() -> Result<Stdin, InputError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(InputError::NoInput);
    }
    Ok(stdin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tty_stdin_is_rejected() {
        // Only meaningful when the test runner is attached to a terminal.
        if io::stdin().is_terminal() {
            assert!(matches!(piped(), Err(InputError::NoInput)));
        }
    }
}
