//! Session exit status.

/// Exit status of a selection session.
///
/// Zero means the user confirmed. Every other value means no selection was
/// made, either by the user's choice or by an external event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitStatus(i32);

impl ExitStatus {
    /// The user confirmed a selection.
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    /// The user canceled from the keyboard.
    pub const CANCELED: ExitStatus = ExitStatus(1);
    /// A loop failed and the session was shut down.
    pub const FAULT: ExitStatus = ExitStatus(70);
    /// The process received an interrupt (SIGINT).
    pub const INTERRUPTED: ExitStatus = ExitStatus(130);
    /// The process was asked to terminate (SIGTERM/SIGHUP).
    pub const TERMINATED: ExitStatus = ExitStatus(143);

    /// Wrap an arbitrary status code.
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// Numeric status code, suitable for `std::process::exit`.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Whether the session ended in a confirmed selection.
    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_zero_is_success() {
        assert!(ExitStatus::SUCCESS.is_success());
        assert!(!ExitStatus::CANCELED.is_success());
        assert!(!ExitStatus::INTERRUPTED.is_success());
        assert!(!ExitStatus::new(-1).is_success());
    }

    #[test]
    fn signal_statuses_follow_shell_convention() {
        assert_eq!(ExitStatus::INTERRUPTED.code(), 128 + 2);
        assert_eq!(ExitStatus::TERMINATED.code(), 128 + 15);
    }
}
