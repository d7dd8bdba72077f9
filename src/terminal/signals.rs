//! Host signal delivery through `signal-hook`.

use super::{Notification, SignalSource};
use std::io;

#[cfg(unix)]
mod imp {
    use super::{Notification, SignalSource};
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM, SIGWINCH};
    use signal_hook::flag;
    use signal_hook::iterator::{Handle, Signals};
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, OnceLock, PoisonError};
    use tracing::{debug, trace};

    /// Signals the session reacts to.
    const WATCHED: [i32; 4] = [SIGWINCH, SIGINT, SIGTERM, SIGHUP];

    /// Signals whose default action is to terminate the process.
    pub(super) const TERMINATING: [i32; 3] = [SIGINT, SIGTERM, SIGHUP];

    /// Process-wide switch for the default action of [`TERMINATING`].
    ///
    /// signal-hook never uninstalls its handler, and it does not chain to
    /// `SIG_DFL`. The switch is registered once per process and stays `true`
    /// whenever no session holds the signals.
    static DEFAULT_ACTION: OnceLock<Mutex<Option<Arc<AtomicBool>>>> = OnceLock::new();

    fn default_action() -> io::Result<Arc<AtomicBool>> {
        let mut slot = DEFAULT_ACTION
            .get_or_init(|| Mutex::new(None))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(switch) = slot.as_ref() {
            return Ok(Arc::clone(switch));
        }
        let switch = Arc::new(AtomicBool::new(true));
        for signal in TERMINATING {
            flag::register_conditional_default(signal, Arc::clone(&switch))?;
        }
        *slot = Some(Arc::clone(&switch));
        Ok(switch)
    }

    pub(super) struct Inner {
        signals: Signals,
        handle: Handle,
        default_action: Arc<AtomicBool>,
    }

    impl Inner {
        pub(super) fn new() -> io::Result<Self> {
            let default_action = default_action()?;
            let signals = Signals::new(WATCHED)?;
            let handle = signals.handle();
            default_action.store(false, Ordering::SeqCst);
            Ok(Self {
                signals,
                handle,
                default_action,
            })
        }
    }

    impl Drop for Inner {
        fn drop(&mut self) {
            self.handle.close();
            self.default_action.store(true, Ordering::SeqCst);
            debug!("Default signal actions restored");
        }
    }

    fn notification_for(signal: i32) -> Option<Notification> {
        match signal {
            SIGWINCH => Some(Notification::Resize),
            SIGINT => Some(Notification::Interrupt),
            SIGTERM | SIGHUP => Some(Notification::Terminate),
            _ => None,
        }
    }

    impl SignalSource for Inner {
        fn wait(&mut self) -> Option<Notification> {
            for signal in self.signals.forever() {
                trace!(signal, "Signal received");
                if let Some(notification) = notification_for(signal) {
                    return Some(notification);
                }
            }
            None
        }

        fn closer(&self) -> Box<dyn Fn() + Send + Sync> {
            let handle = self.handle.clone();
            Box::new(move || handle.close())
        }
    }

}

#[cfg(not(unix))]
mod imp {
    use super::{Notification, SignalSource};
    use std::io;
    use std::sync::mpsc::{self, Receiver, Sender};

    /// No signal delivery on this platform; `wait` blocks until closed.
    pub(super) struct Inner {
        close_tx: Sender<()>,
        close_rx: Receiver<()>,
    }

    impl Inner {
        pub(super) fn new() -> io::Result<Self> {
            let (close_tx, close_rx) = mpsc::channel();
            Ok(Self { close_tx, close_rx })
        }
    }

    impl SignalSource for Inner {
        fn wait(&mut self) -> Option<Notification> {
            let _ = self.close_rx.recv();
            None
        }

        fn closer(&self) -> Box<dyn Fn() + Send + Sync> {
            let tx = self.close_tx.clone();
            Box::new(move || {
                let _ = tx.send(());
            })
        }
    }
}

/// Resize, interrupt and termination signals of the current process.
///
/// While a value is alive, SIGINT, SIGTERM and SIGHUP are delivered to
/// [`SignalSource::wait`] instead of terminating the process, so the session
/// can restore the terminal before exiting. Dropping it gives those signals
/// their default action back.
pub struct HostSignals {
    inner: imp::Inner,
}

impl HostSignals {
    /// Register the handlers.
    ///
    /// # Errors
    ///
    /// Fails if the signal handlers cannot be installed.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            inner: imp::Inner::new()?,
        })
    }
}

impl std::fmt::Debug for HostSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostSignals").finish_non_exhaustive()
    }
}

impl SignalSource for HostSignals {
    fn wait(&mut self) -> Option<Notification> {
        self.inner.wait()
    }

    fn closer(&self) -> Box<dyn Fn() + Send + Sync> {
        self.inner.closer()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use signal_hook::consts::SIGINT;
    use signal_hook::low_level::raise;
    use std::os::unix::process::ExitStatusExt;
    use std::process::Command;
    use std::thread;
    use std::time::Duration;

    /// Selects the scenario a re-executed test binary runs.
    const CHILD_SCENARIO: &str = "CULL_SIGNALS_SCENARIO";

    /// Re-run `test` in a fresh process with `scenario` set.
    fn run_child(test: &str, scenario: &str) -> std::process::ExitStatus {
        let exe = std::env::current_exe().expect("test binary path");
        Command::new(exe)
            .args([test, "--exact", "--test-threads=1", "--nocapture"])
            .env(CHILD_SCENARIO, scenario)
            .status()
            .expect("child test process should start")
    }

    fn scenario() -> Option<String> {
        std::env::var(CHILD_SCENARIO).ok()
    }

    #[test]
    fn interrupt_terminates_process_after_signals_are_dropped() {
        const TEST: &str = "terminal::signals::tests::interrupt_terminates_process_after_signals_are_dropped";
        if scenario().as_deref() == Some("after_drop") {
            // Two sessions back to back, then a plain Ctrl-C.
            for _ in 0..2 {
                let _signals = HostSignals::new().expect("handlers install");
            }
            raise(SIGINT).expect("raise SIGINT");
            thread::sleep(Duration::from_secs(2));
            std::process::exit(0);
        }

        let status = run_child(TEST, "after_drop");
        assert_eq!(
            status.signal(),
            Some(SIGINT),
            "SIGINT should kill the process once no session holds it, got {status:?}"
        );
    }

    #[test]
    fn interrupt_is_delivered_while_signals_are_held() {
        const TEST: &str = "terminal::signals::tests::interrupt_is_delivered_while_signals_are_held";
        if scenario().as_deref() == Some("held") {
            let mut signals = HostSignals::new().expect("handlers install");
            raise(SIGINT).expect("raise SIGINT");
            let code = match signals.wait() {
                Some(Notification::Interrupt) => 0,
                _ => 3,
            };
            std::process::exit(code);
        }

        let status = run_child(TEST, "held");
        assert_eq!(
            status.code(),
            Some(0),
            "SIGINT should reach wait() instead of killing the process, got {status:?}"
        );
    }
}
