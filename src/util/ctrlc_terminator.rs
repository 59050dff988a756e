use crate::util::terminator::Terminator;
use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Terminator that also reacts to Ctrl-C, so a long multi-trial run can be
/// aborted between trials without corrupting the best-so-far result
/// (spec.md §5: "cancellation is a policy choice of the driver").
#[derive(Debug, Clone)]
pub struct CtrlCTerminator {
    pub timeout: Option<Instant>,
    pub ctrlc: Arc<AtomicBool>,
}

impl CtrlCTerminator {
    /// Sets up the handler for Ctrl-C (only call once).
    pub fn new() -> Self {
        let ctrlc = Arc::new(AtomicBool::new(false));
        let c = ctrlc.clone();

        ctrlc::set_handler(move || {
            warn!("[MAIN] terminating...");
            c.store(true, Ordering::SeqCst);
        })
        .expect("Error setting Ctrl-C handler");

        Self {
            timeout: None,
            ctrlc,
        }
    }
}

impl Default for CtrlCTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminator for CtrlCTerminator {
    fn kill(&self) -> bool {
        self.timeout.is_some_and(|timeout| Instant::now() > timeout)
            || self.ctrlc.load(Ordering::SeqCst)
    }

    fn new_timeout(&mut self, timeout: Duration) {
        self.ctrlc.store(false, Ordering::SeqCst);
        self.timeout = Some(Instant::now() + timeout);
    }

    fn timeout_at(&self) -> Option<Instant> {
        self.timeout
    }
}
