//! Process signals to cancellation
//!
//! SIGINT, SIGTERM and SIGTSTP all count as a request to stop. SIGTSTP
//! (Ctrl+Z) would otherwise suspend the process with the display still
//! lit, so it is handled like an interrupt.
//!
//! The handler only records the signal. A watcher thread notices it and
//! runs the callback outside signal context.

use std::sync::atomic::{AtomicI32, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use nix::libc::c_int;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Signals that request a stop
const CANCEL_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGTSTP];

/// How often the watcher looks for a recorded signal
const WATCH_INTERVAL: Duration = Duration::from_millis(10);

/// Last signal received, 0 if none
static RECEIVED: AtomicI32 = AtomicI32::new(0);

extern "C" fn record_signal(signum: c_int) {
    RECEIVED.store(signum, Ordering::Release);
}

/// Install the handlers and run `callback` once on the first cancel signal
pub fn on_cancel_requested<F>(callback: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    let action = SigAction::new(
        SigHandler::Handler(record_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for sig in CANCEL_SIGNALS {
        // SAFETY: the handler only stores to an atomic, which is async-signal-safe
        unsafe { signal::sigaction(sig, &action) }
            .with_context(|| format!("installing {} handler", sig))?;
    }

    thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            let signum = loop {
                match RECEIVED.load(Ordering::Acquire) {
                    0 => thread::sleep(WATCH_INTERVAL),
                    signum => break signum,
                }
            };
            match Signal::try_from(signum) {
                Ok(sig) => info!("Received {}, shutting down", sig),
                Err(_) => info!("Received signal {}, shutting down", signum),
            }
            callback();
        })
        .context("spawning signal watcher")?;
    Ok(())
}
