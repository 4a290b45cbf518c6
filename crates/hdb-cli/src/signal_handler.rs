//! Ctrl+C handling
//!
//! SIGINT terminates the process with status 130. Raw mode may be held by
//! the auto-confirm prompt at that moment, so the terminal is restored
//! first.

use futures::stream::StreamExt;
use hdb_core::error::EXIT_INTERRUPTED;
use signal_hook::consts::SIGINT;
use signal_hook_tokio::Signals;
use std::sync::atomic::{AtomicBool, Ordering};

static STARTED: AtomicBool = AtomicBool::new(false);

/// Install the SIGINT listener once for the process
pub fn start_signal_handling() -> std::io::Result<()> {
    if STARTED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let mut signals = Signals::new([SIGINT])?;
    tokio::spawn(async move {
        while let Some(signal) = signals.next().await {
            if signal == SIGINT {
                let _ = crossterm::terminal::disable_raw_mode();
                eprintln!();
                std::process::exit(i32::from(EXIT_INTERRUPTED));
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_is_idempotent() {
        assert!(start_signal_handling().is_ok());
        assert!(start_signal_handling().is_ok());
        assert!(STARTED.load(Ordering::SeqCst));
    }
}
