//! Timed confirmation with a visible countdown
//!
//! The prompt proceeds on its own once the countdown runs out. Enter, `y`
//! or space accept right away; Esc or `n` cancel. Raw mode is held by
//! [`RawModeGuard`] for the whole race and released when it drops.

use colored::*;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute};
use futures::StreamExt;
use hdb_core::{HdbError, HdbResult};
use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tracing::debug;

/// Raw terminal mode for as long as the guard lives
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> HdbResult<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| HdbError::io(format!("Failed to enable raw mode: {e}")))?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            debug!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// What a key press means for the pending confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    Accept,
    Cancel,
    Interrupt,
    Ignore,
}

pub fn classify_key(key: &KeyEvent) -> KeyDecision {
    if key.kind != KeyEventKind::Press {
        return KeyDecision::Ignore;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyDecision::Interrupt
        }
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('y') | KeyCode::Char('Y') => {
            KeyDecision::Accept
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => KeyDecision::Cancel,
        _ => KeyDecision::Ignore,
    }
}

/// Show `prompt` with a countdown and wait for a key or the deadline.
///
/// Without an interactive terminal there is nobody to override, so the
/// prompt is accepted immediately.
pub async fn auto_confirm(prompt: &str, timeout: Duration) -> HdbResult<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        debug!("No terminal, auto-confirming: {}", prompt);
        println!("{} {}", "?".cyan(), prompt);
        return Ok(true);
    }

    let outcome = {
        let _guard = RawModeGuard::acquire()?;
        race(prompt, timeout).await
    };

    // Raw mode is released here, so plain newlines work again
    let _ = execute!(
        std::io::stdout(),
        cursor::MoveToColumn(0),
        Clear(ClearType::CurrentLine)
    );
    match &outcome {
        Ok(true) => println!("{} {}", "✓".green(), prompt.dimmed()),
        Ok(false) => println!("{} {}", "✗".yellow(), prompt.dimmed()),
        Err(_) => println!(),
    }
    outcome
}

async fn race(prompt: &str, timeout: Duration) -> HdbResult<bool> {
    let deadline = Instant::now() + timeout;
    let mut events = EventStream::new();
    let mut ticker = interval(Duration::from_millis(100));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = sleep_until(deadline) => return Ok(true),
            _ = ticker.tick() => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                draw(prompt, remaining);
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => match classify_key(&key) {
                    KeyDecision::Accept => return Ok(true),
                    KeyDecision::Cancel => return Ok(false),
                    KeyDecision::Interrupt => return Err(HdbError::Interrupted),
                    KeyDecision::Ignore => {}
                },
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(HdbError::io(format!("Failed to read terminal input: {e}"))),
                // Input closed: nobody can override any more
                None => return Ok(true),
            },
        }
    }
}

fn draw(prompt: &str, remaining: Duration) {
    let seconds = remaining.as_secs() + u64::from(remaining.subsec_millis() > 0);
    let mut stdout = std::io::stdout();
    let _ = write!(
        stdout,
        "\r{} {} {} {}",
        "?".cyan(),
        prompt,
        format!("Press {} to change", "ESC".red()).dimmed(),
        format!("({seconds}s)").dimmed()
    );
    let _ = stdout.flush();
}
