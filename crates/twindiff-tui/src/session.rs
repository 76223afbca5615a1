#![forbid(unsafe_code)]

//! Terminal session guard.
//!
//! Raw mode, the alternate screen, and bracketed paste are entered
//! together and restored together - including on panic unwind, via
//! `Drop` - so a crash never leaves the user's shell in raw mode.

use std::io::{self, Write};

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};

/// RAII guard for the terminal state the editor needs.
pub struct TerminalSession {
    active: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableBracketedPaste,
            cursor::Hide
        )?;
        Ok(Self { active: true })
    }

    /// Restore the terminal. Idempotent.
    pub fn leave(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            execute!(
                io::stdout(),
                cursor::Show,
                DisableBracketedPaste,
                LeaveAlternateScreen
            )?;
            disable_raw_mode()?;
            io::stdout().flush()?;
        }
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
