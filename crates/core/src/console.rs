//! Operator I/O abstraction used by prompting and command actions.
//!
//! The terminal implementation lives in the CLI crate; anything that can
//! replay lines and keys (tests, scripted sessions) can stand in for it.

use crate::error::Result;

/// A single keypress, reduced to what the prompt engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Backspace,
    Char(char),
    /// Operator interrupt (Ctrl+C).
    Cancel,
    Other,
}

pub trait Console {
    /// Writes text as-is, without a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be written.
    fn print(&mut self, text: &str) -> Result<()>;

    /// Reads one line of input without its line terminator.
    ///
    /// Returns `None` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the input stream cannot be read.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Waits for a single keypress.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched into raw mode or
    /// the key event cannot be read.
    fn read_key(&mut self) -> Result<Key>;

    /// Writes text followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be written.
    fn println(&mut self, text: &str) -> Result<()> {
        self.print(text)?;
        self.print("\n")
    }

    /// Starts a keypress session: until [`Console::leave_raw_mode`], input
    /// is not echoed or line-buffered by the terminal.
    ///
    /// Consoles that never echo keep the default no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched into raw mode.
    fn enter_raw_mode(&mut self) -> Result<()> {
        Ok(())
    }

    /// Ends the session started by [`Console::enter_raw_mode`].
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be restored.
    fn leave_raw_mode(&mut self) -> Result<()> {
        Ok(())
    }

    /// Moves back over the last `lines` printed lines and clears them, so a
    /// block can be redrawn in place.
    ///
    /// Consoles without cursor control keep the old lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be written.
    fn rewind(&mut self, _lines: u16) -> Result<()> {
        Ok(())
    }
}
