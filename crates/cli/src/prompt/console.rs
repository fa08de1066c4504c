//! Console backed by the process's terminal.

use std::borrow::Cow;
use std::io::{stdin, stdout, BufRead, StdinLock, StdoutLock, Write};

use crossterm::cursor::MoveToPreviousLine;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use cliforge_core::console::{Console, Key};
use cliforge_core::error::Result;

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Reads lines from stdin and single keys from the terminal, writes to stdout.
///
/// Both streams are locked for the lifetime of the console. Raw mode stays on
/// for a whole keypress session and is restored when the session ends, the
/// console is dropped, or the thread unwinds.
pub struct TerminalConsole {
    stdin: StdinLock<'static>,
    stdout: StdoutLock<'static>,
    raw_mode: Option<RawModeGuard>,
}

impl TerminalConsole {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdin: stdin().lock(),
            stdout: stdout().lock(),
            raw_mode: None,
        }
    }

    fn next_key_press() -> Result<Key> {
        loop {
            if let Event::Key(key_event) = event::read()? {
                // Some platforms also report releases and repeats
                if key_event.kind == KeyEventKind::Press {
                    return Ok(map_key(key_event));
                }
            }
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn print(&mut self, text: &str) -> Result<()> {
        let text = if self.raw_mode.is_some() {
            raw_line_endings(text)
        } else {
            Cow::Borrowed(text)
        };
        self.stdout.write_all(text.as_bytes())?;
        self.stdout.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        if self.stdin.read_line(&mut input)? == 0 {
            return Ok(None);
        }

        let line = input.trim_end_matches(&['\n', '\r'][..]);
        Ok(Some(line.to_string()))
    }

    fn read_key(&mut self) -> Result<Key> {
        self.stdout.flush()?;
        if self.raw_mode.is_some() {
            return Self::next_key_press();
        }

        // A lone key outside a session still must not echo
        let _raw_mode_guard = RawModeGuard::enable()?;
        Self::next_key_press()
    }

    fn enter_raw_mode(&mut self) -> Result<()> {
        if self.raw_mode.is_none() {
            self.stdout.flush()?;
            self.raw_mode = Some(RawModeGuard::enable()?);
        }
        Ok(())
    }

    fn leave_raw_mode(&mut self) -> Result<()> {
        if self.raw_mode.take().is_some() {
            self.stdout.flush()?;
        }
        Ok(())
    }

    fn rewind(&mut self, lines: u16) -> Result<()> {
        if lines == 0 {
            return Ok(());
        }

        queue!(
            self.stdout,
            MoveToPreviousLine(lines),
            Clear(ClearType::FromCursorDown)
        )?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Raw mode does not return the carriage on `\n`.
fn raw_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\n') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\n', "\r\n"))
    } else {
        Cow::Borrowed(text)
    }
}

fn map_key(key_event: KeyEvent) -> Key {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') => Key::Cancel,
            // End of input finishes the current entry
            KeyCode::Char('d') => Key::Enter,
            _ => Key::Other,
        };
    }

    match key_event.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}
