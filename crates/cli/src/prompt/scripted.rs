//! Console that replays prepared input and records everything printed.

use std::collections::VecDeque;

use cliforge_core::console::{Console, Key};
use cliforge_core::error::{Error, Result};

/// Plays back fixed lines and keys instead of reading a terminal.
///
/// Lines and keys are consumed independently, each in the order given.
/// Running out of keys reads as closed input. Raw mode is tracked so tests
/// can check that keys were only read inside a keypress session.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    lines: VecDeque<String>,
    keys: VecDeque<Key>,
    output: String,
    raw_mode: bool,
    keys_outside_raw_mode: usize,
}

impl ScriptedConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push_back(line.into());
        self
    }

    #[must_use]
    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn key(mut self, key: Key) -> Self {
        self.keys.push_back(key);
        self
    }

    #[must_use]
    pub fn keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Queues `text` as individual keypresses followed by Enter.
    #[must_use]
    pub fn typed(mut self, text: &str) -> Self {
        self.keys.extend(text.chars().map(Key::Char));
        self.keys.push_back(Key::Enter);
        self
    }

    /// Everything printed so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn in_raw_mode(&self) -> bool {
        self.raw_mode
    }

    /// Keys read while raw mode was off.
    #[must_use]
    pub fn keys_outside_raw_mode(&self) -> usize {
        self.keys_outside_raw_mode
    }

    /// Whether every queued line and key has been read.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.lines.is_empty() && self.keys.is_empty()
    }
}

impl Console for ScriptedConsole {
    fn print(&mut self, text: &str) -> Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn read_key(&mut self) -> Result<Key> {
        if !self.raw_mode {
            self.keys_outside_raw_mode += 1;
        }
        self.keys.pop_front().ok_or(Error::InputClosed)
    }

    fn enter_raw_mode(&mut self) -> Result<()> {
        self.raw_mode = true;
        Ok(())
    }

    fn leave_raw_mode(&mut self) -> Result<()> {
        self.raw_mode = false;
        Ok(())
    }
}
