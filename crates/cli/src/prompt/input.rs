use itertools::Itertools;
use log::debug;

use cliforge_core::command_definitions::{ParamSpec, ParamType, ParamValues, Value};
use cliforge_core::console::{Console, Key};
use cliforge_core::error::{Error, Result};

use super::types::{Announcement, CycleDirection, ListState};

const REQUIRED_PROMPT: &str = "Enter value (required): ";
const OPTIONAL_PROMPT: &str = "Enter value (or press Enter to skip): ";
const RETRY_NOTICE: &str = "Please try again:";
const MASK: &str = "*";
const ERASE: &str = "\u{8} \u{8}";

/// Asks the operator for parameter values over a [`Console`].
pub struct Prompter<'c> {
    console: &'c mut dyn Console,
}

impl<'c> Prompter<'c> {
    pub fn new(console: &'c mut dyn Console) -> Self {
        Self { console }
    }

    /// Prompts for every parameter in `params` that `existing` lacks.
    ///
    /// Parameters are visited strictly in declared order. List parameters
    /// use the arrow-key selector; everything else is asked for until the
    /// answer validates. An empty answer to an optional parameter skips it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the operator interrupts, and
    /// [`Error::InputClosed`] if input runs out before all answers are in.
    pub fn collect(&mut self, params: &[ParamSpec], existing: ParamValues) -> Result<ParamValues> {
        let mut values = existing;
        let pending = params
            .iter()
            .filter(|param| !values.contains_key(&param.name))
            .collect_vec();

        if pending.is_empty() {
            return Ok(values);
        }

        self.console.println("")?;
        self.console
            .println("INTERACTIVE MODE: Please provide the following information:")?;
        self.console.println("")?;

        for param in pending {
            self.print_param_header(param)?;

            let (value, announcement) = if param.kind == ParamType::List {
                let option = self.choose_option(param)?;
                (Some(Value::Text(option.clone())), Announcement::Selected(option))
            } else {
                self.ask_until_valid(param)?
            };

            self.console.println(&announcement.to_string())?;
            self.console.println("")?;
            debug!("Prompted for `{}`: {announcement:?}", param.name);

            if let Some(value) = value {
                values.insert(param.name.clone(), value);
            }
        }

        self.console.println("✅ All parameters collected successfully!")?;
        Ok(values)
    }

    /// Prints `prompt` and reads one line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] if input has ended.
    pub fn ask_line(&mut self, prompt: &str) -> Result<String> {
        self.console.print(prompt)?;
        self.console.read_line()?.ok_or(Error::InputClosed)
    }

    /// Prints `prompt` and reads a value key by key, echoing `*` per character.
    ///
    /// Only printable ASCII is accepted. Backspace removes the last
    /// character, Enter finishes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the operator interrupts.
    pub fn ask_masked(&mut self, prompt: &str) -> Result<String> {
        self.console.print(prompt)?;
        self.in_raw_mode(|prompter| {
            let mut buffer = String::new();

            loop {
                match prompter.console.read_key()? {
                    Key::Enter => {
                        prompter.console.println("")?;
                        return Ok(buffer);
                    }
                    Key::Cancel => {
                        prompter.console.println("")?;
                        return Err(Error::Cancelled);
                    }
                    Key::Backspace => {
                        if buffer.pop().is_some() {
                            prompter.console.print(ERASE)?;
                        }
                    }
                    Key::Char(c) if (' '..='~').contains(&c) => {
                        buffer.push(c);
                        prompter.console.print(MASK)?;
                    }
                    _ => {}
                }
            }
        })
    }

    /// Lets the operator pick one of `options` with the arrow keys.
    ///
    /// Up and Down wrap around at either end. Returns the confirmed index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyListOptions`] when there is nothing to choose
    /// from and [`Error::Cancelled`] if the operator interrupts.
    pub fn select(&mut self, label: &str, options: &[String], initial: usize) -> Result<usize> {
        if options.is_empty() {
            return Err(Error::EmptyListOptions(Some(label.to_string())));
        }

        self.in_raw_mode(|prompter| {
            let mut state = ListState::new(options.len(), initial);
            let drawn = prompter.render_options(label, options, &state)?;

            loop {
                let direction = match prompter.console.read_key()? {
                    Key::Up => CycleDirection::Up,
                    Key::Down => CycleDirection::Down,
                    Key::Enter => return Ok(state.selected_index),
                    Key::Cancel => return Err(Error::Cancelled),
                    _ => continue,
                };

                state = state.move_selected_index(direction);
                prompter.console.rewind(drawn)?;
                prompter.render_options(label, options, &state)?;
            }
        })
    }

    /// Runs `session` with the console in raw mode, leaving it on every path.
    fn in_raw_mode<T>(&mut self, session: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.console.enter_raw_mode()?;
        let result = session(self);
        let restored = self.console.leave_raw_mode();
        let value = result?;
        restored?;
        Ok(value)
    }

    fn choose_option(&mut self, param: &ParamSpec) -> Result<String> {
        let options = match param.options.as_deref() {
            Some(options) if !options.is_empty() => options,
            _ => return Err(Error::EmptyListOptions(Some(param.name.clone()))),
        };

        self.console
            .println("Use ↑/↓ arrow keys to navigate, Enter to select:")?;
        let index = self.select(&param.name, options, 0)?;
        Ok(options[index].clone())
    }

    fn ask_until_valid(&mut self, param: &ParamSpec) -> Result<(Option<Value>, Announcement)> {
        let prompt = if param.required {
            REQUIRED_PROMPT
        } else {
            OPTIONAL_PROMPT
        };

        let mut attempts = 0;
        loop {
            if attempts > 0 {
                self.console.println(RETRY_NOTICE)?;
            }

            let answer = if param.kind == ParamType::Password {
                self.ask_masked(prompt)?
            } else {
                self.ask_line(prompt)?
            };

            match param.validate(Some(&answer)) {
                Ok(Some(value)) => return Ok((Some(value), Announcement::Accepted)),
                Ok(None) => return Ok((None, Announcement::Skipped)),
                Err(e) => {
                    self.console.println(&e.to_string())?;
                    attempts += 1;
                }
            }
        }
    }

    fn print_param_header(&mut self, param: &ParamSpec) -> Result<()> {
        let indicator = if param.required { "*" } else { "○" };
        self.console
            .println(&format!("{indicator} {} ({})", param.name, param.kind))?;

        if !param.description.is_empty() {
            self.console.println(&format!("  {}", param.description))?;
        }

        if let Some(options) = param.options.as_ref().filter(|options| !options.is_empty()) {
            self.console
                .println(&format!("  Options: {}", options.iter().join(", ")))?;
        }

        self.console.println("")
    }

    /// Draws the selector and returns how many lines it took.
    fn render_options(&mut self, label: &str, options: &[String], state: &ListState) -> Result<u16> {
        self.console.println(&format!("SELECT OPTION for {label}"))?;

        for (i, option) in options.iter().enumerate() {
            if i == state.selected_index {
                self.console
                    .println(&format!("❯ {option}  ← Current selection"))?;
            } else {
                self.console.println(&format!("  {option}"))?;
            }
        }

        self.console
            .println("Use ↑/↓ to navigate, Enter to confirm, Ctrl+C to cancel")?;

        Ok(u16::try_from(options.len() + 2).unwrap_or(u16::MAX))
    }
}
