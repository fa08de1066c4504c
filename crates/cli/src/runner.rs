//! Top-level entry point tying resolution, prompting and actions together.

use std::process::ExitCode;

use itertools::Itertools;
use log::{debug, info};

use cliforge_core::command_definitions::CommandNode;
use cliforge_core::console::Console;
use cliforge_core::error::{Error, Result};
use cliforge_core::registry::Registry;
use cliforge_core::resolver::{HELP_FLAG, VERSION_FLAG};
use cliforge_core::tokenizer::tokenize;

use crate::help::{HelpRenderer, PlainHelp};
use crate::prompt::{Prompter, TerminalConsole};

/// Behaviour switches for a [`Cli`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    /// Prompt for missing parameters instead of failing.
    pub interactive: bool,
    /// Printed for `--version`.
    pub version: String,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            interactive: true,
            version: "1.0.0".to_string(),
        }
    }
}

/// What a call to [`Cli::execute`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Help,
    Version,
    /// The action of the command at this path ran.
    Executed(Vec<String>),
}

pub struct Cli {
    name: String,
    description: String,
    options: CliOptions,
    registry: Registry,
    help: Box<dyn HelpRenderer>,
}

impl Cli {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: CliOptions::default(),
            registry: Registry::new(),
            help: Box::new(PlainHelp),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: CliOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl HelpRenderer + 'static) -> Self {
        self.help = Box::new(help);
        self
    }

    /// Registers a top-level command.
    ///
    /// # Errors
    ///
    /// Returns the registry's validation error if the command tree is invalid
    /// or its name is already taken.
    pub fn command(&mut self, command: CommandNode) -> Result<&mut Self> {
        self.registry.add(command)?;
        Ok(self)
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> &CliOptions {
        &self.options
    }

    /// Runs one invocation against `console`.
    ///
    /// `args` excludes the program name. Any flag on the command line turns
    /// prompting off for this invocation, so a scripted call with a missing
    /// parameter fails instead of waiting for input.
    ///
    /// # Errors
    ///
    /// Returns resolution, tokenizing and validation errors,
    /// [`Error::NotInvocable`] for a command without an action,
    /// [`Error::MissingParameters`] when prompting is off, and whatever the
    /// prompts or the action return.
    pub fn execute(&self, args: &[String], console: &mut dyn Console) -> Result<Outcome> {
        match args {
            [] => {
                self.print_global_help(console)?;
                return Ok(Outcome::Help);
            }
            [first, ..] if first == VERSION_FLAG => {
                console.println(&format!("{} version: {}", self.name, self.options.version))?;
                return Ok(Outcome::Version);
            }
            [only] if only == HELP_FLAG => {
                self.print_global_help(console)?;
                return Ok(Outcome::Help);
            }
            _ => {}
        }

        let resolution = self.registry.resolve(args)?;
        let command = resolution.command;

        if resolution.wants_help() {
            console.print(&self.help.command_help(&self.name, command, &resolution.path))?;
            return Ok(Outcome::Help);
        }

        let Some(action) = command.action.as_ref() else {
            return Err(Error::NotInvocable(resolution.path_string()));
        };

        let flags = tokenize(resolution.residual, command)?;
        let interactive = self.options.interactive && flags.supplied.is_empty();
        let mut values = flags.values;

        let missing = command.missing_required(&values);
        if !missing.is_empty() {
            if !interactive {
                return Err(Error::MissingParameters {
                    missing: missing.iter().map(|param| param.name.clone()).collect(),
                    optional: command
                        .unset_optional(&values)
                        .iter()
                        .map(|param| param.name.clone())
                        .collect(),
                });
            }

            debug!(
                "Prompting for `{}`: missing {}",
                resolution.path_string(),
                missing.iter().map(|param| &param.name).join(", ")
            );
            values = Prompter::new(console).collect(&command.params, values)?;
        }

        info!("Running `{}`", resolution.path_string());
        action(&values, console)?;

        Ok(Outcome::Executed(resolution.path))
    }

    /// Runs one invocation on the terminal and maps the result to an exit code.
    ///
    /// Errors are printed to stderr and exit with 1. Cancelling a prompt is
    /// not a failure and exits with 0.
    pub fn run(&self, args: &[String]) -> ExitCode {
        let mut console = TerminalConsole::new();

        match self.execute(args, &mut console) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) if e.is_cancellation() => {
                eprintln!("\n{e}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                if let Some(hint) = self.help_hint(args, &e) {
                    eprintln!("{hint}");
                }
                ExitCode::FAILURE
            }
        }
    }

    /// [`Cli::run`] with the process's own arguments.
    pub fn run_from_env(&self) -> ExitCode {
        let args = std::env::args().skip(1).collect_vec();
        self.run(&args)
    }

    fn print_global_help(&self, console: &mut dyn Console) -> Result<()> {
        let commands = self.registry.commands();
        console.print(&self.help.global_help(&self.name, &self.description, commands))
    }

    fn help_hint(&self, args: &[String], error: &Error) -> Option<String> {
        match error {
            Error::UnknownCommand { .. } | Error::NoCommand => {
                Some(format!("Try '{} --help' for more information.", self.name))
            }
            Error::UnknownParameter { .. }
            | Error::MissingParameters { .. }
            | Error::NotInvocable(_) => {
                let path = self.registry.resolve(args).ok()?.path_string();
                Some(format!(
                    "Try '{} {path} --help' for more information.",
                    self.name
                ))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedConsole;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    fn cli() -> Cli {
        let mut cli = Cli::new("tool", "Test tool");
        cli.command(
            CommandNode::new("status", "Show status").action(|_, console| console.println("ok")),
        )
        .unwrap()
        .command(CommandNode::new("group", "Only subcommands").subcommand(
            CommandNode::new("leaf", "Leaf").action(|_, _| Ok(())),
        ))
        .unwrap();
        cli
    }

    #[test]
    fn test_no_args_prints_global_help() {
        let mut console = ScriptedConsole::new();
        assert_eq!(cli().execute(&[], &mut console).unwrap(), Outcome::Help);
        assert!(console.output().contains("COMMANDS"));
    }

    #[test]
    fn test_version_flag() {
        let mut console = ScriptedConsole::new();
        let outcome = cli().execute(&args(&["--version", "x"]), &mut console).unwrap();
        assert_eq!(outcome, Outcome::Version);
        assert_eq!(console.output(), "tool version: 1.0.0\n");
    }

    #[test]
    fn test_lone_help_flag() {
        let mut console = ScriptedConsole::new();
        let outcome = cli().execute(&args(&["--help"]), &mut console).unwrap();
        assert_eq!(outcome, Outcome::Help);
    }

    #[test]
    fn test_runs_action() {
        let mut console = ScriptedConsole::new();
        let outcome = cli().execute(&args(&["status"]), &mut console).unwrap();
        assert_eq!(outcome, Outcome::Executed(vec!["status".to_string()]));
        assert_eq!(console.output(), "ok\n");
    }

    #[test]
    fn test_group_without_action_is_not_invocable() {
        let mut console = ScriptedConsole::new();
        let result = cli().execute(&args(&["group"]), &mut console);
        assert!(matches!(result, Err(Error::NotInvocable(ref p)) if p == "group"));
    }

    #[test]
    fn test_help_hint_for_unknown_parameter() {
        let cli = cli();
        let args = args(&["group", "leaf", "--nope"]);
        let error = cli.execute(&args, &mut ScriptedConsole::new()).unwrap_err();
        assert_eq!(
            cli.help_hint(&args, &error),
            Some("Try 'tool group leaf --help' for more information.".to_string())
        );
    }
}
