//! Resolution of an argument vector to the deepest matching command.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::debug;

use crate::command_definitions::CommandNode;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// Prefix that marks a token as a flag rather than a command name.
pub const FLAG_PREFIX: &str = "--";
pub const HELP_FLAG: &str = "--help";
pub const VERSION_FLAG: &str = "--version";

#[must_use]
pub fn is_flag(token: &str) -> bool {
    token.starts_with(FLAG_PREFIX)
}

/// The command an argument vector resolved to.
#[derive(Debug)]
pub struct Resolution<'r, 'a> {
    pub command: &'r CommandNode,
    /// Names consumed from the argument vector, top-level first.
    pub path: Vec<String>,
    /// Everything after the command path, handed to the tokenizer.
    pub residual: &'a [String],
}

impl Resolution<'_, '_> {
    /// Whether `--help` appears anywhere after the command path.
    #[must_use]
    pub fn wants_help(&self) -> bool {
        self.residual.iter().any(|token| token == HELP_FLAG)
    }

    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.join(" ")
    }
}

impl Registry {
    /// Finds the longest command path matching the start of `args`.
    ///
    /// The first token has to name a top-level command. Each following
    /// token extends the path while it names a subcommand of the last
    /// matched node; the first one that does not is backed out of the path
    /// and left, with everything after it, as residual input. Path building
    /// also stops at the first flag, when the matched node has no
    /// subcommands, or when tokens run out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCommand`] for an empty vector and
    /// [`Error::UnknownCommand`] when the first token is not a top-level
    /// command.
    pub fn resolve<'r, 'a>(&'r self, args: &'a [String]) -> Result<Resolution<'r, 'a>> {
        let Some(first) = args.first() else {
            return Err(Error::NoCommand);
        };

        let mut command = match self.find(first) {
            Some(command) if !is_flag(first) => command,
            _ => return Err(self.unknown_command(first)),
        };

        let mut path = vec![first.clone()];
        let mut cursor = 1;

        while let Some(token) = args.get(cursor) {
            if is_flag(token) || !command.has_subcommands() {
                break;
            }

            path.push(token.clone());
            match command.find_subcommand(token) {
                Some(subcommand) => {
                    command = subcommand;
                    cursor += 1;
                }
                None => {
                    path.pop();
                    debug!(
                        "`{token}` is not a subcommand of `{}`, treating it as an argument",
                        path.join(" ")
                    );
                    break;
                }
            }
        }

        debug!("Resolved command path: `{}`", path.join(" "));

        Ok(Resolution {
            command,
            path,
            residual: &args[cursor..],
        })
    }

    fn unknown_command(&self, name: &str) -> Error {
        let matcher = SkimMatcherV2::default();
        let suggestion = self
            .commands()
            .iter()
            .filter_map(|cmd| {
                matcher
                    .fuzzy_match(&cmd.name, name)
                    .map(|score| (score, &cmd.name))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, name)| name.clone());

        Error::UnknownCommand {
            name: name.to_string(),
            available: self.names(),
            suggestion,
        }
    }
}
