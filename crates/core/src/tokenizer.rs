//! Conversion of residual tokens into validated parameter values.

use indexmap::IndexSet;
use log::{debug, warn};

use crate::command_definitions::{CommandNode, ParamValues};
use crate::error::{Error, Result};
use crate::resolver::{is_flag, FLAG_PREFIX};

/// Flags parsed from the command line for one command.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedFlags {
    /// Validated values of the flags that carried one.
    pub values: ParamValues,
    /// Every recognised flag name seen, including ones without a value.
    pub supplied: IndexSet<String>,
}

/// Parses `--key=value`, `--key value` and bare `--key` tokens.
///
/// `--key=value` splits on the first `=`. Without `=`, the next token is the
/// value unless it is itself a flag, in which case the value is absent. Each
/// recognised flag is validated straight away against the command's own
/// parameter list. Stray tokens that are not flag values are ignored.
///
/// # Errors
///
/// Returns [`Error::UnknownParameter`] for the first flag the command does
/// not declare, or the validator's error for the first invalid value.
pub fn tokenize(residual: &[String], command: &CommandNode) -> Result<ParsedFlags> {
    let mut parsed = ParsedFlags::default();
    let mut tokens = residual.iter().peekable();

    while let Some(token) = tokens.next() {
        let Some(flag) = token.strip_prefix(FLAG_PREFIX) else {
            warn!("Ignoring unexpected argument `{token}` for `{}`", command.name);
            continue;
        };

        let (key, value) = match flag.split_once('=') {
            Some((key, value)) => (key, Some(value.to_string())),
            None => {
                let value = tokens.next_if(|next| !is_flag(next)).cloned();
                (flag, value)
            }
        };

        let Some(param) = command.find_param(key) else {
            return Err(Error::UnknownParameter {
                name: key.to_string(),
                available: command.params.iter().map(|p| p.name.clone()).collect(),
            });
        };

        debug!("Parsed flag `{key}` for `{}`", command.name);
        parsed.supplied.insert(key.to_string());
        if let Some(value) = param.validate(value.as_deref())? {
            parsed.values.insert(key.to_string(), value);
        }
    }

    Ok(parsed)
}
