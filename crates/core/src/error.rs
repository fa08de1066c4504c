use itertools::Itertools;
use thiserror::Error;

use crate::command_definitions::ParamType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No command given.")]
    NoCommand,

    #[error("Unknown command: `{}`.{}{}", .name, suggestion_hint(.suggestion), available_hint("commands", .available))]
    UnknownCommand {
        name: String,
        available: Vec<String>,
        suggestion: Option<String>,
    },

    #[error("Command `{}` cannot be run directly; choose one of its subcommands.", .0)]
    NotInvocable(String),

    #[error("Unknown parameter: `{}`.{}", .name, available_hint("parameters", .available))]
    UnknownParameter { name: String, available: Vec<String> },

    #[error("Missing required parameter{}", name_hint(.0))]
    MissingParameter(Option<String>),

    #[error("Missing required parameters: {}.{}", .missing.join(", "), available_hint("optional parameters", .optional))]
    MissingParameters {
        missing: Vec<String>,
        optional: Vec<String>,
    },

    #[error("Invalid {}{}: `{}` (expected {})", .kind, name_hint(.name), .value, .expected)]
    InvalidValue {
        name: Option<String>,
        kind: ParamType,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid option{}: `{}` (expected one of: {})", name_hint(.name), .value, .options.join(", "))]
    InvalidChoice {
        name: Option<String>,
        value: String,
        options: Vec<String>,
    },

    #[error("No options configured for list parameter{}", name_hint(.0))]
    EmptyListOptions(Option<String>),

    #[error("Invalid name: names may not be empty")]
    EmptyId,

    #[error("Invalid name `{}`: names may not contain whitespace", .0)]
    IdWithSpace(String),

    #[error("Invalid name `{}`: names may not start with `-`", .0)]
    IdWithFlagPrefix(String),

    #[error("Found a non-unique command name: `{}`", .0)]
    NonUniqueCommandId(String),

    #[error("Found a non-unique parameter name on command {}: `{}`", .0, .1)]
    NonUniqueParameterId(String, String),

    #[error("List parameter `{}` on command {} declares no options", .1, .0)]
    ListWithoutOptions(String, String),

    #[error("Cancelled by user.")]
    Cancelled,

    #[error("Input was closed before a value was provided.")]
    InputClosed,

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error {} config file at `{}`: {}", .action, .path, .original)]
    Json {
        action: String,
        path: String,
        original: serde_json::Error,
    },

    #[error("Config file not found: `{}`. Run the setup command first.", .0)]
    ConfigNotFound(String),

    #[error("No secret fields found in config file `{}`.", .0)]
    NoSecretFields(String),

    #[error("A passphrase is required.")]
    PassphraseRequired,

    #[error("New passphrase is the same as the current passphrase.")]
    SamePassphrase,

    #[error("Passphrases do not match.")]
    PassphraseMismatch,

    #[error("Unable to decrypt `{}`: wrong passphrase or tampered data.", .0)]
    WrongPassphrase(String),

    #[error("Secret field `{}` is corrupted: {}", .0, .1)]
    CorruptEnvelope(String, String),

    #[error("Encryption failed: {}", .0)]
    Encryption(String),
}

fn name_hint(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" `{name}`"),
        None => String::new(),
    }
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(suggestion) => format!(" Did you mean `{suggestion}`?"),
        None => String::new(),
    }
}

fn available_hint(what: &str, available: &[String]) -> String {
    if available.is_empty() {
        return String::new();
    }

    format!(" Available {what}: {}", available.iter().join(", "))
}

impl Error {
    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    pub fn json_error(action: String, path: String, original: serde_json::Error) -> Self {
        Self::Json {
            action,
            path,
            original,
        }
    }

    pub fn invalid_value(
        name: Option<&str>,
        kind: ParamType,
        value: &str,
        expected: &'static str,
    ) -> Self {
        Self::InvalidValue {
            name: name.map(str::to_string),
            kind,
            value: value.to_string(),
            expected,
        }
    }

    /// Whether the error is the operator cancelling an interactive prompt.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
