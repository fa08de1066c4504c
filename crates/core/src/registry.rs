//! The command tree a tool is built from, validated as it is assembled.

use std::collections::HashSet;

use crate::command_definitions::{CommandNode, ParamSpec, ParamType};
use crate::error::Error::{
    EmptyId, IdWithFlagPrefix, IdWithSpace, ListWithoutOptions, NonUniqueCommandId,
    NonUniqueParameterId,
};
use crate::error::Result;

/// Owned forest of top-level commands.
///
/// Each tool instance builds its own registry, so several independent tools
/// can live in one process.
#[derive(Debug, Default)]
pub struct Registry {
    commands: Vec<CommandNode>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level command after validating it and all of its subcommands.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty, contains whitespace or starts with
    /// `-`, if sibling commands or a command's parameters share a name, or if
    /// a list parameter declares no options.
    pub fn add(&mut self, command: CommandNode) -> Result<()> {
        validate_command(&command)?;

        if self.find(&command.name).is_some() {
            return Err(NonUniqueCommandId(command.name));
        }

        self.commands.push(command);
        Ok(())
    }

    #[must_use]
    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CommandNode> {
        self.commands.iter().find(|cmd| cmd.name == name)
    }

    /// Top-level command names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.commands.iter().map(|cmd| cmd.name.clone()).collect()
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(EmptyId);
    }

    if id.chars().any(char::is_whitespace) {
        return Err(IdWithSpace(id.to_string()));
    }

    if id.starts_with('-') {
        return Err(IdWithFlagPrefix(id.to_string()));
    }

    Ok(())
}

/// Checks a parameter list the way [`Registry::add`] checks each command's.
///
/// `owner` names the command or setup the parameters belong to in errors.
///
/// # Errors
///
/// Returns an error if a name is empty, contains whitespace or starts with
/// `-`, if two parameters share a name, or if a list parameter declares no
/// options.
pub fn validate_parameters(owner: &str, parameters: &[ParamSpec]) -> Result<()> {
    let mut names = HashSet::new();
    for parameter in parameters {
        validate_id(&parameter.name)?;

        if !names.insert(parameter.name.as_str()) {
            return Err(NonUniqueParameterId(
                owner.to_string(),
                parameter.name.clone(),
            ));
        }

        let has_options = parameter
            .options
            .as_ref()
            .is_some_and(|options| !options.is_empty());
        if parameter.kind == ParamType::List && !has_options {
            return Err(ListWithoutOptions(
                owner.to_string(),
                parameter.name.clone(),
            ));
        }
    }

    Ok(())
}

fn validate_command(command: &CommandNode) -> Result<()> {
    validate_id(&command.name)?;
    validate_parameters(&command.name, &command.params)?;

    let mut names = HashSet::new();
    for subcommand in &command.subcommands {
        if !names.insert(subcommand.name.as_str()) {
            return Err(NonUniqueCommandId(format!(
                "{} {}",
                command.name, subcommand.name
            )));
        }
        validate_command(subcommand)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn param(name: &str) -> ParamSpec {
        ParamSpec::new(name, "", ParamType::Text)
    }

    #[test]
    fn test_validate_id_valid() {
        assert!(validate_id("deploy").is_ok());
        assert!(validate_id("rotate-passphrase").is_ok());
        assert!(validate_id("config_file").is_ok());
        assert!(validate_id("123").is_ok());
    }

    #[test]
    fn test_validate_id_invalid() {
        assert!(matches!(validate_id(""), Err(EmptyId)));
        assert!(matches!(validate_id("has space"), Err(IdWithSpace(_))));
        assert!(matches!(validate_id("tab\tbed"), Err(IdWithSpace(_))));
        assert!(matches!(validate_id("--flag"), Err(IdWithFlagPrefix(_))));
    }

    #[test]
    fn test_add_rejects_duplicate_top_level() {
        let mut registry = Registry::new();
        registry.add(CommandNode::new("deploy", "")).unwrap();
        let result = registry.add(CommandNode::new("deploy", "again"));
        assert!(matches!(result, Err(Error::NonUniqueCommandId(_))));
        assert_eq!(registry.commands().len(), 1);
    }

    #[test]
    fn test_add_rejects_duplicate_siblings() {
        let command = CommandNode::new("project", "")
            .subcommand(CommandNode::new("create", ""))
            .subcommand(CommandNode::new("create", ""));
        let result = Registry::new().add(command);
        assert!(matches!(result, Err(Error::NonUniqueCommandId(ref n)) if n == "project create"));
    }

    #[test]
    fn test_add_rejects_duplicate_parameters() {
        let command = CommandNode::new("deploy", "")
            .param(param("env"))
            .param(param("env"));
        let result = Registry::new().add(command);
        assert!(matches!(result, Err(Error::NonUniqueParameterId(_, _))));
    }

    #[test]
    fn test_same_parameter_name_on_different_commands_is_fine() {
        let command = CommandNode::new("deploy", "")
            .param(param("env"))
            .subcommand(CommandNode::new("staging", "").param(param("env")));
        assert!(Registry::new().add(command).is_ok());
    }

    #[test]
    fn test_add_rejects_list_without_options() {
        let command = CommandNode::new("deploy", "")
            .param(ParamSpec::new("region", "", ParamType::List));
        let result = Registry::new().add(command);
        assert!(matches!(result, Err(Error::ListWithoutOptions(_, _))));

        let command = CommandNode::new("deploy", "").param(
            ParamSpec::new("region", "", ParamType::List).options(Vec::<String>::new()),
        );
        assert!(Registry::new().add(command).is_err());
    }

    #[test]
    fn test_validate_parameters_names_owner() {
        let params = vec![param("token"), ParamSpec::new("token", "", ParamType::Password)];
        assert!(matches!(
            validate_parameters("setup", &params),
            Err(NonUniqueParameterId(ref owner, ref name)) if owner == "setup" && name == "token"
        ));
        assert!(validate_parameters("setup", &[param("token"), param("region")]).is_ok());
    }

    #[test]
    fn test_names_in_registration_order() {
        let mut registry = Registry::new();
        registry.add(CommandNode::new("status", "")).unwrap();
        registry.add(CommandNode::new("deploy", "")).unwrap();
        assert_eq!(registry.names(), vec!["status", "deploy"]);
    }

    #[test]
    fn test_nested_names_are_validated() {
        let command = CommandNode::new("project", "").subcommand(CommandNode::new("bad name", ""));
        assert!(matches!(
            Registry::new().add(command),
            Err(Error::IdWithSpace(_))
        ));
    }
}
