//! Integration tests for cliforge-core
//!
//! These tests verify that the core functionality works together correctly
//! by testing complete workflows end-to-end.

use cliforge_core::{
    command_definitions::{CommandNode, ParamSpec, ParamType, ParamValues, Value},
    error::Error,
    registry::Registry,
    store::ConfigStore,
    tokenizer::tokenize,
};
use std::fs;
use tempfile::TempDir;

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .add(
            CommandNode::new("deploy", "Deploy the service")
                .param(ParamSpec::new("flag", "Generic flag", ParamType::Text))
                .subcommand(
                    CommandNode::new("staging", "Deploy to staging")
                        .param(
                            ParamSpec::new("version", "Release to deploy", ParamType::Text)
                                .required(),
                        )
                        .param(ParamSpec::new("force", "Skip checks", ParamType::Boolean).required()),
                ),
        )
        .unwrap();
    registry
        .add(
            CommandNode::new("init", "Create a project")
                .param(ParamSpec::new("name", "Project name", ParamType::Text).required())
                .param(
                    ParamSpec::new("template", "Starter template", ParamType::List)
                        .required()
                        .options(["basic", "advanced"]),
                ),
        )
        .unwrap();
    registry
}

/// Nested resolution followed by flag parsing
#[test]
fn test_nested_command_with_equals_flag() {
    let registry = registry();
    let args = args(&["deploy", "staging", "--version=1.0.0", "--force=true"]);

    let resolution = registry.resolve(&args).unwrap();
    assert_eq!(resolution.path, vec!["deploy", "staging"]);

    let flags = tokenize(resolution.residual, resolution.command).unwrap();
    assert_eq!(flags.values["version"], Value::from("1.0.0"));
    assert_eq!(flags.values["force"], Value::Boolean(true));
    assert!(resolution.command.missing_required(&flags.values).is_empty());
}

/// An unknown subcommand falls back to the parent and is ignored as a stray token
#[test]
fn test_backtracked_token_goes_to_parent() {
    let registry = registry();
    let args = args(&["deploy", "unknown", "--flag", "x"]);

    let resolution = registry.resolve(&args).unwrap();
    assert_eq!(resolution.command.name, "deploy");

    let flags = tokenize(resolution.residual, resolution.command).unwrap();
    assert_eq!(flags.values.len(), 1);
    assert_eq!(flags.values["flag"], Value::from("x"));
}

/// A bare required boolean is a missing value, never `false`
#[test]
fn test_bare_required_boolean() {
    let registry = registry();
    let args = args(&["deploy", "staging", "--version", "1", "--force"]);

    let resolution = registry.resolve(&args).unwrap();
    let result = tokenize(resolution.residual, resolution.command);
    assert!(matches!(result, Err(Error::MissingParameter(Some(ref n))) if n == "force"));
}

/// Missing required parameters are detectable after tokenizing
#[test]
fn test_missing_required_after_tokenize() {
    let registry = registry();
    let args = args(&["init", "--template=basic"]);

    let resolution = registry.resolve(&args).unwrap();
    let flags = tokenize(resolution.residual, resolution.command).unwrap();
    let missing: Vec<_> = resolution
        .command
        .missing_required(&flags.values)
        .into_iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(missing, vec!["name"]);
}

/// List values outside the declared options are rejected while tokenizing
#[test]
fn test_invalid_list_choice() {
    let registry = registry();
    let args = args(&["init", "--template", "fancy"]);

    let resolution = registry.resolve(&args).unwrap();
    let result = tokenize(resolution.residual, resolution.command);
    assert!(matches!(result, Err(Error::InvalidChoice { .. })));
}

fn steps() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new("api_key", "API key", ParamType::Password).required(),
        ParamSpec::new("region", "Region", ParamType::Text),
    ]
}

fn answers() -> ParamValues {
    let mut answers = ParamValues::new();
    answers.insert("api_key".to_string(), Value::from("secret123"));
    answers.insert("region".to_string(), Value::from("eu-west-1"));
    answers
}

/// Secrets stored with a passphrase only come back with the same passphrase
#[test]
fn test_encrypted_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new("deployer").with_base_dir(dir.path());

    store.save_steps(&steps(), &answers(), Some("pw1")).unwrap();

    let contents = fs::read_to_string(store.path()).unwrap();
    assert!(contents.contains("\"authTag\""));
    assert!(!contents.contains("secret123"));

    assert_eq!(
        store.load_config(&steps(), Some("pw1"))["api_key"],
        Value::from("secret123")
    );
    assert!(!store
        .load_config(&steps(), Some("pw2"))
        .contains_key("api_key"));
}

/// Rotation backs up, re-encrypts and invalidates the old passphrase
#[test]
fn test_passphrase_rotation_workflow() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new("deployer").with_base_dir(dir.path());
    store.save_steps(&steps(), &answers(), Some("pw1")).unwrap();
    let original = fs::read(store.path()).unwrap();

    // Wrong current passphrase leaves everything untouched
    assert!(store.rotate_passphrase("wrong", "pw2").is_err());
    assert_eq!(fs::read(store.path()).unwrap(), original);

    let rotation = store.rotate_passphrase("pw1", "pw2").unwrap();
    assert_eq!(rotation.rotated, 1);
    assert_eq!(fs::read(&rotation.backup).unwrap(), original);

    assert_eq!(store.load_config(&steps(), Some("pw2")), answers());
    assert!(!store
        .load_config(&steps(), Some("pw1"))
        .contains_key("api_key"));

    // The backup still opens with the old passphrase
    let file_name = rotation.backup.file_name().unwrap().to_str().unwrap();
    let backup_store = ConfigStore::new("deployer")
        .with_base_dir(dir.path())
        .with_file_name(file_name);
    assert_eq!(backup_store.load_config(&steps(), Some("pw1")), answers());
}
