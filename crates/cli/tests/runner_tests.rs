//! End-to-end invocations through the runner with scripted input.

use std::cell::RefCell;
use std::rc::Rc;

use cliforge_cli::prompt::ScriptedConsole;
use cliforge_cli::runner::{Cli, CliOptions, Outcome};
use cliforge_core::command_definitions::{CommandNode, ParamSpec, ParamType, ParamValues, Value};
use cliforge_core::console::Key;
use cliforge_core::error::Error;

type Seen = Rc<RefCell<Vec<ParamValues>>>;

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

fn recording(node: CommandNode, seen: &Seen) -> CommandNode {
    let seen = Rc::clone(seen);
    node.action(move |values, _| {
        seen.borrow_mut().push(values.clone());
        Ok(())
    })
}

fn cli(seen: &Seen, options: CliOptions) -> Cli {
    let mut cli = Cli::new("tool", "Test tool").with_options(options);
    cli.command(
        CommandNode::new("deploy", "Deploy").subcommand(recording(
            CommandNode::new("staging", "Deploy to staging")
                .param(ParamSpec::new("version", "Release", ParamType::Text).required()),
            seen,
        )),
    )
    .unwrap()
    .command(recording(
        CommandNode::new("project", "Projects")
            .param(ParamSpec::new("name", "Project name", ParamType::Text).required())
            .param(
                ParamSpec::new("template", "Starter", ParamType::List)
                    .required()
                    .options(["basic", "advanced", "minimal"]),
            )
            .param(ParamSpec::new("token", "Access token", ParamType::Password))
            .param(ParamSpec::new("port", "Port", ParamType::Number))
            .subcommand(CommandNode::new("create", "Create a project")),
        seen,
    ))
    .unwrap();
    cli
}

#[test]
fn test_nested_invocation_runs_leaf_action() {
    let seen = Seen::default();
    let mut console = ScriptedConsole::new();

    let outcome = cli(&seen, CliOptions::default())
        .execute(&args(&["deploy", "staging", "--version=1.0.0"]), &mut console)
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Executed(vec!["deploy".to_string(), "staging".to_string()])
    );
    assert_eq!(seen.borrow()[0]["version"], Value::from("1.0.0"));
}

#[test]
fn test_backtracked_invocation_runs_parent_action() {
    let seen = Seen::default();
    let mut console = ScriptedConsole::new();

    let outcome = cli(&seen, CliOptions::default())
        .execute(
            &args(&["project", "unknown", "--name", "demo", "--template", "basic"]),
            &mut console,
        )
        .unwrap();

    assert_eq!(outcome, Outcome::Executed(vec!["project".to_string()]));
    let values = &seen.borrow()[0];
    assert_eq!(values["name"], Value::from("demo"));
    assert_eq!(values.len(), 2);
}

#[test]
fn test_flag_disables_prompting() {
    let seen = Seen::default();
    let mut console = ScriptedConsole::new();

    let result = cli(&seen, CliOptions::default())
        .execute(&args(&["project", "--port", "80"]), &mut console);

    match result {
        Err(Error::MissingParameters { missing, optional }) => {
            assert_eq!(missing, vec!["name", "template"]);
            assert_eq!(optional, vec!["token"]);
        }
        other => panic!("Expected missing parameters, got {other:?}"),
    }
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_non_interactive_reports_missing() {
    let seen = Seen::default();
    let options = CliOptions {
        interactive: false,
        ..CliOptions::default()
    };

    let result = cli(&seen, options).execute(&args(&["project"]), &mut ScriptedConsole::new());
    assert!(matches!(result, Err(Error::MissingParameters { .. })));
}

#[test]
fn test_interactive_prompts_in_declared_order() {
    let seen = Seen::default();
    let mut console = ScriptedConsole::new()
        // name: first answer is empty and retried
        .lines(["", "demo"])
        // template: down twice, up once, enter -> advanced
        .keys([Key::Down, Key::Down, Key::Up, Key::Enter])
        // token: masked
        .typed("s3cr3t")
        // port: invalid, then skipped
        .lines(["eighty", ""]);

    cli(&seen, CliOptions::default())
        .execute(&args(&["project"]), &mut console)
        .unwrap();

    let values = &seen.borrow()[0];
    assert_eq!(values["name"], Value::from("demo"));
    assert_eq!(values["template"], Value::from("advanced"));
    assert_eq!(values["token"], Value::from("s3cr3t"));
    assert!(!values.contains_key("port"));
    assert_eq!(
        values.keys().collect::<Vec<_>>(),
        vec!["name", "template", "token"]
    );

    let output = console.output();
    assert!(output.contains("Please try again:"));
    assert!(output.contains("✓ Selected: advanced"));
    assert!(output.contains("******"));
    assert!(!output.contains("s3cr3t"));
    assert!(output.contains("○ Skipped"));
    assert!(console.is_exhausted());
    assert_eq!(console.keys_outside_raw_mode(), 0);
}

#[test]
fn test_cancel_during_selection() {
    let seen = Seen::default();
    let mut console = ScriptedConsole::new().line("demo").keys([Key::Down, Key::Cancel]);

    let result = cli(&seen, CliOptions::default()).execute(&args(&["project"]), &mut console);

    assert!(matches!(result, Err(ref e) if e.is_cancellation()));
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_closed_input_stops_prompting() {
    let seen = Seen::default();
    let mut console = ScriptedConsole::new();

    let result = cli(&seen, CliOptions::default()).execute(&args(&["project"]), &mut console);
    assert!(matches!(result, Err(Error::InputClosed)));
}

#[test]
fn test_command_help() {
    let seen = Seen::default();
    let mut console = ScriptedConsole::new();

    let outcome = cli(&seen, CliOptions::default())
        .execute(&args(&["deploy", "staging", "--help"]), &mut console)
        .unwrap();

    assert_eq!(outcome, Outcome::Help);
    assert!(console.output().contains("$ tool deploy staging <version>"));
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_unknown_flag_is_rejected() {
    let seen = Seen::default();
    let result = cli(&seen, CliOptions::default()).execute(
        &args(&["deploy", "staging", "--region", "eu"]),
        &mut ScriptedConsole::new(),
    );
    assert!(matches!(result, Err(Error::UnknownParameter { ref name, .. }) if name == "region"));
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut cli = Cli::new("tool", "");
    cli.command(CommandNode::new("a", "")).unwrap();
    assert!(matches!(
        cli.command(CommandNode::new("a", "")),
        Err(Error::NonUniqueCommandId(_))
    ));
}
