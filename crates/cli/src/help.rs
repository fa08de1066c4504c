//! Help text for tools built with cliforge.

use itertools::Itertools;

use cliforge_core::command_definitions::{CommandNode, ParamSpec, ParamType};

/// Renders global and per-command help.
///
/// The runner prints whatever the renderer returns, so hosts can swap in
/// their own styling.
pub trait HelpRenderer {
    /// Help shown when no command is given or for a lone `--help`.
    fn global_help(&self, name: &str, description: &str, commands: &[CommandNode]) -> String;

    /// Help for the command reached through `path`.
    fn command_help(&self, name: &str, command: &CommandNode, path: &[String]) -> String;
}

/// Unstyled help, suitable for any terminal or log.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHelp;

impl HelpRenderer for PlainHelp {
    fn global_help(&self, name: &str, description: &str, commands: &[CommandNode]) -> String {
        let mut lines = vec![name.to_string()];
        if !description.is_empty() {
            lines.push(description.to_string());
        }

        lines.extend([
            String::new(),
            "USAGE".to_string(),
            format!("  $ {name} <command> [options]"),
            String::new(),
            "COMMANDS".to_string(),
        ]);
        for command in commands {
            lines.push(format!("  {:<15}{}", command.name, command.description));
            lines.extend(command.subcommands.iter().map(|subcommand| {
                format!(
                    "    {} {}: {}",
                    command.name, subcommand.name, subcommand.description
                )
            }));
        }

        lines.extend([
            String::new(),
            "OPTIONS".to_string(),
            format!("  {:<12}Show help for a command", "--help"),
            format!("  {:<12}Show version information", "--version"),
            String::new(),
            format!("Run '{name} <command> --help' for detailed help on a specific command."),
        ]);
        block(&lines)
    }

    fn command_help(&self, name: &str, command: &CommandNode, path: &[String]) -> String {
        let full_command = path.join(" ");
        let mut lines = vec![format!("{name} {full_command}")];
        if !command.description.is_empty() {
            lines.push(command.description.clone());
        }

        let usage = command.params.iter().map(usage_token).join(" ");
        lines.extend([
            String::new(),
            "USAGE".to_string(),
            format!("  $ {name} {full_command} {usage}"),
        ]);

        if !command.params.is_empty() {
            lines.extend([
                String::new(),
                "PARAMETERS".to_string(),
                parameter_table(&command.params),
            ]);
        }

        if command.has_subcommands() {
            lines.extend([String::new(), "SUBCOMMANDS".to_string()]);
            lines.extend(
                command
                    .subcommands
                    .iter()
                    .map(|subcommand| format!("  {}: {}", subcommand.name, subcommand.description)),
            );
        }

        lines.extend([
            String::new(),
            "EXAMPLES".to_string(),
            format!("  $ {name} {full_command} --help"),
        ]);
        let example = command
            .params
            .iter()
            .filter(|param| param.required)
            .take(2)
            .map(example_flag)
            .join(" ");
        if !example.is_empty() {
            lines.push(format!("  $ {name} {full_command} {example}"));
        }

        block(&lines)
    }
}

/// Joins lines into printable text ending in a newline.
fn block(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn usage_token(param: &ParamSpec) -> String {
    if param.required {
        format!("<{}>", param.name)
    } else {
        format!("[{}]", param.name)
    }
}

fn example_flag(param: &ParamSpec) -> String {
    match (param.kind, param.options.as_ref().and_then(|o| o.first())) {
        (ParamType::List, Some(first)) => format!("--{} {first}", param.name),
        (ParamType::Boolean, _) => format!("--{} true", param.name),
        _ => format!("--{} value", param.name),
    }
}

fn parameter_table(params: &[ParamSpec]) -> String {
    let headers = ["Parameter", "Type", "Required", "Description"].map(String::from);
    let rows = params
        .iter()
        .map(|param| {
            let description = match param.options.as_ref().filter(|o| !o.is_empty()) {
                Some(options) => format!("{} (options: {})", param.description, options.join(", ")),
                None => param.description.clone(),
            };
            [
                param.name.clone(),
                param.kind.to_string(),
                if param.required { "Yes" } else { "No" }.to_string(),
                description,
            ]
        })
        .collect_vec();

    let widths: Vec<usize> = (0..headers.len())
        .map(|i| {
            std::iter::once(&headers)
                .chain(rows.iter())
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |row: &[String; 4]| {
        row.iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    let separator = widths.iter().map(|width| "─".repeat(*width)).join("─┼─");

    std::iter::once(format_row(&headers))
        .chain(std::iter::once(separator))
        .chain(rows.iter().map(format_row))
        .join("\n")
}
