use std::process::ExitCode;

use cliforge_cli::runner::{Cli, CliOptions};
use cliforge_cli::setup::{rotate_passphrase_command, setup_command, EncryptionOptions, SetupOptions};
use cliforge_core::command_definitions::{CommandNode, ParamSpec, ParamType};
use cliforge_core::error::Result;
use cliforge_core::store::ConfigStore;
use log::debug;

const TOOL_NAME: &str = "cliforge";

fn setup_steps() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new("api_url", "Base URL of the deployment API", ParamType::Url)
            .required()
            .default_value("https://api.example.com"),
        ParamSpec::new("api_key", "API key for the deployment API", ParamType::Password).required(),
        ParamSpec::new("region", "Default region", ParamType::List)
            .options(["eu-west-1", "us-east-1", "ap-south-1"])
            .default_value("eu-west-1"),
    ]
}

fn deploy_command() -> CommandNode {
    CommandNode::new("deploy", "Deploy a release").subcommand(
        CommandNode::new("staging", "Deploy to the staging environment")
            .param(ParamSpec::new("version", "Release to deploy", ParamType::Text).required())
            .param(ParamSpec::new("replicas", "Number of replicas", ParamType::Number))
            .param(
                ParamSpec::new("strategy", "Rollout strategy", ParamType::List)
                    .options(["rolling", "blue-green"]),
            )
            .action(|values, console| {
                console.println(&format!("Deploying {} to staging", values["version"]))?;
                for (name, value) in values {
                    console.println(&format!("  {name}: {value}"))?;
                }
                Ok(())
            }),
    )
}

fn status_command() -> CommandNode {
    CommandNode::new("status", "Show the stored configuration").action(|_, console| {
        let store = ConfigStore::new(TOOL_NAME);
        let config = store.raw_config();
        if config.is_empty() {
            return console.println("No configuration stored yet. Run `cliforge setup`.");
        }

        console.println(&format!("Configuration at {}", store.path().display()))?;
        for (key, value) in &config {
            let shown = if value.is_object() {
                "<secret>".to_string()
            } else {
                value.to_string()
            };
            console.println(&format!("  {key}: {shown}"))?;
        }
        Ok(())
    })
}

fn build_cli() -> Result<Cli> {
    let mut cli = Cli::new(TOOL_NAME, "Demo tool built with cliforge").with_options(CliOptions {
        version: env!("CARGO_PKG_VERSION").to_string(),
        ..CliOptions::default()
    });

    let setup = SetupOptions::new(setup_steps())
        .with_encryption(EncryptionOptions::default())
        .on_complete(|answers| debug!("Setup completed with {} values", answers.len()));

    cli.command(deploy_command())?
        .command(status_command())?
        .command(setup_command(TOOL_NAME, setup)?)?
        .command(rotate_passphrase_command(TOOL_NAME))?;

    Ok(cli)
}

fn main() -> ExitCode {
    env_logger::init();

    match build_cli() {
        Ok(cli) => cli.run_from_env(),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
