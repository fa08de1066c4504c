//! cliforge CLI Library
//!
//! This crate provides the terminal side of cliforge: the runner that turns an
//! argument vector into a command invocation, interactive prompting for
//! missing parameters, and generated commands for managing a tool's stored
//! configuration.
//!
//! # Key Features
//!
//! - **Runner**: Help, version, resolution, validation and action dispatch in one call
//! - **Interactive Prompting**: Sequential prompts, arrow-key list selection and masked input
//! - **Setup Command**: Step-by-step configuration saved with encrypted password fields
//! - **Passphrase Rotation**: Re-encrypt stored secrets after verifying the old passphrase
//!
//! # Architecture
//!
//! - [`runner`]: The [`Cli`](runner::Cli) entry point and its options
//! - [`prompt`]: Console implementations and the prompt engine
//! - [`setup`]: The generated `setup` and `rotate-passphrase` commands
//! - [`help`]: Pluggable help rendering
//!
//! # Examples
//!
//! ```no_run
//! use cliforge_cli::runner::Cli;
//! use cliforge_core::command_definitions::{CommandNode, ParamSpec, ParamType};
//!
//! let mut cli = Cli::new("deployer", "Ship services");
//! cli.command(
//!     CommandNode::new("deploy", "Deploy a release")
//!         .param(ParamSpec::new("version", "Release to deploy", ParamType::Text).required())
//!         .action(|values, console| {
//!             console.println(&format!("Deploying {}", values["version"]))
//!         }),
//! )?;
//!
//! let code = cli.run_from_env();
//! # Ok::<(), cliforge_core::error::Error>(())
//! ```

pub mod help;
pub mod prompt;
pub mod runner;
pub mod setup;
