//! cliforge Core Library
//!
//! This crate provides the terminal-independent parts of cliforge, a library
//! for building command-line tools out of typed command trees.
//!
//! # Key Features
//!
//! - **Command Registry**: Validated trees of commands, subcommands and typed parameters
//! - **Resolution**: Map an argument vector onto the deepest matching command, with backtracking
//! - **Validation**: Coerce raw strings into typed values with precise error reporting
//! - **Secure Configuration**: Per-tool JSON config with AES-256-GCM encrypted password fields
//! - **Error Handling**: One error type shared by every layer
//!
//! # Examples
//!
//! Resolving and tokenizing an invocation:
//!
//! ```
//! use cliforge_core::command_definitions::{CommandNode, ParamSpec, ParamType, Value};
//! use cliforge_core::registry::Registry;
//! use cliforge_core::tokenizer::tokenize;
//!
//! let mut registry = Registry::new();
//! registry.add(
//!     CommandNode::new("deploy", "Deploy the service").subcommand(
//!         CommandNode::new("staging", "Deploy to staging")
//!             .param(ParamSpec::new("version", "Release to deploy", ParamType::Text).required()),
//!     ),
//! )?;
//!
//! let args: Vec<String> = ["deploy", "staging", "--version=1.0.0"]
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! let resolution = registry.resolve(&args)?;
//! let flags = tokenize(resolution.residual, resolution.command)?;
//!
//! assert_eq!(resolution.path_string(), "deploy staging");
//! assert_eq!(flags.values["version"], Value::from("1.0.0"));
//! # Ok::<(), cliforge_core::error::Error>(())
//! ```

pub mod command_definitions;
pub mod config;
pub mod console;
pub mod error;
pub mod file_handling;
pub mod registry;
pub mod resolver;
pub mod secrets;
pub mod store;
pub mod tokenizer;
pub mod validation;
