//! Interactive prompting and terminal input handling.
//!
//! This module provides the console implementations and the prompt engine
//! used to fill in parameters that were not given on the command line.
//!
//! # Key Features
//!
//! - **Sequential Prompting**: Missing parameters are asked for in declared order
//! - **List Selection**: Arrow-key selector with wrap-around for list parameters
//! - **Masked Input**: Password values echo `*` instead of the typed characters
//! - **Scripted Sessions**: Replay fixed input for tests and automation
//!
//! # User Interface
//!
//! The interface supports:
//! - Up/Down arrows to move through list options
//! - Enter to confirm a selection or finish masked input
//! - Backspace to delete the last masked character
//! - Ctrl+C to cancel

pub mod console;
pub mod input;
pub mod scripted;
pub mod types;

pub use console::TerminalConsole;
pub use input::Prompter;
pub use scripted::ScriptedConsole;
pub use types::{Announcement, CycleDirection, ListState};
