//! Configuration path utilities.
//!
//! This module resolves where a tool's configuration file lives and expands
//! shell variables like `~` in paths.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Default directory holding every tool's configuration file
pub const DEFAULT_CONFIG_DIR: &str = "~/.cliforge";
/// Suffix appended to the tool name to form the configuration file name
const CONFIG_FILE_SUFFIX: &str = "-config.json";
/// Infix between the configuration file name and the backup timestamp
const BACKUP_INFIX: &str = ".backup.";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^a-z0-9._-]").expect("file name pattern is valid"));

/// Replaces every character outside `[A-Za-z0-9._-]` with `-`.
///
/// # Examples
///
/// ```
/// use cliforge_core::config::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("my tool/v2"), "my-tool-v2");
/// assert_eq!(sanitize_file_name("deploy_cli.1"), "deploy_cli.1");
/// ```
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_FILE_CHARS.replace_all(name, "-").into_owned()
}

/// Default configuration file name for a tool: `<tool>-config.json`.
#[must_use]
pub fn default_file_name(tool_name: &str) -> String {
    sanitize_file_name(&format!("{tool_name}{CONFIG_FILE_SUFFIX}"))
}

/// Expands shell variables like `~` in a directory path.
#[must_use]
pub fn expand_dir(dir: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(dir).as_ref())
}

/// Resolves the configuration file path.
///
/// Uses `base_dir` when given, otherwise [`DEFAULT_CONFIG_DIR`]. The file
/// name is sanitised. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use cliforge_core::config::get_config_path;
///
/// let default_path = get_config_path(None, "deployer-config.json");
/// assert!(default_path.ends_with(".cliforge/deployer-config.json"));
///
/// let custom_path = get_config_path(Some("/etc/tools"), "deployer-config.json");
/// assert_eq!(custom_path.to_str(), Some("/etc/tools/deployer-config.json"));
/// ```
#[must_use]
pub fn get_config_path(base_dir: Option<&str>, file_name: &str) -> PathBuf {
    expand_dir(base_dir.unwrap_or(DEFAULT_CONFIG_DIR)).join(sanitize_file_name(file_name))
}

/// Path of a backup copy of `config_path` taken at `timestamp_millis`.
#[must_use]
pub fn get_backup_path(config_path: &Path, timestamp_millis: i64) -> PathBuf {
    let mut backup = config_path.as_os_str().to_owned();
    backup.push(format!("{BACKUP_INFIX}{timestamp_millis}"));
    PathBuf::from(backup)
}
