//! File handling for configuration documents.
//!
//! This module reads and writes the JSON configuration file and takes backup
//! copies of it before destructive changes.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use serde_json::{Map, Value as JsonValue};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Top-level JSON object of a configuration file.
pub type ConfigDocument = Map<String, JsonValue>;

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn get_reader(file_description: &str, path: &Path) -> Result<File> {
    File::open(path)
        .map_err(|e| Error::io_error(file_description.to_string(), display(path), e))
}

/// Reads a configuration document from disk.
///
/// Returns `None` if the file doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read
/// - The file contains invalid JSON
/// - The top-level JSON value is not an object
pub fn read_document(path: &Path) -> Result<Option<ConfigDocument>> {
    if !path.exists() {
        return Ok(None);
    }

    let reader = BufReader::new(get_reader("config", path)?);
    let document: ConfigDocument = serde_json::from_reader(reader)
        .map_err(|e| Error::json_error("reading".to_string(), display(path), e))?;

    Ok(Some(document))
}

/// Like [`read_document`], but any failure reads as an empty document.
///
/// Failures are logged at debug level.
#[must_use]
pub fn read_document_lenient(path: &Path) -> ConfigDocument {
    match read_document(path) {
        Ok(document) => document.unwrap_or_default(),
        Err(e) => {
            debug!("Ignoring unreadable config: {e}");
            ConfigDocument::new()
        }
    }
}

/// Writes a configuration document, replacing any existing file atomically.
///
/// Missing parent directories are created. The document is written to a
/// temporary file beside the target and then renamed over it.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The temporary file cannot be created, written or renamed
/// - Serialization to JSON fails
pub fn write_document(path: &Path, document: &ConfigDocument) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent)
        .map_err(|e| Error::io_error("config directory".to_string(), display(parent), e))?;

    let temp_file = NamedTempFile::new_in(parent)
        .map_err(|e| Error::io_error("temporary config".to_string(), display(parent), e))?;

    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, document)
            .map_err(|e| Error::json_error("writing".to_string(), display(path), e))?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| Error::io_error("config".to_string(), display(path), e))?;
    }

    temp_file
        .persist(path)
        .map_err(|e| Error::io_error("config".to_string(), display(path), e.error))?;

    debug!("Wrote config to `{}`", path.display());
    Ok(())
}

/// Copies `path` to `backup_path`.
///
/// # Errors
///
/// Returns an error if the copy fails.
pub fn backup_file(path: &Path, backup_path: &Path) -> Result<()> {
    fs::copy(path, backup_path)
        .map_err(|e| Error::io_error("backup".to_string(), display(backup_path), e))?;
    debug!("Backed up `{}` to `{}`", path.display(), backup_path.display());
    Ok(())
}
