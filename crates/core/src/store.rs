//! Persistent per-tool configuration with encrypted password fields.

use std::path::{Path, PathBuf};

use chrono::Utc;
use indexmap::IndexMap;
use log::{debug, info};
use serde_json::Value as JsonValue;

use crate::command_definitions::{ParamSpec, ParamType, ParamValues, Value};
use crate::config::{default_file_name, get_backup_path, get_config_path};
use crate::error::{Error, Result};
use crate::file_handling::{
    backup_file, read_document, read_document_lenient, write_document, ConfigDocument,
};
use crate::secrets::SecretEnvelope;

/// Decoded configuration, keyed by step name.
pub type ConfigRecord = IndexMap<String, Value>;

/// Result of a successful passphrase rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    /// Copy of the configuration as it was before rotation.
    pub backup: PathBuf,
    /// Number of secret fields re-encrypted.
    pub rotated: usize,
}

/// Location of one tool's configuration file and the operations on it.
///
/// The file lives at `~/.cliforge/<tool>-config.json` unless overridden.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base_dir: Option<String>,
    file_name: String,
    path: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn new(tool_name: &str) -> Self {
        let file_name = default_file_name(tool_name);
        Self {
            path: get_config_path(None, &file_name),
            base_dir: None,
            file_name,
        }
    }

    /// Uses `file_name` (sanitised) instead of `<tool>-config.json`.
    #[must_use]
    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self.path = get_config_path(self.base_dir.as_deref(), &self.file_name);
        self
    }

    /// Stores the file under `dir` instead of the default directory.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(dir.as_ref().to_string_lossy().into_owned());
        self.path = get_config_path(self.base_dir.as_deref(), &self.file_name);
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes `answers`, replacing the whole file.
    ///
    /// Answers for Password steps are sealed into secret envelopes, encrypted
    /// when `passphrase` is non-empty and base64 encoded otherwise. Every
    /// other answer is stored as its plain JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if sealing fails or the file cannot be written.
    pub fn save_steps(
        &self,
        steps: &[ParamSpec],
        answers: &ParamValues,
        passphrase: Option<&str>,
    ) -> Result<()> {
        let mut document = ConfigDocument::new();

        for (name, value) in answers {
            let is_secret = steps
                .iter()
                .any(|step| step.name == *name && step.kind == ParamType::Password);

            let stored = if is_secret {
                let envelope = SecretEnvelope::seal(&value.to_raw(), passphrase)?;
                self.to_json(&envelope)?
            } else {
                self.to_json(value)?
            };
            document.insert(name.clone(), stored);
        }

        write_document(&self.path, &document)?;
        info!("Saved {} config values to `{}`", answers.len(), self.path.display());
        Ok(())
    }

    /// Reads the configuration, opening Password steps.
    ///
    /// Never fails: a missing or malformed file gives an empty record, and a
    /// secret that cannot be opened (wrong or missing passphrase, corrupt
    /// envelope) is left out of the record.
    #[must_use]
    pub fn load_config(&self, steps: &[ParamSpec], passphrase: Option<&str>) -> ConfigRecord {
        let document = read_document_lenient(&self.path);
        let mut record = ConfigRecord::new();

        for (name, json) in document {
            let is_secret = steps
                .iter()
                .any(|step| step.name == name && step.kind == ParamType::Password);

            let envelope = if is_secret {
                SecretEnvelope::from_json(&json)
            } else {
                None
            };

            match envelope {
                Some(envelope) => match envelope.open(&name, passphrase) {
                    Ok(plain) => {
                        record.insert(name, Value::Text(plain));
                    }
                    Err(e) => debug!("Leaving out secret `{name}`: {e}"),
                },
                None => {
                    record.insert(name, plain_value(json));
                }
            }
        }

        record
    }

    /// Opens every secret field in the file, failing on the first that
    /// cannot be opened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if there is no file, a read error
    /// if it is malformed, and the envelope's error for any secret that does
    /// not open with `passphrase`.
    pub fn decrypt_secrets(&self, passphrase: Option<&str>) -> Result<IndexMap<String, String>> {
        let document = self.read_existing()?;

        secret_fields(&document)
            .map(|(name, envelope)| Ok((name.clone(), envelope.open(name, passphrase)?)))
            .collect()
    }

    /// Checks that `passphrase` opens every secret field.
    ///
    /// Returns the number of secret fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSecretFields`] if the file holds no secrets, plus
    /// everything [`ConfigStore::decrypt_secrets`] can return.
    pub fn verify_passphrase(&self, passphrase: &str) -> Result<usize> {
        if passphrase.is_empty() {
            return Err(Error::PassphraseRequired);
        }

        let secrets = self.decrypt_secrets(Some(passphrase))?;
        if secrets.is_empty() {
            return Err(Error::NoSecretFields(self.path.display().to_string()));
        }

        Ok(secrets.len())
    }

    /// Re-encrypts every secret field under `new`.
    ///
    /// All secrets must open with `current` before anything is written. The
    /// file is then copied to `<file>.backup.<unix-millis>` and replaced.
    /// Base64-encoded secrets come out encrypted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PassphraseRequired`] for an empty passphrase,
    /// [`Error::SamePassphrase`] when `new` equals `current`,
    /// [`Error::ConfigNotFound`], [`Error::NoSecretFields`], or the error of
    /// the first secret that fails to open. No file is touched on error.
    pub fn rotate_passphrase(&self, current: &str, new: &str) -> Result<Rotation> {
        if current.is_empty() || new.is_empty() {
            return Err(Error::PassphraseRequired);
        }

        if current == new {
            return Err(Error::SamePassphrase);
        }

        let mut document = self.read_existing()?;
        let secrets = self.decrypt_secrets(Some(current))?;
        if secrets.is_empty() {
            return Err(Error::NoSecretFields(self.path.display().to_string()));
        }

        for (name, plain) in &secrets {
            let envelope = SecretEnvelope::seal(plain, Some(new))?;
            document.insert(name.clone(), self.to_json(&envelope)?);
        }

        let backup = get_backup_path(&self.path, Utc::now().timestamp_millis());
        backup_file(&self.path, &backup)?;
        write_document(&self.path, &document)?;

        info!(
            "Rotated {} secret fields in `{}`",
            secrets.len(),
            self.path.display()
        );

        Ok(Rotation {
            backup,
            rotated: secrets.len(),
        })
    }

    /// The file's JSON as stored, secrets still sealed.
    ///
    /// A missing or malformed file gives an empty map.
    #[must_use]
    pub fn raw_config(&self) -> ConfigDocument {
        read_document_lenient(&self.path)
    }

    /// One stored JSON value, secrets still sealed.
    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<JsonValue> {
        self.raw_config().remove(key)
    }

    fn read_existing(&self) -> Result<ConfigDocument> {
        read_document(&self.path)?
            .ok_or_else(|| Error::ConfigNotFound(self.path.display().to_string()))
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<JsonValue> {
        serde_json::to_value(value)
            .map_err(|e| Error::json_error("serialising".to_string(), self.path.display().to_string(), e))
    }
}

fn secret_fields(document: &ConfigDocument) -> impl Iterator<Item = (&String, SecretEnvelope)> {
    document
        .iter()
        .filter_map(|(name, json)| SecretEnvelope::from_json(json).map(|envelope| (name, envelope)))
}

fn plain_value(json: JsonValue) -> Value {
    match json {
        JsonValue::Bool(b) => Value::Boolean(b),
        JsonValue::String(text) => Value::Text(text),
        JsonValue::Number(n) => match n.as_u64() {
            Some(n) => Value::Number(n),
            None => Value::Structured(JsonValue::Number(n)),
        },
        other => Value::Structured(other),
    }
}
