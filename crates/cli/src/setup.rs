//! Generated `setup` and `rotate-passphrase` commands backed by a [`ConfigStore`].

use log::{info, warn};

use cliforge_core::command_definitions::{CommandNode, ParamSpec, ParamType, ParamValues, Value};
use cliforge_core::console::Console;
use cliforge_core::error::{Error, Result};
use cliforge_core::registry::validate_parameters;
use cliforge_core::secrets::SecretEnvelope;
use cliforge_core::store::{ConfigStore, Rotation};

use crate::prompt::Prompter;

const HIDDEN_VALUE: &str = "********";
const ROTATE_COMMAND: &str = "rotate-passphrase";
const CONFIG_FILE_FLAG: &str = "config-file";

/// Callback run with the saved answers once setup completes.
pub type OnComplete = Box<dyn Fn(&ParamValues)>;

/// Passphrase protection for Password steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionOptions {
    pub enabled: bool,
    /// Prompt shown when asking for the passphrase.
    pub prompt: String,
}

impl Default for EncryptionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            prompt: "Passphrase (not stored)".to_string(),
        }
    }
}

pub struct SetupOptions {
    /// Name of the generated command.
    pub name: String,
    pub description: String,
    /// Questions asked, in order.
    pub steps: Vec<ParamSpec>,
    /// Overrides `<tool>-config.json`.
    pub config_file_name: Option<String>,
    pub encryption: Option<EncryptionOptions>,
    pub on_complete: Option<OnComplete>,
}

impl SetupOptions {
    #[must_use]
    pub fn new(steps: Vec<ParamSpec>) -> Self {
        Self {
            name: "setup".to_string(),
            description: "Configure CLI defaults".to_string(),
            steps,
            config_file_name: None,
            encryption: None,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn with_encryption(mut self, encryption: EncryptionOptions) -> Self {
        self.encryption = Some(encryption);
        self
    }

    #[must_use]
    pub fn on_complete(mut self, on_complete: impl Fn(&ParamValues) + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

/// Builds the setup command storing answers in the tool's default location.
///
/// # Errors
///
/// Returns the step validation error if two steps share a name or a list
/// step declares no options.
pub fn setup_command(tool_name: &str, options: SetupOptions) -> Result<CommandNode> {
    let mut store = ConfigStore::new(tool_name);
    if let Some(file_name) = &options.config_file_name {
        store = store.with_file_name(file_name);
    }
    setup_command_for(store, options)
}

/// Builds the setup command around an explicit store.
///
/// # Errors
///
/// Same as [`setup_command`].
pub fn setup_command_for(store: ConfigStore, options: SetupOptions) -> Result<CommandNode> {
    validate_parameters(&options.name, &options.steps)?;
    let name = options.name.clone();
    let description = options.description.clone();

    Ok(CommandNode::new(name, description)
        .action(move |_, console| run_setup(console, &store, &options).map(|_| ())))
}

/// Walks the operator through every step and saves the answers.
///
/// Existing answers are loaded first and offered as the current value; an
/// empty answer keeps the current value, falling back to the step default.
///
/// # Errors
///
/// Returns the step validation error before anything is asked, prompting
/// errors ([`Error::Cancelled`], [`Error::InputClosed`]) and any error
/// writing the configuration file.
pub fn run_setup(
    console: &mut dyn Console,
    store: &ConfigStore,
    options: &SetupOptions,
) -> Result<ParamValues> {
    validate_parameters(&options.name, &options.steps)?;

    let passphrase = match options.encryption.as_ref().filter(|e| e.enabled) {
        Some(encryption) => {
            let passphrase =
                Prompter::new(console).ask_masked(&format!("{}: ", encryption.prompt))?;
            Some(passphrase).filter(|p| !p.is_empty())
        }
        None => None,
    };

    let mut answers = store.load_config(&options.steps, passphrase.as_deref());

    console.println("")?;
    console.println("SETUP: Configure your CLI step by step")?;
    console.println("")?;

    for step in &options.steps {
        if let Some(value) = ask_for_step(console, step, answers.get(&step.name))? {
            answers.insert(step.name.clone(), value);
        }
    }

    store.save_steps(&options.steps, &answers, passphrase.as_deref())?;
    console.println("")?;
    console.println(&format!("✅ Config stored in {}", store.path().display()))?;
    info!("Setup saved {} values", answers.len());

    if let Some(on_complete) = &options.on_complete {
        on_complete(&answers);
    }

    Ok(answers)
}

fn ask_for_step(
    console: &mut dyn Console,
    step: &ParamSpec,
    existing: Option<&Value>,
) -> Result<Option<Value>> {
    console.println(&format!("{} ({})", step.name, step.description))?;

    let options = step.options.as_deref().filter(|options| !options.is_empty());
    if let Some(options) = options {
        console.println(&format!("Options: {}", options.join(", ")))?;
    }

    let hidden = step.kind == ParamType::Password;
    let shown = |value: &Value| {
        if hidden {
            HIDDEN_VALUE.to_string()
        } else {
            value.to_string()
        }
    };
    if let Some(existing) = existing {
        console.println(&format!("Current value: {}", shown(existing)))?;
    } else if let Some(default) = &step.default {
        console.println(&format!("Default value: {}", shown(default)))?;
    }

    let fallback = existing.or(step.default.as_ref()).map(Value::to_raw);

    if let (ParamType::List, Some(options)) = (step.kind, options) {
        let initial = fallback
            .as_deref()
            .and_then(|current| options.iter().position(|option| option == current))
            .unwrap_or(0);
        let index = Prompter::new(console).select(&step.name, options, initial)?;
        return Ok(Some(Value::Text(options[index].clone())));
    }

    loop {
        let mut prompter = Prompter::new(console);
        let input = if hidden {
            prompter.ask_masked("> ")?
        } else {
            prompter.ask_line("> ")?
        };

        let candidate = if input.is_empty() {
            fallback.clone().unwrap_or_default()
        } else {
            input
        };

        match step.validate(Some(&candidate)) {
            Ok(value) => return Ok(value),
            Err(e) => console.println(&e.to_string())?,
        }
    }
}

/// Builds `rotate-passphrase` for the tool's default config location.
#[must_use]
pub fn rotate_passphrase_command(tool_name: &str) -> CommandNode {
    rotate_passphrase_command_for(ConfigStore::new(tool_name))
}

/// Builds `rotate-passphrase` around an explicit store.
///
/// The optional `--config-file` flag picks another file name in the same
/// directory.
#[must_use]
pub fn rotate_passphrase_command_for(store: ConfigStore) -> CommandNode {
    CommandNode::new(
        ROTATE_COMMAND,
        "Rotate the passphrase used to encrypt configuration values",
    )
    .param(ParamSpec::new(
        CONFIG_FILE_FLAG,
        "Specific config file to rotate passphrase for (optional)",
        ParamType::Text,
    ))
    .action(move |values, console| {
        let store = match values.get(CONFIG_FILE_FLAG).and_then(Value::as_str) {
            Some(file_name) => store.clone().with_file_name(file_name),
            None => store.clone(),
        };
        run_rotation(console, &store).map(|_| ())
    })
}

/// Asks for the current and new passphrase and rotates the store.
///
/// The current passphrase is checked against every secret before anything
/// else is asked. Choosing the same passphrase again is reported as a
/// warning and nothing changes (`Ok(None)`).
///
/// # Errors
///
/// Returns [`Error::ConfigNotFound`], [`Error::NoSecretFields`],
/// [`Error::PassphraseRequired`] for empty input, the decryption error for a
/// wrong current passphrase, [`Error::PassphraseMismatch`] when the
/// confirmation differs, and any error writing the files.
pub fn run_rotation(console: &mut dyn Console, store: &ConfigStore) -> Result<Option<Rotation>> {
    console.println("")?;
    console.println("ROTATE PASSPHRASE: Updating encryption passphrase")?;
    console.println("")?;

    if !store.exists() {
        return Err(Error::ConfigNotFound(store.path().display().to_string()));
    }

    let has_secrets = store
        .raw_config()
        .values()
        .any(|value| SecretEnvelope::from_json(value).is_some());
    if !has_secrets {
        return Err(Error::NoSecretFields(store.path().display().to_string()));
    }

    console.println("Enter current passphrase to decrypt existing configuration:")?;
    let current = Prompter::new(console).ask_masked("Current passphrase: ")?;
    store.verify_passphrase(&current)?;

    console.println("")?;
    console.println("Enter new passphrase for encryption:")?;
    let new = Prompter::new(console).ask_masked("New passphrase: ")?;
    if new.is_empty() {
        return Err(Error::PassphraseRequired);
    }
    if new == current {
        warn!("Passphrase rotation skipped: {}", Error::SamePassphrase);
        console.println(&format!("⚠️  {}", Error::SamePassphrase))?;
        return Ok(None);
    }

    console.println("Confirm new passphrase:")?;
    let confirmation = Prompter::new(console).ask_masked("Confirm new passphrase: ")?;
    if confirmation != new {
        return Err(Error::PassphraseMismatch);
    }

    let rotation = store.rotate_passphrase(&current, &new)?;

    console.println(&format!("📁 Backup created: {}", rotation.backup.display()))?;
    console.println("")?;
    console.println("✅ Passphrase rotated successfully!")?;
    console.println(&format!("Configuration file: {}", store.path().display()))?;
    console.println(&format!(
        "{} encrypted fields have been re-encrypted with the new passphrase.",
        rotation.rotated
    ))?;

    Ok(Some(rotation))
}
