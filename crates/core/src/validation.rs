//! Type-driven validation and coercion of raw parameter values.

use std::sync::LazyLock;

use regex::Regex;

use crate::command_definitions::{ParamType, Value};
use crate::error::{Error, Result};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+").expect("url pattern is valid"));
static PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@[a-zA-Z0-9-]+/[a-zA-Z0-9-]+$").expect("package pattern is valid")
});

/// Validates a raw value and coerces it to its declared type.
///
/// A value that is `None` or empty counts as absent. Absent values are an
/// error only when `required` is set; otherwise the result is `Ok(None)`.
/// No trimming or case folding is applied, except that booleans match
/// `true`/`false` case-insensitively.
///
/// # Errors
///
/// Returns [`Error::MissingParameter`] for absent required values,
/// [`Error::EmptyListOptions`] for list types without options,
/// [`Error::InvalidChoice`] for values outside the list options and
/// [`Error::InvalidValue`] for any other type mismatch.
///
/// # Examples
///
/// ```
/// use cliforge_core::command_definitions::{ParamType, Value};
/// use cliforge_core::validation::validate;
///
/// let port = validate(Some("8080"), ParamType::Number, true, None, Some("port"))?;
/// assert_eq!(port, Some(Value::Number(8080)));
///
/// let skipped = validate(Some(""), ParamType::Number, false, None, None)?;
/// assert_eq!(skipped, None);
/// # Ok::<(), cliforge_core::error::Error>(())
/// ```
pub fn validate(
    raw: Option<&str>,
    kind: ParamType,
    required: bool,
    options: Option<&[String]>,
    name: Option<&str>,
) -> Result<Option<Value>> {
    let value = match raw {
        Some(value) if !value.is_empty() => value,
        _ if required => return Err(Error::MissingParameter(name.map(str::to_string))),
        _ => return Ok(None),
    };

    let coerced = match kind {
        ParamType::Number => {
            if !value.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::invalid_value(name, kind, value, "digits only"));
            }
            let number = value
                .parse::<u64>()
                .map_err(|_| Error::invalid_value(name, kind, value, "a non-negative integer"))?;
            Value::Number(number)
        }
        ParamType::Boolean => match value.to_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => return Err(Error::invalid_value(name, kind, value, "`true` or `false`")),
        },
        ParamType::Email => {
            if !EMAIL.is_match(value) {
                return Err(Error::invalid_value(name, kind, value, "user@domain.tld"));
            }
            Value::Text(value.to_string())
        }
        ParamType::Url => {
            if !URL.is_match(value) {
                return Err(Error::invalid_value(name, kind, value, "http:// or https:// URL"));
            }
            Value::Text(value.to_string())
        }
        ParamType::Package => {
            if !PACKAGE.is_match(value) {
                return Err(Error::invalid_value(name, kind, value, "@scope/package"));
            }
            Value::Text(value.to_string())
        }
        ParamType::List => {
            let options = match options {
                Some(options) if !options.is_empty() => options,
                _ => return Err(Error::EmptyListOptions(name.map(str::to_string))),
            };
            if !options.iter().any(|option| option == value) {
                return Err(Error::InvalidChoice {
                    name: name.map(str::to_string),
                    value: value.to_string(),
                    options: options.to_vec(),
                });
            }
            Value::Text(value.to_string())
        }
        ParamType::Custom => match serde_json::from_str::<serde_json::Value>(value) {
            Ok(json) if json.is_array() || json.is_object() => Value::Structured(json),
            _ => {
                return Err(Error::invalid_value(
                    name,
                    kind,
                    value,
                    "a JSON array or object",
                ))
            }
        },
        ParamType::Password | ParamType::Text => Value::Text(value.to_string()),
    };

    Ok(Some(coerced))
}
