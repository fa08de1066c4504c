use std::fmt::{Debug, Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::console::Console;
use crate::error::Result;

/// Coerced parameter values, in the order they were resolved.
pub type ParamValues = IndexMap<String, Value>;

/// Action run when a command is invoked.
///
/// Receives the validated parameters and the console session used for any
/// prompting, so actions can keep talking to the operator.
pub type Action = Box<dyn Fn(&ParamValues, &mut dyn Console) -> Result<()>>;

/// The closed set of parameter types understood by the validator.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    Text,
    Number,
    Boolean,
    Email,
    Url,
    List,
    Custom,
    Package,
    Password,
}

impl Display for ParamType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParamType::Text => "text",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Email => "email",
            ParamType::Url => "url",
            ParamType::List => "list",
            ParamType::Custom => "custom",
            ParamType::Package => "package",
            ParamType::Password => "password",
        };
        formatter.write_str(name)
    }
}

/// A coerced parameter value.
///
/// Serialises to plain JSON; deserialisation tries the variants in order, so
/// numbers and booleans round-trip to their own variants.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(u64),
    Text(String),
    Structured(serde_json::Value),
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string form fed back into the validator when a stored value is reused.
    #[must_use]
    pub fn to_raw(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(b) => write!(formatter, "{b}"),
            Value::Number(n) => write!(formatter, "{n}"),
            Value::Text(text) => formatter.write_str(text),
            Value::Structured(json) => write!(formatter, "{json}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value)
    }
}

/// Declaration of one command parameter or configuration step.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ParamType,
    #[serde(default)]
    pub required: bool,
    pub options: Option<Vec<String>>,
    /// Only consulted by configuration steps.
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            options: None,
            default: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Validates a raw value against this declaration.
    ///
    /// # Errors
    ///
    /// Returns the validator's error for absent required values or values
    /// that do not match the declared type.
    pub fn validate(&self, raw: Option<&str>) -> Result<Option<Value>> {
        crate::validation::validate(
            raw,
            self.kind,
            self.required,
            self.options.as_deref(),
            Some(&self.name),
        )
    }
}

impl Display for ParamSpec {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "`{}` ({})", self.name, self.kind)?;

        if !self.description.is_empty() {
            write!(formatter, ": {}", self.description)?;
        }

        Ok(())
    }
}

/// One node of the command tree.
pub struct CommandNode {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub subcommands: Vec<CommandNode>,
    pub action: Option<Action>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            subcommands: Vec::new(),
            action: None,
        }
    }

    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn subcommand(mut self, subcommand: CommandNode) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    #[must_use]
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&ParamValues, &mut dyn Console) -> Result<()> + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    #[must_use]
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandNode> {
        self.subcommands.iter().find(|cmd| cmd.name == name)
    }

    #[must_use]
    pub fn find_param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|param| param.name == name)
    }

    #[must_use]
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Required parameters that have no entry in `values`.
    #[must_use]
    pub fn missing_required(&self, values: &ParamValues) -> Vec<&ParamSpec> {
        self.params
            .iter()
            .filter(|param| param.required && !values.contains_key(&param.name))
            .collect()
    }

    /// Optional parameters that have no entry in `values`.
    #[must_use]
    pub fn unset_optional(&self, values: &ParamValues) -> Vec<&ParamSpec> {
        self.params
            .iter()
            .filter(|param| !param.required && !values.contains_key(&param.name))
            .collect()
    }
}

impl Debug for CommandNode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CommandNode")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .field("subcommands", &self.subcommands)
            .field("action", &self.action.as_ref().map(|_| "<action>"))
            .finish()
    }
}

impl Display for CommandNode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            formatter.write_str(&self.name)
        } else {
            write!(formatter, "{} ({})", self.name, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_display() {
        assert_eq!(ParamType::Password.to_string(), "password");
        assert_eq!(ParamType::default(), ParamType::Text);
    }

    #[test]
    fn test_value_untagged_deserialization() {
        let value: Value = serde_json::from_str("true").unwrap();
        assert_eq!(value, Value::Boolean(true));

        let value: Value = serde_json::from_str("42").unwrap();
        assert_eq!(value, Value::Number(42));

        let value: Value = serde_json::from_str("\"staging\"").unwrap();
        assert_eq!(value, Value::Text("staging".to_string()));

        let value: Value = serde_json::from_str("[1, 2]").unwrap();
        assert!(matches!(value, Value::Structured(_)));
    }

    #[test]
    fn test_value_to_raw() {
        assert_eq!(Value::from("abc").to_raw(), "abc");
        assert_eq!(Value::Boolean(false).to_raw(), "false");
        assert_eq!(Value::Number(7).to_raw(), "7");
    }

    #[test]
    fn test_param_spec_display() {
        let spec = ParamSpec::new("port", "Port to bind", ParamType::Number);
        assert_eq!(spec.to_string(), "`port` (number): Port to bind");
    }

    #[test]
    fn test_missing_required_and_unset_optional() {
        let node = CommandNode::new("deploy", "Deploy")
            .param(ParamSpec::new("env", "", ParamType::Text).required())
            .param(ParamSpec::new("tag", "", ParamType::Text));

        let mut values = ParamValues::new();
        assert_eq!(node.missing_required(&values).len(), 1);
        assert_eq!(node.unset_optional(&values).len(), 1);

        values.insert("env".to_string(), Value::from("prod"));
        assert!(node.missing_required(&values).is_empty());
    }

    #[test]
    fn test_command_node_display() {
        let node = CommandNode::new("setup", "Configure defaults");
        assert_eq!(node.to_string(), "setup (Configure defaults)");
    }
}
