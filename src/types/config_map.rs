use crate::error::MockdbError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Untyped configuration bag exchanged with the host. Returned maps are the
/// state the host persists.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A single configuration value as the host stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    /// Weak string coercion: numbers are formatted, booleans become `1`/`0`.
    pub fn coerce_string(&self) -> String {
        match self {
            ConfigValue::String(s) => s.clone(),
            ConfigValue::Int(i) => i.to_string(),
            ConfigValue::Float(f) => f.to_string(),
            ConfigValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        }
    }

    /// Weak unsigned coercion. Empty strings decode to zero.
    pub fn coerce_u32(&self) -> Option<u32> {
        match self {
            ConfigValue::String(s) if s.trim().is_empty() => Some(0),
            ConfigValue::String(s) => s.trim().parse().ok(),
            ConfigValue::Int(i) => u32::try_from(*i).ok(),
            ConfigValue::Float(f) if *f >= 0.0 && *f <= u32::MAX as f64 => Some(*f as u32),
            ConfigValue::Float(_) => None,
            ConfigValue::Bool(b) => Some(u32::from(*b)),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl TryFrom<Value> for ConfigValue {
    type Error = MockdbError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(ConfigValue::String(s)),
            Value::Bool(b) => Ok(ConfigValue::Bool(b)),
            Value::Number(n) => n
                .as_i64()
                .map(ConfigValue::Int)
                .or_else(|| n.as_f64().map(ConfigValue::Float))
                .ok_or_else(|| MockdbError::Validation(format!("unsupported number {n}"))),
            other => Err(MockdbError::Validation(format!(
                "unsupported configuration value: {other}"
            ))),
        }
    }
}

/// Convert a host JSON object into a [`ConfigMap`].
pub fn config_map_from_json(value: Value) -> Result<ConfigMap, MockdbError> {
    let Value::Object(obj) = value else {
        return Err(MockdbError::Validation(
            "configuration must be a JSON object".to_string(),
        ));
    };
    obj.into_iter()
        .map(|(k, v)| Ok((k, ConfigValue::try_from(v)?)))
        .collect()
}

/// Case-insensitive key lookup, matching how the host's keys are decoded.
pub fn lookup<'a>(map: &'a ConfigMap, key: &str) -> Option<&'a ConfigValue> {
    lookup_key(map, key).and_then(|k| map.get(k))
}

/// The stored spelling of `key` that [`lookup`] would match.
pub fn lookup_key<'a>(map: &'a ConfigMap, key: &str) -> Option<&'a str> {
    match map.get_key_value(key) {
        Some((k, _)) => Some(k.as_str()),
        None => map
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .map(String::as_str),
    }
}
