//! Field and row configuration.
//!
//! A [`FieldConfig`] is an ordered JSON object of field options. It is kept as
//! a raw map rather than a typed struct: options are interpreted on every
//! access by [`FieldTransform`](super::field::FieldTransform), so a missing or
//! malformed option only fails the operation that needs it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ConfigResult;

/// Recognized option keys.
pub mod keys {
    pub const SOURCE: &str = "source";
    pub const TARGET: &str = "target";
    pub const NONE: &str = "none";
    pub const DEFAULT: &str = "default";
    pub const RSTRIP: &str = "rstrip";
    pub const LSTRIP: &str = "lstrip";
    pub const TYPE: &str = "type";

    /// Every key a field config understands.
    pub const ALL: [&str; 7] = [SOURCE, TARGET, NONE, DEFAULT, RSTRIP, LSTRIP, TYPE];
}

/// Three-state view of an optional option.
///
/// `Null` is distinct from `Unset`: a key present with a JSON null is a
/// deliberate configuration, an absent key is not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting<T> {
    Unset,
    Null,
    Value(T),
}

impl<T> Setting<T> {
    /// Whether the option is present in the config, null included.
    pub fn is_configured(&self) -> bool {
        !matches!(self, Setting::Unset)
    }
}

impl<'a> From<Option<&'a Value>> for Setting<&'a Value> {
    fn from(value: Option<&'a Value>) -> Self {
        match value {
            None => Setting::Unset,
            Some(Value::Null) => Setting::Null,
            Some(v) => Setting::Value(v),
        }
    }
}

/// Options for a single field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldConfig(Map<String, Value>);

impl FieldConfig {
    /// Create an empty config (which has no `source` yet).
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Create a config reading from the given source key.
    pub fn from_source(source: &str) -> Self {
        Self::new().with(keys::SOURCE, source)
    }

    /// Set an arbitrary option.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn with_target(self, target: &str) -> Self {
        self.with(keys::TARGET, target)
    }

    pub fn with_none(self, none: impl Into<Value>) -> Self {
        self.with(keys::NONE, none)
    }

    pub fn with_default(self, default: impl Into<Value>) -> Self {
        self.with(keys::DEFAULT, default)
    }

    pub fn with_rstrip(self, chars: &str) -> Self {
        self.with(keys::RSTRIP, chars)
    }

    pub fn with_lstrip(self, chars: &str) -> Self {
        self.with(keys::LSTRIP, chars)
    }

    pub fn with_type(self, type_name: &str) -> Self {
        self.with(keys::TYPE, type_name)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Three-state lookup of an option.
    pub fn setting(&self, key: &str) -> Setting<&Value> {
        self.0.get(key).into()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.to_string(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Keys present in the config that no field option recognizes.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|k| !keys::ALL.contains(k))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for FieldConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Ordered field configs for a whole row.
///
/// Order drives output key order and column order. Neither sources nor
/// targets are required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowConfig(Vec<FieldConfig>);

impl RowConfig {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a row config from a JSON array of field objects.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a row config from a JSON value.
    pub fn from_value(value: &Value) -> ConfigResult<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Read and parse a row config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn push(&mut self, field: FieldConfig) {
        self.0.push(field);
    }

    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.0.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldConfig] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldConfig> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<FieldConfig>> for RowConfig {
    fn from(fields: Vec<FieldConfig>) -> Self {
        Self(fields)
    }
}

impl FromIterator<FieldConfig> for RowConfig {
    fn from_iter<I: IntoIterator<Item = FieldConfig>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RowConfig {
    type Item = FieldConfig;
    type IntoIter = std::vec::IntoIter<FieldConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RowConfig {
    type Item = &'a FieldConfig;
    type IntoIter = std::slice::Iter<'a, FieldConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
