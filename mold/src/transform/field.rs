//! Single field transformation.
//!
//! A [`FieldTransform`] turns one input record into one `(target, value)`
//! pair. Every property is derived from the wrapped [`FieldConfig`] on each
//! access, so edits made through [`FieldTransform::config_mut`] take effect
//! immediately and configuration errors surface only where they matter.

use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

use super::config::{keys, FieldConfig, Setting};
use super::record::Record;
use super::types::{text_form, Converter, TypeRegistry, DEFAULT_TYPE_NAME};
use crate::error::{FieldError, FieldResult};

/// Transformation rule for a single field.
#[derive(Debug, Clone)]
pub struct FieldTransform {
    config: FieldConfig,
    types: Arc<TypeRegistry>,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl FieldTransform {
    /// Create a transform using the standard type registry.
    pub fn new(config: FieldConfig) -> Self {
        Self::with_registry(config, TypeRegistry::shared())
    }

    /// Create a transform using a custom type registry.
    pub fn with_registry(config: FieldConfig, types: Arc<TypeRegistry>) -> Self {
        Self { config, types }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Mutable access to the config. Derived properties follow any edit.
    pub fn config_mut(&mut self) -> &mut FieldConfig {
        &mut self.config
    }

    /// Types this field can convert to.
    pub fn registry(&self) -> &TypeRegistry {
        &self.types
    }

    /// Key to read from the input record.
    pub fn source(&self) -> FieldResult<&str> {
        match self.config.get(keys::SOURCE) {
            None => Err(FieldError::MissingSource),
            Some(Value::String(source)) => Ok(source),
            Some(other) => Err(invalid_option(keys::SOURCE, "a string", other)),
        }
    }

    /// Output key: `target` if configured, else the lowercased source.
    ///
    /// The source is validated even when a target is configured.
    pub fn target(&self) -> FieldResult<String> {
        let source = self.source()?;
        match self.config.get(keys::TARGET) {
            None => Ok(source.to_lowercase()),
            Some(Value::String(target)) => Ok(target.clone()),
            Some(other) => Err(invalid_option(keys::TARGET, "a string", other)),
        }
    }

    /// Raw value that maps to null. Defaults to the empty string.
    pub fn none(&self) -> Cow<'_, Value> {
        match self.config.get(keys::NONE) {
            Some(none) => Cow::Borrowed(none),
            None => Cow::Owned(Value::String(String::new())),
        }
    }

    /// Value used when the source key is absent. Defaults to null.
    pub fn default(&self) -> Cow<'_, Value> {
        match self.config.get(keys::DEFAULT) {
            Some(default) => Cow::Borrowed(default),
            None => Cow::Owned(Value::Null),
        }
    }

    /// Characters stripped from the right. `Null` strips whitespace.
    pub fn rstrip(&self) -> FieldResult<Setting<&str>> {
        self.strip_setting(keys::RSTRIP)
    }

    /// Characters stripped from the left. `Null` strips whitespace.
    pub fn lstrip(&self) -> FieldResult<Setting<&str>> {
        self.strip_setting(keys::LSTRIP)
    }

    fn strip_setting(&self, key: &'static str) -> FieldResult<Setting<&str>> {
        match self.config.setting(key) {
            Setting::Unset => Ok(Setting::Unset),
            Setting::Null => Ok(Setting::Null),
            Setting::Value(Value::String(chars)) => Ok(Setting::Value(chars.as_str())),
            Setting::Value(other) => Err(invalid_option(key, "a string or null", other)),
        }
    }

    /// Name of the conversion type.
    pub fn type_name(&self) -> FieldResult<&str> {
        match self.config.get(keys::TYPE) {
            None => Ok(DEFAULT_TYPE_NAME),
            Some(Value::String(name)) => Ok(name),
            Some(other) => Err(FieldError::UnknownType(other.to_string())),
        }
    }

    /// Converter registered for [`type_name`](Self::type_name).
    pub fn converter(&self) -> FieldResult<Converter> {
        let name = self.type_name()?;
        self.types
            .get(name)
            .ok_or_else(|| FieldError::UnknownType(name.to_string()))
    }

    /// Compute the output value for a record.
    ///
    /// 1. An absent source yields `default` untouched.
    /// 2. A raw value equal to `none` yields null.
    /// 3. Otherwise the value is stripped (right, then left) and converted.
    pub fn value_for<R: Record + ?Sized>(&self, record: &R) -> FieldResult<Value> {
        let source = self.source()?;
        let raw = match record.lookup(source) {
            Some(raw) => raw,
            None => return Ok(self.default().into_owned()),
        };

        if values_equal(&raw, &self.none()) {
            return Ok(Value::Null);
        }

        let value = strip(raw, self.rstrip()?, Side::Right);
        let value = strip(value, self.lstrip()?, Side::Left);

        let convert = self.converter()?;
        convert(&value).map_err(|reason| FieldError::TypeConversion {
            source_key: source.to_string(),
            type_name: self.type_name().unwrap_or(DEFAULT_TYPE_NAME).to_string(),
            value: value.to_string(),
            reason,
        })
    }

    /// Produce the `(target, value)` pair for a record.
    pub fn apply<R: Record + ?Sized>(&self, record: &R) -> FieldResult<(String, Value)> {
        let target = self.target()?;
        let value = self.value_for(record)?;
        Ok((target, value))
    }
}

impl From<FieldConfig> for FieldTransform {
    fn from(config: FieldConfig) -> Self {
        Self::new(config)
    }
}

fn invalid_option(key: &'static str, expected: &'static str, found: &Value) -> FieldError {
    FieldError::InvalidOption {
        key,
        expected,
        found: found.to_string(),
    }
}

/// JSON equality, except that a float compares by numeric value (`1 == 1.0`).
/// Two integers always compare exactly.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
            matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
        }
        _ => a == b,
    }
}

/// Strip one side of the value's text form. Values without a text form, and
/// values with nothing to strip, pass through unchanged.
fn strip<'v>(value: Cow<'v, Value>, setting: Setting<&str>, side: Side) -> Cow<'v, Value> {
    let chars = match setting {
        Setting::Unset => return value,
        Setting::Null => None,
        Setting::Value(chars) => Some(chars),
    };
    let stripped = match text_form(&value) {
        Some(text) => {
            let is_strippable = |c: char| match chars {
                Some(set) => set.contains(c),
                None => c.is_whitespace(),
            };
            let trimmed = match side {
                Side::Right => text.trim_end_matches(is_strippable),
                Side::Left => text.trim_start_matches(is_strippable),
            };
            (trimmed.len() != text.len()).then(|| trimmed.to_string())
        }
        None => None,
    };
    match stripped {
        Some(stripped) => Cow::Owned(Value::String(stripped)),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(config: Value) -> FieldTransform {
        let map = config.as_object().cloned().unwrap();
        FieldTransform::new(map.into())
    }

    #[test]
    fn test_missing_source() {
        let f = field(json!({}));
        assert_eq!(f.apply(&json!({})), Err(FieldError::MissingSource));
        assert_eq!(f.apply(&json!({"amount": "1"})), Err(FieldError::MissingSource));
    }

    #[test]
    fn test_missing_source_with_target() {
        let f = field(json!({"target": "amount"}));
        assert_eq!(f.target(), Err(FieldError::MissingSource));
    }

    #[test]
    fn test_target() {
        let f = field(json!({"source": "amount", "target": "amt"}));
        assert_eq!(f.apply(&json!({})).unwrap().0, "amt");
    }

    #[test]
    fn test_target_defaults_to_lower_source() {
        let f = field(json!({"source": "Amount"}));
        assert_eq!(f.apply(&json!({})).unwrap().0, "amount");

        let f = field(json!({"source": "ÉTAT"}));
        assert_eq!(f.target().unwrap(), "état");
    }

    #[test]
    fn test_none() {
        let f = field(json!({"source": "amount", "none": "-"}));
        assert_eq!(f.value_for(&json!({"amount": "-"})).unwrap(), Value::Null);
        // The empty string is only the sentinel when `none` is unset.
        assert_eq!(f.value_for(&json!({"amount": ""})).unwrap(), json!(""));
    }

    #[test]
    fn test_none_defaults_to_empty_string() {
        let f = field(json!({"source": "amount"}));
        assert_eq!(f.value_for(&json!({"amount": ""})).unwrap(), Value::Null);
    }

    #[test]
    fn test_none_compares_numbers_by_value() {
        let f = field(json!({"source": "amount", "none": 0, "type": "int"}));
        assert_eq!(f.value_for(&json!({"amount": 0.0})).unwrap(), Value::Null);
        assert_eq!(f.value_for(&json!({"amount": "0"})).unwrap(), json!(0));
    }

    #[test]
    fn test_none_compares_integers_exactly() {
        // Both round to the same f64.
        let f = field(json!({"source": "id", "none": 9007199254740992_u64, "type": "int"}));
        assert_eq!(
            f.value_for(&json!({"id": 9007199254740993_u64})).unwrap(),
            json!(9007199254740993_u64)
        );
        assert_eq!(f.value_for(&json!({"id": 9007199254740992_u64})).unwrap(), Value::Null);
        assert_eq!(f.value_for(&json!({"id": 9007199254740992.0})).unwrap(), Value::Null);
    }

    #[test]
    fn test_none_is_checked_before_strip() {
        let f = field(json!({"source": "amount", "rstrip": " "}));
        assert_eq!(f.value_for(&json!({"amount": " "})).unwrap(), json!(""));
    }

    #[test]
    fn test_default() {
        let f = field(json!({"source": "amount", "default": 0}));
        assert_eq!(f.value_for(&json!({})).unwrap(), json!(0));
    }

    #[test]
    fn test_default_defaults_to_null() {
        let f = field(json!({"source": "amount"}));
        assert_eq!(f.value_for(&json!({})).unwrap(), Value::Null);
    }

    #[test]
    fn test_default_skips_conversion() {
        let f = field(json!({"source": "amount", "type": "int", "default": "x", "rstrip": "x"}));
        assert_eq!(f.value_for(&json!({})).unwrap(), json!("x"));

        let f = field(json!({"source": "amount", "type": "bogus", "default": 1}));
        assert_eq!(f.value_for(&json!({})).unwrap(), json!(1));
    }

    #[test]
    fn test_rstrip() {
        let f = field(json!({"source": "amount", "rstrip": " dollars"}));
        assert_eq!(f.value_for(&json!({"amount": "100 dollars"})).unwrap(), json!("100"));
    }

    #[test]
    fn test_lstrip() {
        let f = field(json!({"source": "amount", "lstrip": "$"}));
        assert_eq!(f.value_for(&json!({"amount": "$100"})).unwrap(), json!("100"));
    }

    #[test]
    fn test_strip_empty_vs_null() {
        let f = field(json!({"source": "a", "rstrip": "", "lstrip": ""}));
        assert_eq!(f.value_for(&json!({"a": " x "})).unwrap(), json!(" x "));

        let f = field(json!({"source": "a", "rstrip": null, "lstrip": null}));
        assert_eq!(f.value_for(&json!({"a": " x\t"})).unwrap(), json!("x"));

        let f = field(json!({"source": "a"}));
        assert_eq!(f.value_for(&json!({"a": " x "})).unwrap(), json!(" x "));
    }

    #[test]
    fn test_strip_both_sides() {
        let f = field(json!({"source": "a", "rstrip": "-", "lstrip": "#0"}));
        assert_eq!(f.value_for(&json!({"a": "#007--"})).unwrap(), json!("7"));
        assert_eq!(f.rstrip().unwrap(), Setting::Value("-"));
        assert_eq!(f.lstrip().unwrap(), Setting::Value("#0"));
    }

    #[test]
    fn test_strip_then_int() {
        let f = field(json!({"source": "amount", "lstrip": "$", "rstrip": " USD", "type": "int"}));
        assert_eq!(f.value_for(&json!({"amount": "$250 USD"})).unwrap(), json!(250));
    }

    #[test]
    fn test_strip_numbers_use_text_form() {
        let f = field(json!({"source": "amount", "rstrip": "0"}));
        assert_eq!(f.value_for(&json!({"amount": 100})).unwrap(), json!("1"));
    }

    #[test]
    fn test_strip_with_nothing_to_remove_keeps_type() {
        let f = field(json!({"source": "a", "rstrip": "x", "lstrip": null, "type": "int"}));
        assert_eq!(f.value_for(&json!({"a": 1.0})).unwrap(), json!(1));
        assert_eq!(f.value_for(&json!({"a": true})).unwrap(), json!(1));

        let f = field(json!({"source": "a", "rstrip": "x", "type": "float"}));
        assert_eq!(f.value_for(&json!({"a": false})).unwrap(), json!(0.0));
    }

    #[test]
    fn test_strip_booleans_use_text_form() {
        let f = field(json!({"source": "a", "rstrip": "e"}));
        assert_eq!(f.value_for(&json!({"a": true})).unwrap(), json!("Tru"));
    }

    #[test]
    fn test_invalid_strip_option() {
        let f = field(json!({"source": "a", "rstrip": 5}));
        assert!(matches!(
            f.value_for(&json!({"a": "x"})),
            Err(FieldError::InvalidOption { key: "rstrip", .. })
        ));
    }

    #[test]
    fn test_invalid_data_type() {
        let f = field(json!({"source": "amount", "type": "integer"}));
        assert_eq!(
            f.value_for(&json!({"amount": 100})),
            Err(FieldError::UnknownType("integer".to_string()))
        );

        let f = field(json!({"source": "amount", "type": 3}));
        assert!(matches!(
            f.value_for(&json!({"amount": 100})),
            Err(FieldError::UnknownType(_))
        ));
    }

    #[test]
    fn test_data_type_defaults_to_unicode() {
        let f = field(json!({"source": "Amount"}));
        assert_eq!(f.type_name().unwrap(), "unicode");
        assert_eq!(
            f.apply(&json!({"Amount": 100})).unwrap(),
            ("amount".to_string(), json!("100"))
        );
    }

    #[test]
    fn test_data_type() {
        let f = field(json!({"source": "amount", "type": "int"}));
        assert_eq!(f.value_for(&json!({"amount": "100"})).unwrap(), json!(100));

        let f = field(json!({"source": "amount", "type": "float"}));
        assert_eq!(f.value_for(&json!({"amount": "1.25"})).unwrap(), json!(1.25));
    }

    #[test]
    fn test_type_conversion_error() {
        let f = field(json!({"source": "amount", "type": "int"}));
        let err = f.value_for(&json!({"amount": "abc"})).unwrap_err();
        match err {
            FieldError::TypeConversion { source_key, type_name, value, .. } => {
                assert_eq!(source_key, "amount");
                assert_eq!(type_name, "int");
                assert_eq!(value, "\"abc\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            f.value_for(&json!({"amount": [1, 2]})),
            Err(FieldError::TypeConversion { .. })
        ));
    }

    #[test]
    fn test_precedence_default() {
        let f = field(json!({"source": "amount", "none": "-", "default": 0}));
        assert_eq!(f.value_for(&json!({})).unwrap(), json!(0));
    }

    #[test]
    fn test_precedence_none() {
        let f = field(json!({"source": "amount", "none": "-", "default": 0}));
        assert_eq!(f.value_for(&json!({"amount": "-"})).unwrap(), Value::Null);
    }

    #[test]
    fn test_config_mutation_is_observed() {
        let mut f = field(json!({"source": "Amount"}));
        assert_eq!(f.target().unwrap(), "amount");

        f.config_mut().insert(keys::TARGET, "amt");
        f.config_mut().insert(keys::TYPE, "int");
        assert_eq!(
            f.apply(&json!({"Amount": "7"})).unwrap(),
            ("amt".to_string(), json!(7))
        );

        f.config_mut().remove(keys::TARGET);
        assert_eq!(f.target().unwrap(), "amount");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let f = field(json!({"source": "amount", "rstrip": "$", "type": "float"}));
        let record = json!({"amount": "9.5$"});
        assert_eq!(f.apply(&record).unwrap(), f.apply(&record).unwrap());
    }

    #[test]
    fn test_custom_registry() {
        fn upper(value: &Value) -> Result<Value, String> {
            value
                .as_str()
                .map(|s| Value::String(s.to_uppercase()))
                .ok_or_else(|| "expected text".to_string())
        }

        let mut registry = TypeRegistry::standard();
        registry.register("upper", upper);
        let f = FieldTransform::with_registry(
            FieldConfig::from_source("code").with_type("upper"),
            Arc::new(registry),
        );
        assert!(f.registry().contains("upper"));
        assert!(!field(json!({"source": "code"})).registry().contains("upper"));
        assert_eq!(f.value_for(&json!({"code": "fr"})).unwrap(), json!("FR"));
    }
}
