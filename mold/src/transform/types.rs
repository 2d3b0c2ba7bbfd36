//! Conversion types.
//!
//! A [`TypeRegistry`] maps the names accepted by a field's `type` option to
//! converter functions. Fields hold the registry behind an `Arc`, so one table
//! is shared by every field of a row and custom types can be registered
//! without touching the transform code.

use once_cell::sync::Lazy;
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Converts a (possibly stripped) raw value into a typed output value.
///
/// The error string is the reason shown to the user.
pub type Converter = fn(&Value) -> Result<Value, String>;

/// Type used when a field does not configure `type`.
pub const DEFAULT_TYPE_NAME: &str = "unicode";

static STANDARD: Lazy<Arc<TypeRegistry>> = Lazy::new(|| Arc::new(TypeRegistry::standard()));

/// Name to converter table.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    converters: BTreeMap<String, Converter>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in types: `unicode`, `str`, `int` and `float`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register("unicode", to_unicode)
            .register("str", to_str)
            .register("int", to_int)
            .register("float", to_float);
        registry
    }

    /// Shared handle to the standard registry.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&STANDARD)
    }

    /// Add or replace a type.
    pub fn register(&mut self, name: &str, converter: Converter) -> &mut Self {
        self.converters.insert(name.to_string(), converter);
        self
    }

    pub fn get(&self, name: &str) -> Option<Converter> {
        self.converters.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }
}

/// Text form of a scalar value. Booleans read `True` and `False`; null and
/// nested values have none.
pub(crate) fn text_form(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("True")),
        Value::Bool(false) => Some(Cow::Borrowed("False")),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn require_text(value: &Value) -> Result<Cow<'_, str>, String> {
    text_form(value).ok_or_else(|| unsupported(value))
}

fn unsupported(value: &Value) -> String {
    match value {
        Value::Null => "null cannot be converted".to_string(),
        Value::Array(_) => "arrays are not supported".to_string(),
        Value::Object(_) => "objects are not supported".to_string(),
        _ => format!("unsupported value {value}"),
    }
}

/// Text type.
pub fn to_unicode(value: &Value) -> Result<Value, String> {
    Ok(Value::String(require_text(value)?.into_owned()))
}

/// Byte string type: text restricted to ASCII.
pub fn to_str(value: &Value) -> Result<Value, String> {
    let text = require_text(value)?;
    if text.is_ascii() {
        Ok(Value::String(text.into_owned()))
    } else {
        Err("text contains non-ASCII characters".to_string())
    }
}

/// 64-bit signed integer type. Floats are truncated toward zero.
pub fn to_int(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| format!("invalid integer literal ({e})")),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::from(i)),
            None => n
                .as_f64()
                .ok_or_else(|| format!("unsupported number {n}"))
                .and_then(truncate),
        },
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        other => Err(unsupported(other)),
    }
}

fn truncate(f: f64) -> Result<Value, String> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(Value::from(f.trunc() as i64))
    } else {
        Err(format!("{f} is out of integer range"))
    }
}

/// 64-bit float type. Non-finite results are rejected.
pub fn to_float(value: &Value) -> Result<Value, String> {
    let f = match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid float literal ({e})"))?,
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("unsupported number {n}"))?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        other => return Err(unsupported(other)),
    };
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| format!("{f} is not a finite number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_names() {
        let registry = TypeRegistry::standard();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["float", "int", "str", "unicode"]);
        assert!(registry.contains(DEFAULT_TYPE_NAME));
    }

    #[test]
    fn test_unicode() {
        assert_eq!(to_unicode(&json!("héllo")).unwrap(), json!("héllo"));
        assert_eq!(to_unicode(&json!(100)).unwrap(), json!("100"));
        assert_eq!(to_unicode(&json!(1.5)).unwrap(), json!("1.5"));
        assert_eq!(to_unicode(&json!(true)).unwrap(), json!("True"));
        assert_eq!(to_str(&json!(false)).unwrap(), json!("False"));
        assert!(to_unicode(&Value::Null).is_err());
    }

    #[test]
    fn test_str_rejects_non_ascii() {
        assert_eq!(to_str(&json!("plain")).unwrap(), json!("plain"));
        assert!(to_str(&json!("Société")).is_err());
    }

    #[test]
    fn test_int() {
        assert_eq!(to_int(&json!("100")).unwrap(), json!(100));
        assert_eq!(to_int(&json!(" -42 ")).unwrap(), json!(-42));
        assert_eq!(to_int(&json!(4.7)).unwrap(), json!(4));
        assert_eq!(to_int(&json!(-4.7)).unwrap(), json!(-4));
        assert_eq!(to_int(&json!(true)).unwrap(), json!(1));
        assert!(to_int(&json!("4.5")).is_err());
        assert!(to_int(&json!("abc")).is_err());
        assert!(to_int(&json!(1e300)).is_err());
        assert!(to_int(&json!([1])).is_err());
    }

    #[test]
    fn test_float() {
        assert_eq!(to_float(&json!("1.5")).unwrap(), json!(1.5));
        assert_eq!(to_float(&json!(" 2 ")).unwrap(), json!(2.0));
        assert_eq!(to_float(&json!(3)).unwrap(), json!(3.0));
        assert!(to_float(&json!("inf")).is_err());
        assert!(to_float(&json!("NaN")).is_err());
        assert!(to_float(&json!("1,5")).is_err());
        assert!(to_float(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_register_custom_type() {
        fn to_bool(value: &Value) -> Result<Value, String> {
            match value.as_str() {
                Some("yes") => Ok(json!(true)),
                Some("no") => Ok(json!(false)),
                _ => Err("expected yes or no".to_string()),
            }
        }

        let mut registry = TypeRegistry::standard();
        registry.register("yesno", to_bool);
        let converter = registry.get("yesno").unwrap();
        assert_eq!(converter(&json!("yes")).unwrap(), json!(true));
        assert!(TypeRegistry::shared().get("yesno").is_none());
    }
}
