//! Up-front checks for row configurations.
//!
//! Field transforms report configuration problems lazily, only when a value
//! is needed. These checks report everything at once, before any record is
//! read:
//!
//! - [`validate_row_config`] checks a raw document against the embedded JSON
//!   Schema (`schemas/row-config.json`, draft 7)
//! - [`lint`] inspects a built [`RowTransform`] for unknown option keys,
//!   invalid options, unknown types, storage types missing from a dialect and
//!   duplicate targets
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use mold::check::validate_row_config;
//!
//! assert!(validate_row_config(&json!([{"source": "Age", "type": "int"}])).is_ok());
//! assert!(validate_row_config(&json!([{"target": "age"}])).is_err());
//! ```

use log::warn;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;

use crate::declare::{Dialect, FieldDeclarator};
use crate::error::{ConfigError, ConfigResult, DeclareError, FieldError};
use crate::transform::{RowConfig, RowTransform};

static ROW_CONFIG_SCHEMA: Lazy<Result<Value, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/row-config.json"))
        .map_err(|e| format!("Invalid embedded schema: {e}"))
});

/// Validate a JSON value against a JSON Schema (draft 7).
///
/// Returns every violation, not just the first.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a configuration document against the row configuration schema.
pub fn validate_row_config(data: &Value) -> Result<(), Vec<String>> {
    let schema = ROW_CONFIG_SCHEMA.as_ref().map_err(|e| vec![e.clone()])?;
    validate(schema, data)
}

/// Validate then load a configuration document.
pub fn check_row_config(data: &Value) -> ConfigResult<RowConfig> {
    validate_row_config(data).map_err(|errors| ConfigError::Schema { errors })?;
    RowConfig::from_value(data)
}

/// A problem found by [`lint`]. Field positions are 0-based.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// The field config has a key no option recognizes.
    UnknownKey { field: usize, key: String },
    /// An option is missing or malformed, or the type is unknown.
    InvalidField { field: usize, error: FieldError },
    /// The field's type has no storage type in the dialect.
    Unstorable { field: usize, error: DeclareError },
    /// Several fields write the same output key; the last one wins.
    DuplicateTarget { target: String, fields: Vec<usize> },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::UnknownKey { field, key } => {
                write!(f, "Field {}: unknown option `{}`", field, key)
            }
            Finding::InvalidField { field, error } => write!(f, "Field {}: {}", field, error),
            Finding::Unstorable { field, error } => write!(f, "Field {}: {}", field, error),
            Finding::DuplicateTarget { target, fields } => {
                let positions: Vec<String> = fields.iter().map(usize::to_string).collect();
                write!(
                    f,
                    "Target `{}` is written by fields {}; the last one wins",
                    target,
                    positions.join(", ")
                )
            }
        }
    }
}

/// Inspect every field of a row without touching any record.
///
/// When a dialect is given, storage types are checked too.
pub fn lint(row: &RowTransform, dialect: Option<&Dialect>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut targets: Vec<(String, Vec<usize>)> = Vec::new();

    for (index, field) in row.iter().enumerate() {
        for key in field.config().unknown_keys() {
            findings.push(Finding::UnknownKey {
                field: index,
                key: key.to_string(),
            });
        }

        match field.target() {
            Ok(target) => {
                let position = targets.iter().position(|(t, _)| *t == target);
                match position {
                    Some(position) => targets[position].1.push(index),
                    None => targets.push((target, vec![index])),
                }
            }
            Err(error) => findings.push(Finding::InvalidField { field: index, error }),
        }

        let options = [
            field.rstrip().err(),
            field.lstrip().err(),
            field.converter().err(),
        ];
        findings.extend(
            options
                .into_iter()
                .flatten()
                .map(|error| Finding::InvalidField { field: index, error }),
        );

        if let Some(dialect) = dialect {
            match FieldDeclarator::new(field, dialect).storage_type() {
                Err(error @ DeclareError::UnmappedStorageType { .. }) => {
                    findings.push(Finding::Unstorable { field: index, error })
                }
                // Field errors were reported above.
                Err(DeclareError::Field(_)) | Ok(_) => {}
            }
        }
    }

    findings.extend(
        targets
            .into_iter()
            .filter(|(_, fields)| fields.len() > 1)
            .map(|(target, fields)| Finding::DuplicateTarget { target, fields }),
    );

    for finding in &findings {
        warn!("{}", finding);
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(config: Value) -> RowTransform {
        RowTransform::new(RowConfig::from_value(&config).unwrap())
    }

    #[test]
    fn test_valid_config() {
        let config = json!([
            {"source": "First"},
            {"source": "Age", "type": "int", "none": "-", "default": 0},
            {"source": "Amt", "target": "amount", "rstrip": null, "lstrip": "$"}
        ]);
        assert!(validate_row_config(&config).is_ok());
        assert_eq!(check_row_config(&config).unwrap().len(), 3);
    }

    #[test]
    fn test_schema_reports_every_violation() {
        let config = json!([
            {"target": "age"},
            {"source": 5},
            {"source": "x", "rstrip": 1}
        ]);
        let errors = validate_row_config(&config).unwrap_err();
        assert!(errors.len() >= 3, "errors: {:?}", errors);
    }

    #[test]
    fn test_schema_rejects_non_array() {
        assert!(validate_row_config(&json!({"source": "x"})).is_err());
        assert!(matches!(
            check_row_config(&json!("fields")),
            Err(ConfigError::Schema { .. })
        ));
    }

    #[test]
    fn test_lint_clean_row() {
        let r = row(json!([{"source": "A"}, {"source": "B", "type": "int"}]));
        assert!(lint(&r, Some(&Dialect::sqlite())).is_empty());
    }

    #[test]
    fn test_lint_duplicate_targets() {
        let r = row(json!([
            {"source": "Amount"},
            {"source": "Name"},
            {"source": "AMOUNT"}
        ]));
        assert_eq!(
            lint(&r, None),
            vec![Finding::DuplicateTarget {
                target: "amount".to_string(),
                fields: vec![0, 2],
            }]
        );
    }

    #[test]
    fn test_lint_field_problems() {
        let r = row(json!([
            {"target": "x"},
            {"source": "b", "type": "date", "strip": " "},
            {"source": "c", "lstrip": 3}
        ]));
        let findings = lint(&r, None);

        assert!(findings.contains(&Finding::InvalidField {
            field: 0,
            error: FieldError::MissingSource,
        }));
        assert!(findings.contains(&Finding::UnknownKey {
            field: 1,
            key: "strip".to_string(),
        }));
        assert!(findings.contains(&Finding::InvalidField {
            field: 1,
            error: FieldError::UnknownType("date".to_string()),
        }));
        assert!(findings
            .iter()
            .any(|f| matches!(f, Finding::InvalidField { field: 2, error: FieldError::InvalidOption { key: "lstrip", .. } })));
    }

    #[test]
    fn test_lint_unstorable_type() {
        let r = row(json!([{"source": "a", "type": "float"}]));
        let dialect = Dialect::new("text-only").map_type("unicode", "TEXT");
        let findings = lint(&r, Some(&dialect));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].to_string().contains("text-only"));
    }
}
