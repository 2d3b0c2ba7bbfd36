//! Error types for mold.
//!
//! The hierarchy mirrors the layers of the crate:
//!
//! - [`FieldError`] - field configuration and value conversion errors
//! - [`DeclareError`] - column declaration and statement rendering errors
//! - [`ConfigError`] - loading and checking configuration documents
//! - [`CsvError`] - CSV reading errors
//! - [`ExecuteError`] - SQLite execution errors (feature `sqlite`)
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Lower layers convert into upper ones through `From`, so `?` works across
//! module boundaries. Nothing in the crate catches these errors.

use thiserror::Error;

// =============================================================================
// Field Errors
// =============================================================================

/// Errors raised while deriving a field's properties or computing its value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The field config has no `source` key.
    #[error("Field config does not specify a `source` key")]
    MissingSource,

    /// An option is present but has the wrong JSON type.
    #[error("Field option `{key}` must be {expected}, found {found}")]
    InvalidOption {
        key: &'static str,
        expected: &'static str,
        found: String,
    },

    /// The `type` option names no registered conversion type.
    #[error("Field config contains an invalid value for `type`: {0}")]
    UnknownType(String),

    /// The raw value could not be converted to the field's type.
    #[error("Cannot convert {value} from `{source_key}` to `{type_name}`: {reason}")]
    TypeConversion {
        source_key: String,
        type_name: String,
        value: String,
        reason: String,
    },
}

// =============================================================================
// Declaration Errors
// =============================================================================

/// Errors raised while declaring columns or rendering statements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclareError {
    /// The underlying field transform failed.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The conversion type has no storage type in the dialect.
    #[error("Type `{type_name}` has no storage type in the {dialect} dialect")]
    UnmappedStorageType { type_name: String, dialect: String },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading or checking a row configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not a JSON array of objects.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document violates the configuration schema.
    #[error("Config failed schema check: {}", .errors.join("; "))]
    Schema { errors: Vec<String> },
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors during CSV reading.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Empty input.
    #[error("CSV input is empty")]
    Empty,

    /// No usable header row.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// The delimiter is not a single ASCII character.
    #[error("Delimiter '{0}' is not an ASCII character")]
    InvalidDelimiter(char),

    /// Malformed CSV content.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },
}

// =============================================================================
// Execution Errors
// =============================================================================

/// Errors from executing statements against SQLite.
#[cfg(feature = "sqlite")]
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Statement rendering or value extraction failed.
    #[error("Declaration error: {0}")]
    Declare(#[from] DeclareError),

    /// The database rejected a statement.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A record failed during a batch insert; the batch was rolled back.
    #[error("Record {index} failed: {source}")]
    Row {
        index: usize,
        #[source]
        source: Box<ExecuteError>,
    },
}

#[cfg(feature = "sqlite")]
impl From<FieldError> for ExecuteError {
    fn from(err: FieldError) -> Self {
        ExecuteError::Declare(err.into())
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by the pipeline and the CLI.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Field error outside of a record batch.
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// Declaration error.
    #[error("Declaration error: {0}")]
    Declare(#[from] DeclareError),

    /// SQLite execution error.
    #[cfg(feature = "sqlite")]
    #[error("Execution error: {0}")]
    Execute(#[from] ExecuteError),

    /// A record failed to transform; the batch was aborted.
    #[error("Record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: FieldError,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for field operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// Result type for declaration operations.
pub type DeclareResult<T> = Result<T, DeclareError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for SQLite execution.
#[cfg(feature = "sqlite")]
pub type ExecuteResult<T> = Result<T, ExecuteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
