//! # Mold - config-driven record transforms and SQL declarations
//!
//! Mold reshapes loosely typed records (typically CSV rows) into clean,
//! typed records, and derives the matching `CREATE TABLE` / `INSERT`
//! statements from the same configuration.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│ JSON / SQL  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (row config)│     │  (declare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mold::{Dialect, RowConfig, RowDeclarator, RowTransform};
//! use serde_json::json;
//!
//! let row = RowTransform::new(RowConfig::from_value(&json!([
//!     {"source": "First"},
//!     {"source": "Age", "type": "int"},
//! ]))?);
//!
//! let record = json!({"First": "Ada", "Age": "36"});
//! assert_eq!(row.apply(&record)?["age"], json!(36));
//!
//! let sqlite = Dialect::sqlite();
//! let declarator = RowDeclarator::new(&row, &sqlite);
//! assert_eq!(
//!     declarator.create_statement("people")?,
//!     "CREATE TABLE people (first TEXT, age INTEGER)"
//! );
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`transform`] - Field and row transforms, type registry, pipeline
//! - [`declare`] - Column declarations and statement templates
//! - [`parser`] - CSV parsing with auto-detection
//! - [`check`] - Schema validation and linting of configurations
//! - `sqlite` - Statement execution against SQLite (feature `sqlite`)

// Core modules
pub mod error;

// Transformation
pub mod transform;

// SQL declaration
pub mod declare;

// Parsing
pub mod parser;

// Configuration checks
pub mod check;

// Execution
#[cfg(feature = "sqlite")]
pub mod sqlite;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, CsvError, CsvResult, DeclareError, DeclareResult, FieldError,
    FieldResult, PipelineError, PipelineResult,
};

#[cfg(feature = "sqlite")]
pub use error::{ExecuteError, ExecuteResult};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    keys, Converter, FieldConfig, FieldTransform, Record, RowConfig, RowTransform, Setting,
    TypeRegistry, DEFAULT_TYPE_NAME,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    mold_csv_bytes, mold_csv_file, mold_parsed, mold_records, CsvInfo, MoldOutput,
};

// =============================================================================
// Re-exports - Declare
// =============================================================================

pub use declare::{
    Dialect, FieldDeclarator, Placeholder, RowDeclarator, DEFAULT_CREATE_TEMPLATE,
    DEFAULT_INSERT_TEMPLATE,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file,
    parse_str, CsvRecord, ParseResult,
};

// =============================================================================
// Re-exports - Checks
// =============================================================================

pub use check::{check_row_config, lint, validate_row_config, Finding};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteExecutor;
