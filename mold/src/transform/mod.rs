//! Transformation module.
//!
//! - `config`: field and row configuration
//! - `types`: conversion type registry
//! - `record`: input record abstraction
//! - `field`: single field transform
//! - `row`: whole-row transform
//! - `pipeline`: CSV to molded records

pub mod config;
pub mod field;
pub mod pipeline;
pub mod record;
pub mod row;
pub mod types;

pub use config::{keys, FieldConfig, RowConfig, Setting};
pub use field::FieldTransform;
pub use pipeline::*;
pub use record::Record;
pub use row::RowTransform;
pub use types::{Converter, TypeRegistry, DEFAULT_TYPE_NAME};
