//! Table declarations and statements.
//!
//! Declarators derive schema text from transforms without executing
//! anything:
//! - `dialect`: storage engine description (type names, placeholders, templates)
//! - `field`: column name and declaration for one field
//! - `row`: column lists, create-table and insert statements for a row
//!
//! ## Example
//!
//! ```rust,ignore
//! use mold::{Dialect, RowConfig, RowDeclarator, RowTransform};
//!
//! let row = RowTransform::new(RowConfig::from_json(r#"[{"source": "Age", "type": "int"}]"#)?);
//! let dialect = Dialect::sqlite();
//! let declarator = RowDeclarator::new(&row, &dialect);
//!
//! assert_eq!(declarator.create_statement("people")?, "CREATE TABLE people (age INTEGER)");
//! ```

pub mod dialect;
pub mod field;
pub mod row;

pub use dialect::{Dialect, Placeholder, DEFAULT_CREATE_TEMPLATE, DEFAULT_INSERT_TEMPLATE};
pub use field::FieldDeclarator;
pub use row::RowDeclarator;
