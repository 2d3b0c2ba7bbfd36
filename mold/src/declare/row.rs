//! Table declaration and statements for a whole row.

use log::debug;
use serde_json::Value;

use super::dialect::Dialect;
use super::field::FieldDeclarator;
use crate::error::DeclareResult;
use crate::transform::{Record, RowTransform};

/// Derives column lists and statements from a row transform.
///
/// Nothing here touches a database: statements are returned as text and
/// values as an ordered sequence for an executor to bind.
#[derive(Debug, Clone)]
pub struct RowDeclarator<'a> {
    row: &'a RowTransform,
    dialect: &'a Dialect,
    fields: Vec<FieldDeclarator<'a>>,
}

impl<'a> RowDeclarator<'a> {
    pub fn new(row: &'a RowTransform, dialect: &'a Dialect) -> Self {
        let fields = row
            .iter()
            .map(|field| FieldDeclarator::new(field, dialect))
            .collect();
        Self {
            row,
            dialect,
            fields,
        }
    }

    pub fn dialect(&self) -> &'a Dialect {
        self.dialect
    }

    pub fn fields(&self) -> &[FieldDeclarator<'a>] {
        &self.fields
    }

    /// Column names in field order.
    pub fn columns(&self) -> DeclareResult<Vec<String>> {
        self.fields.iter().map(FieldDeclarator::column).collect()
    }

    /// Comma-space joined column names.
    pub fn column_list(&self) -> DeclareResult<String> {
        Ok(self.columns()?.join(", "))
    }

    /// Comma-space joined column declarations.
    pub fn declaration_list(&self) -> DeclareResult<String> {
        let declarations = self
            .fields
            .iter()
            .map(FieldDeclarator::declaration)
            .collect::<DeclareResult<Vec<_>>>()?;
        Ok(declarations.join(", "))
    }

    /// One placeholder per field.
    pub fn placeholder_list(&self) -> String {
        self.dialect.placeholder_list(self.fields.len())
    }

    pub fn create_statement(&self, table: &str) -> DeclareResult<String> {
        let sql = self
            .dialect
            .render_create(table, &self.declaration_list()?);
        debug!("Rendered create statement: {}", sql);
        Ok(sql)
    }

    pub fn insert_statement(&self, table: &str) -> DeclareResult<String> {
        let sql = self.dialect.render_insert(
            table,
            &self.column_list()?,
            &self.placeholder_list(),
        );
        debug!("Rendered insert statement: {}", sql);
        Ok(sql)
    }

    /// Values to bind to the insert statement, in column order.
    pub fn insert_values<R: Record + ?Sized>(&self, record: &R) -> DeclareResult<Vec<Value>> {
        Ok(self.row.values(record)?)
    }
}
