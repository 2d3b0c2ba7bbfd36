//! Column declaration for a single field.

use super::dialect::Dialect;
use crate::error::{DeclareError, DeclareResult};
use crate::transform::FieldTransform;

/// Derives a column and its declaration from a field transform.
#[derive(Debug, Clone, Copy)]
pub struct FieldDeclarator<'a> {
    field: &'a FieldTransform,
    dialect: &'a Dialect,
}

impl<'a> FieldDeclarator<'a> {
    pub fn new(field: &'a FieldTransform, dialect: &'a Dialect) -> Self {
        Self { field, dialect }
    }

    pub fn field(&self) -> &'a FieldTransform {
        self.field
    }

    /// Column name, i.e. the field's target.
    pub fn column(&self) -> DeclareResult<String> {
        Ok(self.field.target()?)
    }

    /// The dialect's storage type for the field's conversion type.
    pub fn storage_type(&self) -> DeclareResult<&'a str> {
        let type_name = self.field.type_name()?;
        self.dialect
            .storage_type(type_name)
            .ok_or_else(|| DeclareError::UnmappedStorageType {
                type_name: type_name.to_string(),
                dialect: self.dialect.name().to_string(),
            })
    }

    /// `"<column> <storage type>"`
    pub fn declaration(&self) -> DeclareResult<String> {
        Ok(format!("{} {}", self.column()?, self.storage_type()?))
    }
}
