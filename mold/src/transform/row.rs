//! Whole-row transformation.

use log::debug;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::config::RowConfig;
use super::field::FieldTransform;
use super::record::Record;
use super::types::TypeRegistry;
use crate::error::FieldResult;

/// Ordered field transforms, one per configured field.
#[derive(Debug, Clone, Default)]
pub struct RowTransform {
    fields: Vec<FieldTransform>,
}

impl RowTransform {
    /// Build a row transform with the standard type registry.
    pub fn new(config: RowConfig) -> Self {
        Self::with_registry(config, TypeRegistry::shared())
    }

    /// Build a row transform whose fields share a custom type registry.
    pub fn with_registry(config: RowConfig, types: Arc<TypeRegistry>) -> Self {
        let fields: Vec<_> = config
            .into_iter()
            .map(|field| FieldTransform::with_registry(field, Arc::clone(&types)))
            .collect();
        debug!("Built row transform with {} fields", fields.len());
        Self { fields }
    }

    /// Transform a record into an ordered output record.
    ///
    /// Keys follow configuration order. When two fields share a target, the
    /// key keeps its first position and the later field's value. The first
    /// failing field aborts the whole row.
    pub fn apply<R: Record + ?Sized>(&self, record: &R) -> FieldResult<Map<String, Value>> {
        let mut output = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            let (target, value) = field.apply(record)?;
            output.insert(target, value);
        }
        Ok(output)
    }

    /// Per-field values in configuration order, one per field.
    pub fn values<R: Record + ?Sized>(&self, record: &R) -> FieldResult<Vec<Value>> {
        self.fields.iter().map(|field| field.value_for(record)).collect()
    }

    pub fn fields(&self) -> &[FieldTransform] {
        &self.fields
    }

    /// Mutable access to one field, e.g. to edit its config in place.
    pub fn field_mut(&mut self, index: usize) -> Option<&mut FieldTransform> {
        self.fields.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldTransform> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<RowConfig> for RowTransform {
    fn from(config: RowConfig) -> Self {
        Self::new(config)
    }
}

impl FromIterator<FieldTransform> for RowTransform {
    fn from_iter<I: IntoIterator<Item = FieldTransform>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RowTransform {
    type Item = &'a FieldTransform;
    type IntoIter = std::slice::Iter<'a, FieldTransform>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
