//! Attribute catalog data (read-only for the engine).

use serde::{Deserialize, Serialize};

use sellerdesk_core::{AttributeTypeId, AttributeValueId};

use crate::combination::Axis;
use crate::error::{VariantError, VariantResult};
use crate::selection::SelectionState;

/// A concrete choice within an attribute type (e.g. "Red").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: AttributeValueId,
    pub value: String,
}

/// A product dimension used to build variants (e.g. "Color").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    pub id: AttributeTypeId,
    pub name: String,
    pub values: Vec<AttributeValue>,
}

impl AttributeType {
    pub fn value(&self, id: &AttributeValueId) -> Option<&AttributeValue> {
        self.values.iter().find(|v| &v.id == id)
    }
}

/// Immutable view over the attribute types of one category.
///
/// Fetched once per category selection and treated as fixed for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCatalogView {
    types: Vec<AttributeType>,
}

impl AttributeCatalogView {
    pub fn new(types: Vec<AttributeType>) -> Self {
        Self { types }
    }

    pub fn types(&self) -> &[AttributeType] {
        &self.types
    }

    pub fn get(&self, id: &AttributeTypeId) -> VariantResult<&AttributeType> {
        self.types
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| VariantError::UnknownAttributeType(id.clone()))
    }

    pub fn value(
        &self,
        type_id: &AttributeTypeId,
        value_id: &AttributeValueId,
    ) -> VariantResult<&AttributeValue> {
        self.get(type_id)?
            .value(value_id)
            .ok_or_else(|| VariantError::UnknownAttributeValue {
                attribute_type: type_id.clone(),
                value: value_id.clone(),
            })
    }

    /// Merge a type observed on loaded variants but missing from the catalog
    /// (or carrying values the catalog no longer lists).
    pub(crate) fn absorb(&mut self, observed: AttributeType) {
        match self.types.iter_mut().find(|t| t.id == observed.id) {
            Some(existing) => {
                for v in observed.values {
                    if existing.value(&v.id).is_none() {
                        existing.values.push(v);
                    }
                }
            }
            None => self.types.push(observed),
        }
    }

    /// Resolve the active part of a selection into generator axes, in
    /// selection order. Types with no selected values are skipped.
    pub fn axes(&self, selection: &SelectionState) -> VariantResult<Vec<Axis>> {
        selection
            .active_entries()
            .map(|entry| self.axis(&entry.attribute_type_id, &entry.selected_value_ids))
            .collect()
    }

    /// Resolve one type with an explicit list of value ids.
    pub fn axis(
        &self,
        type_id: &AttributeTypeId,
        value_ids: &[AttributeValueId],
    ) -> VariantResult<Axis> {
        let attribute = self.get(type_id)?;
        let values = value_ids
            .iter()
            .map(|id| self.value(type_id, id).cloned())
            .collect::<VariantResult<Vec<_>>>()?;
        Ok(Axis {
            type_id: attribute.id.clone(),
            type_name: attribute.name.clone(),
            values,
        })
    }
}
