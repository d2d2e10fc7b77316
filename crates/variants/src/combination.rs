//! Cartesian product of selected attribute values.
//!
//! Pure and deterministic: types are iterated in the order given and, within a
//! type, values in selection order, so the first axis is the outermost loop.

use serde::{Deserialize, Serialize};

use sellerdesk_core::{AttributeTypeId, AttributeValueId, ValueObject};

use crate::attribute::AttributeValue;

/// One attribute type with the values selected for it, already resolved
/// against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub type_id: AttributeTypeId,
    pub type_name: String,
    pub values: Vec<AttributeValue>,
}

/// One `{type: value}` component of a combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationPart {
    pub type_id: AttributeTypeId,
    pub type_name: String,
    pub value_id: AttributeValueId,
    pub value: String,
}

/// One value per active attribute type, in active-type order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination {
    parts: Vec<CombinationPart>,
}

impl Combination {
    pub fn new(parts: Vec<CombinationPart>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[CombinationPart] {
        &self.parts
    }

    pub fn part(&self, type_id: &AttributeTypeId) -> Option<&CombinationPart> {
        self.parts.iter().find(|p| &p.type_id == type_id)
    }

    /// Value ids in the same order as `parts()`.
    pub fn value_ids(&self) -> Vec<AttributeValueId> {
        self.parts.iter().map(|p| p.value_id.clone()).collect()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &AttributeTypeId> {
        self.parts.iter().map(|p| &p.type_id)
    }

    /// Order-independent identity of this combination.
    pub fn key(&self) -> CombinationKey {
        CombinationKey::from_ids(self.value_ids())
    }

    /// Human label, e.g. `"Red / M"`.
    pub fn display_name(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.value.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn extended(&self, axis: &Axis, value: &AttributeValue) -> Self {
        let mut parts = self.parts.clone();
        parts.push(CombinationPart {
            type_id: axis.type_id.clone(),
            type_name: axis.type_name.clone(),
            value_id: value.id.clone(),
            value: value.value.clone(),
        });
        Self { parts }
    }

    /// Reorder parts to follow `order`; parts of unlisted types go last.
    pub(crate) fn reordered(mut self, order: &[AttributeTypeId]) -> Self {
        self.parts.sort_by_key(|p| {
            order
                .iter()
                .position(|t| t == &p.type_id)
                .unwrap_or(usize::MAX)
        });
        self
    }
}

/// Sorted tuple of value ids. Two rows with the same key are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinationKey(Vec<AttributeValueId>);

impl CombinationKey {
    pub fn from_ids(mut ids: Vec<AttributeValueId>) -> Self {
        ids.sort();
        Self(ids)
    }

    pub fn ids(&self) -> &[AttributeValueId] {
        &self.0
    }
}

impl ValueObject for CombinationKey {}
impl ValueObject for Combination {}

/// Every full combination of the given axes.
///
/// Empty input yields no combinations (never one empty combination), and so
/// does any axis without values.
pub fn generate(axes: &[Axis]) -> Vec<Combination> {
    if axes.is_empty() {
        return Vec::new();
    }

    let capacity = capacity_hint(axes.iter().map(|a| a.values.len()));
    let mut acc = vec![Combination::default()];
    for axis in axes {
        let mut next = Vec::with_capacity(capacity);
        for prefix in &acc {
            for value in &axis.values {
                next.push(prefix.extended(axis, value));
            }
        }
        acc = next;
    }
    acc
}

/// Product of the axis sizes, or zero (no preallocation) when it overflows.
fn capacity_hint(lens: impl IntoIterator<Item = usize>) -> usize {
    lens.into_iter()
        .try_fold(1usize, |acc, n| acc.checked_mul(n))
        .unwrap_or(0)
}

/// Cross the combinations of `others` with one fixed `{axis: value}`.
///
/// With no other axes this is exactly one single-part combination.
pub fn cross_with(others: &[Axis], axis: &Axis, value: &AttributeValue) -> Vec<Combination> {
    if others.is_empty() {
        return vec![Combination::default().extended(axis, value)];
    }
    generate(others)
        .into_iter()
        .map(|c| c.extended(axis, value))
        .collect()
}
