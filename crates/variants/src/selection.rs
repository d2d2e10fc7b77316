//! Which attribute types are switched on, and which values are chosen per type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use sellerdesk_core::{AttributeTypeId, AttributeValueId};

use crate::attribute::{AttributeCatalogView, AttributeValue};
use crate::error::{VariantError, VariantResult};

/// One switched-on attribute type and its chosen values (ordered, no repeats).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub attribute_type_id: AttributeTypeId,
    pub selected_value_ids: Vec<AttributeValueId>,
}

impl SelectionEntry {
    pub fn new(attribute_type_id: AttributeTypeId) -> Self {
        Self {
            attribute_type_id,
            selected_value_ids: Vec::new(),
        }
    }

    pub fn contains(&self, value_id: &AttributeValueId) -> bool {
        self.selected_value_ids.contains(value_id)
    }

    /// An entry with no values contributes nothing to the matrix.
    pub fn is_active(&self) -> bool {
        !self.selected_value_ids.is_empty()
    }
}

/// Outcome of [`SelectionState::toggle_type`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeToggle {
    /// The type was switched on with no values.
    Enabled,
    /// The type was switched off; these values were selected at the time.
    Disabled { removed_values: Vec<AttributeValueId> },
}

/// Outcome of [`SelectionState::toggle_value`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValueToggle {
    Added,
    Removed,
}

/// Ordered list of switched-on attribute types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    entries: Vec<SelectionEntry>,
    /// Per-type filter text typed into the value picker. Never persisted.
    #[serde(skip)]
    search: HashMap<AttributeTypeId, String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<SelectionEntry>) -> Self {
        Self {
            entries,
            search: HashMap::new(),
        }
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn entry(&self, type_id: &AttributeTypeId) -> Option<&SelectionEntry> {
        self.entries.iter().find(|e| &e.attribute_type_id == type_id)
    }

    /// Entries with at least one selected value, in selection order.
    pub fn active_entries(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter().filter(|e| e.is_active())
    }

    pub fn active_type_ids(&self) -> Vec<AttributeTypeId> {
        self.active_entries()
            .map(|e| e.attribute_type_id.clone())
            .collect()
    }

    pub fn is_enabled(&self, type_id: &AttributeTypeId) -> bool {
        self.entry(type_id).is_some()
    }

    pub fn is_selected(&self, type_id: &AttributeTypeId, value_id: &AttributeValueId) -> bool {
        self.entry(type_id).is_some_and(|e| e.contains(value_id))
    }

    /// True when at least one type is switched on and every switched-on type
    /// has a value.
    pub fn is_complete(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(SelectionEntry::is_active)
    }

    /// Switch a type on (with no values) or off (dropping its values and
    /// filter text).
    pub fn toggle_type(&mut self, type_id: &AttributeTypeId) -> TypeToggle {
        match self
            .entries
            .iter()
            .position(|e| &e.attribute_type_id == type_id)
        {
            Some(idx) => {
                let entry = self.entries.remove(idx);
                self.search.remove(type_id);
                TypeToggle::Disabled {
                    removed_values: entry.selected_value_ids,
                }
            }
            None => {
                self.entries.push(SelectionEntry::new(type_id.clone()));
                TypeToggle::Enabled
            }
        }
    }

    /// Add or remove one value of a switched-on type.
    ///
    /// Membership is decided before mutating; the returned direction tells
    /// the reconciler which branch to run.
    pub fn toggle_value(
        &mut self,
        type_id: &AttributeTypeId,
        value_id: &AttributeValueId,
    ) -> VariantResult<ValueToggle> {
        let direction = self.plan_value_toggle(type_id, value_id)?;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.attribute_type_id == type_id)
            .ok_or_else(|| VariantError::InactiveAttributeType(type_id.clone()))?;

        match direction {
            ValueToggle::Added => entry.selected_value_ids.push(value_id.clone()),
            ValueToggle::Removed => entry.selected_value_ids.retain(|v| v != value_id),
        }
        Ok(direction)
    }

    /// Which way `toggle_value` would go, without mutating.
    pub fn plan_value_toggle(
        &self,
        type_id: &AttributeTypeId,
        value_id: &AttributeValueId,
    ) -> VariantResult<ValueToggle> {
        let entry = self
            .entry(type_id)
            .ok_or_else(|| VariantError::InactiveAttributeType(type_id.clone()))?;
        Ok(if entry.contains(value_id) {
            ValueToggle::Removed
        } else {
            ValueToggle::Added
        })
    }

    pub fn set_search(
        &mut self,
        type_id: &AttributeTypeId,
        text: impl Into<String>,
    ) -> VariantResult<()> {
        if !self.is_enabled(type_id) {
            return Err(VariantError::InactiveAttributeType(type_id.clone()));
        }
        let text = text.into();
        if text.trim().is_empty() {
            self.search.remove(type_id);
        } else {
            self.search.insert(type_id.clone(), text);
        }
        Ok(())
    }

    pub fn search(&self, type_id: &AttributeTypeId) -> Option<&str> {
        self.search.get(type_id).map(String::as_str)
    }

    /// Catalog values of a type matching its filter text (case-insensitive
    /// substring). Without filter text every value matches.
    pub fn filtered_values<'a>(
        &self,
        catalog: &'a AttributeCatalogView,
        type_id: &AttributeTypeId,
    ) -> VariantResult<Vec<&'a AttributeValue>> {
        let attribute = catalog.get(type_id)?;
        let needle = self.search(type_id).map(|s| s.trim().to_lowercase());
        Ok(attribute
            .values
            .iter()
            .filter(|v| match &needle {
                Some(n) => v.value.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::fixtures::catalog;

    fn color() -> AttributeTypeId {
        "color".into()
    }

    #[test]
    fn enabling_a_type_adds_an_empty_entry() {
        let mut selection = SelectionState::new();
        assert_eq!(selection.toggle_type(&color()), TypeToggle::Enabled);
        assert!(selection.is_enabled(&color()));
        assert_eq!(selection.active_entries().count(), 0);
        assert!(!selection.is_complete());
    }

    #[test]
    fn disabling_a_type_returns_its_values_and_drops_search() {
        let mut selection = SelectionState::new();
        selection.toggle_type(&color());
        selection.toggle_value(&color(), &"red".into()).unwrap();
        selection.set_search(&color(), "re").unwrap();

        let toggle = selection.toggle_type(&color());
        assert_eq!(
            toggle,
            TypeToggle::Disabled {
                removed_values: vec![AttributeValueId::from("red")]
            }
        );
        assert!(selection.search(&color()).is_none());

        // Re-enabling starts clean.
        selection.toggle_type(&color());
        assert!(selection.search(&color()).is_none());
        assert!(!selection.is_selected(&color(), &"red".into()));
    }

    #[test]
    fn toggle_value_flips_membership() {
        let mut selection = SelectionState::new();
        selection.toggle_type(&color());

        assert_eq!(
            selection.toggle_value(&color(), &"red".into()).unwrap(),
            ValueToggle::Added
        );
        assert!(selection.is_selected(&color(), &"red".into()));
        assert!(selection.is_complete());

        assert_eq!(
            selection.toggle_value(&color(), &"red".into()).unwrap(),
            ValueToggle::Removed
        );
        assert!(!selection.is_selected(&color(), &"red".into()));
    }

    #[test]
    fn toggle_value_on_disabled_type_is_rejected() {
        let mut selection = SelectionState::new();
        let err = selection.toggle_value(&color(), &"red".into()).unwrap_err();
        assert_eq!(err, VariantError::InactiveAttributeType(color()));
    }

    #[test]
    fn values_keep_selection_order() {
        let mut selection = SelectionState::new();
        selection.toggle_type(&color());
        for v in ["blue", "red", "green"] {
            selection.toggle_value(&color(), &v.into()).unwrap();
        }
        let ids: Vec<_> = selection.entry(&color()).unwrap().selected_value_ids.clone();
        assert_eq!(
            ids,
            vec![
                AttributeValueId::from("blue"),
                AttributeValueId::from("red"),
                AttributeValueId::from("green")
            ]
        );
    }

    #[test]
    fn filtered_values_match_case_insensitively() {
        let catalog = catalog();
        let mut selection = SelectionState::new();
        selection.toggle_type(&color());

        assert_eq!(selection.filtered_values(&catalog, &color()).unwrap().len(), 3);

        selection.set_search(&color(), "RE").unwrap();
        let names: Vec<_> = selection
            .filtered_values(&catalog, &color())
            .unwrap()
            .iter()
            .map(|v| v.value.clone())
            .collect();
        assert_eq!(names, vec!["Red".to_string(), "Green".to_string()]);

        selection.set_search(&color(), "  ").unwrap();
        assert!(selection.search(&color()).is_none());
    }
}
