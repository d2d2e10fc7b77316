//! The authoritative ordered collection of variant rows.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use sellerdesk_core::{DomainError, LocalKey, ServerVariantId};

use crate::bulk::BulkPatch;
use crate::combination::CombinationKey;
use crate::error::{VariantError, VariantResult};
use crate::row::{FieldEdit, Identity, VariantRow};

/// Ordered variant rows. No two rows share a [`CombinationKey`] and at most
/// one row is the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantMatrix {
    rows: Vec<VariantRow>,
}

impl VariantMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[VariantRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &Identity) -> Option<&VariantRow> {
        self.rows.iter().find(|r| &r.identity == id)
    }

    pub(crate) fn get_mut(&mut self, id: &Identity) -> VariantResult<&mut VariantRow> {
        self.rows
            .iter_mut()
            .find(|r| &r.identity == id)
            .ok_or_else(|| VariantError::RowNotFound(id.clone()))
    }

    pub fn position(&self, id: &Identity) -> Option<usize> {
        self.rows.iter().position(|r| &r.identity == id)
    }

    pub fn keys(&self) -> HashSet<CombinationKey> {
        self.rows.iter().map(VariantRow::key).collect()
    }

    pub fn default_row(&self) -> Option<&VariantRow> {
        self.rows.iter().find(|r| r.is_default)
    }

    pub fn update_field(&mut self, id: &Identity, edit: FieldEdit) -> VariantResult<()> {
        self.get_mut(id)?.apply_edit(edit);
        Ok(())
    }

    /// Make `id` the only default row. The target is checked before any flag
    /// changes, so a failed call leaves every row untouched.
    pub fn set_default(&mut self, id: &Identity) -> VariantResult<()> {
        if self.position(id).is_none() {
            return Err(VariantError::RowNotFound(id.clone()));
        }
        for row in &mut self.rows {
            let want = &row.identity == id;
            if row.is_default != want {
                row.is_default = want;
                row.touch();
            }
        }
        Ok(())
    }

    /// Drop a row locally. Persisted rows must already be deleted remotely.
    pub fn remove_row(&mut self, id: &Identity) -> VariantResult<VariantRow> {
        let idx = self
            .position(id)
            .ok_or_else(|| VariantError::RowNotFound(id.clone()))?;
        Ok(self.rows.remove(idx))
    }

    /// Replace a draft identity with the server-assigned one, in place.
    pub fn promote_identity(
        &mut self,
        local_key: LocalKey,
        server_id: ServerVariantId,
    ) -> VariantResult<()> {
        let draft = Identity::Draft { local_key };
        let persisted = Identity::persisted(server_id);
        if self.position(&persisted).is_some() {
            return Err(DomainError::conflict(format!(
                "server id {persisted} is already bound to another row"
            ))
            .into());
        }
        self.get_mut(&draft)?.identity = persisted;
        Ok(())
    }

    /// Overwrite every row with the non-blank fields of `patch`.
    /// Returns the number of rows touched.
    pub fn apply_bulk(&mut self, patch: &BulkPatch) -> usize {
        let edits = patch.edits();
        if edits.is_empty() {
            return 0;
        }
        for row in &mut self.rows {
            for edit in &edits {
                row.apply_edit(edit.clone());
            }
        }
        self.rows.len()
    }

    /// Append rows whose key is not present yet. Returns `(appended, dropped)`.
    pub(crate) fn append_unique(&mut self, rows: Vec<VariantRow>) -> (usize, usize) {
        let mut keys = self.keys();
        let mut appended = 0;
        let mut dropped = 0;
        for row in rows {
            if keys.insert(row.key()) {
                self.rows.push(row);
                appended += 1;
            } else {
                dropped += 1;
            }
        }
        (appended, dropped)
    }

    /// Remove every row matching `pred`, keeping the order of the others.
    pub(crate) fn extract(&mut self, mut pred: impl FnMut(&VariantRow) -> bool) -> Vec<VariantRow> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.rows)
            .into_iter()
            .partition(|r| pred(r));
        self.rows = kept;
        removed
    }

    pub(crate) fn replace_all(&mut self, rows: Vec<VariantRow>) -> Vec<VariantRow> {
        std::mem::replace(&mut self.rows, rows)
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut VariantRow> {
        self.rows.iter_mut()
    }
}
