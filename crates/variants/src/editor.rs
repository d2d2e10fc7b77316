//! The variant editor: one controller per product editing session.
//!
//! Owns the selection, the matrix and the per-row request bookkeeping, and
//! exposes every user-facing transition. The reconciliation strategy is fixed
//! when the editor is built ([`VariantEditor::for_create`] or
//! [`VariantEditor::for_edit`]); an edit session additionally goes through a
//! single `Loading -> Ready` transition when existing variants arrive.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use sellerdesk_core::{
    AttributeTypeId, AttributeValueId, CategoryId, LocalKey, ProductId, ServerVariantId,
    SessionId,
};

use crate::attribute::{AttributeCatalogView, AttributeType, AttributeValue};
use crate::bulk::BulkPatch;
use crate::error::{VariantError, VariantResult};
use crate::gateway::{
    AttributeCatalog, ExistingVariantsLoader, GatewayError, PersistedVariantRecord,
    VariantPayload,
};
use crate::matrix::VariantMatrix;
use crate::reconcile::{self, Mode, Reconciliation, carries};
use crate::row::{FieldEdit, Identity, RowOpKind, RowSyncState, VariantRow, is_blank};
use crate::selection::{SelectionEntry, SelectionState, TypeToggle, ValueToggle};
use crate::sync::{Completion, PendingRowOp, RowOpError};
use crate::validation::{self, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Ready,
}

/// Result of [`VariantEditor::finish_loading`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    /// Stored variants that could not be placed in the matrix (duplicate
    /// combination or inconsistent attribute set).
    pub detached: usize,
}

/// Failure while opening an editor from remote data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpenError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Variant(#[from] VariantError),
}

/// Serializable view of the editor handed to the hosting workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    pub product_id: ProductId,
    pub mode: Mode,
    pub selection: SelectionState,
    pub rows: Vec<VariantRow>,
    /// Persisted variants no longer in the matrix and awaiting remote delete.
    pub detached: Vec<VariantRow>,
    pub readiness: ValidationReport,
    pub ready: bool,
}

#[derive(Debug, Clone)]
pub struct VariantEditor {
    product_id: ProductId,
    mode: Mode,
    load: LoadState,
    session: SessionId,
    catalog: AttributeCatalogView,
    selection: SelectionState,
    matrix: VariantMatrix,
    detached: Vec<VariantRow>,
}

impl VariantEditor {
    /// New product: rows are regenerated on every selection change.
    pub fn for_create(product_id: ProductId, catalog: AttributeCatalogView) -> Self {
        Self::build(product_id, catalog, Mode::Create, LoadState::Ready)
    }

    /// Existing product: rows are patched incrementally. Selection changes
    /// are refused until [`finish_loading`](Self::finish_loading) runs.
    pub fn for_edit(product_id: ProductId, catalog: AttributeCatalogView) -> Self {
        Self::build(product_id, catalog, Mode::Edit, LoadState::Loading)
    }

    fn build(product_id: ProductId, catalog: AttributeCatalogView, mode: Mode, load: LoadState) -> Self {
        Self {
            product_id,
            mode,
            load,
            session: SessionId::new(),
            catalog,
            selection: SelectionState::new(),
            matrix: VariantMatrix::new(),
            detached: Vec::new(),
        }
    }

    /// Fetch the category's attributes and build a create-mode editor.
    pub async fn open_for_create<C>(
        product_id: ProductId,
        category_id: &CategoryId,
        catalog: &C,
    ) -> Result<Self, OpenError>
    where
        C: AttributeCatalog + ?Sized,
    {
        let types = catalog.attributes_for_category(category_id).await?;
        Ok(Self::for_create(product_id, AttributeCatalogView::new(types)))
    }

    /// Fetch the category's attributes and the product's stored variants and
    /// build a ready edit-mode editor.
    pub async fn open_for_edit<C, L>(
        product_id: ProductId,
        category_id: &CategoryId,
        catalog: &C,
        loader: &L,
    ) -> Result<Self, OpenError>
    where
        C: AttributeCatalog + ?Sized,
        L: ExistingVariantsLoader + ?Sized,
    {
        let types = catalog.attributes_for_category(category_id).await?;
        let mut editor = Self::for_edit(product_id, AttributeCatalogView::new(types));
        let records = loader.variants(&editor.product_id).await?;
        editor.finish_loading(records)?;
        Ok(editor)
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn catalog(&self) -> &AttributeCatalogView {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn matrix(&self) -> &VariantMatrix {
        &self.matrix
    }

    pub fn rows(&self) -> &[VariantRow] {
        self.matrix.rows()
    }

    pub fn row(&self, id: &Identity) -> Option<&VariantRow> {
        self.matrix.get(id)
    }

    pub fn detached(&self) -> &[VariantRow] {
        &self.detached
    }

    fn ensure_ready(&self) -> VariantResult<()> {
        match self.load {
            LoadState::Ready => Ok(()),
            LoadState::Loading => Err(VariantError::NotLoaded),
        }
    }

    fn type_is_active(&self, type_id: &AttributeTypeId) -> bool {
        self.selection.entry(type_id).is_some_and(SelectionEntry::is_active)
    }

    fn ensure_idle(&self, mut pred: impl FnMut(&VariantRow) -> bool) -> VariantResult<()> {
        match self.matrix.rows().iter().find(|r| r.is_busy() && pred(r)) {
            Some(row) => Err(VariantError::RowBusy(row.identity.clone())),
            None => Ok(()),
        }
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// One-shot transition from `Loading` to `Ready`.
    ///
    /// Records sharing the prevailing attribute-type set become persisted
    /// rows and the selection is rebuilt as the union of their value ids per
    /// type, in first-seen order. Records with another attribute set or a
    /// duplicate combination are kept aside as detached rows, and only the
    /// first default record stays default.
    pub fn finish_loading(
        &mut self,
        records: Vec<PersistedVariantRecord>,
    ) -> VariantResult<LoadSummary> {
        if self.load == LoadState::Ready {
            return Err(VariantError::AlreadyLoaded);
        }

        // Records are placed only when they share the attribute-type set most
        // records agree on (ties go to the earliest). The selection is rebuilt
        // from those records alone.
        let structure = dominant_structure(&records);
        let (records, stray): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|r| structure.as_ref() == Some(&record_structure(r)));

        let mut entries: Vec<SelectionEntry> = Vec::new();
        for attr in records.iter().flat_map(|r| r.attributes.iter()) {
            match entries
                .iter_mut()
                .find(|e| e.attribute_type_id == attr.attribute_type_id)
            {
                Some(entry) => {
                    if !entry.contains(&attr.value_id) {
                        entry.selected_value_ids.push(attr.value_id.clone());
                    }
                }
                None => entries.push(SelectionEntry {
                    attribute_type_id: attr.attribute_type_id.clone(),
                    selected_value_ids: vec![attr.value_id.clone()],
                }),
            }
            self.catalog.absorb(AttributeType {
                id: attr.attribute_type_id.clone(),
                name: attr.attribute_type_name.clone(),
                values: vec![AttributeValue {
                    id: attr.value_id.clone(),
                    value: attr.value.clone(),
                }],
            });
        }

        let order: Vec<AttributeTypeId> = entries
            .iter()
            .map(|e| e.attribute_type_id.clone())
            .collect();
        let loaded_at = Utc::now();

        for record in stray {
            let row = loaded_row(record, &order, loaded_at);
            warn!(variant = %row.identity, "stored variant has a different attribute set; detached");
            self.detached.push(row);
        }

        let mut rows = Vec::with_capacity(records.len());
        let mut seen = HashSet::new();
        let mut has_default = false;
        for record in records {
            let mut row = loaded_row(record, &order, loaded_at);
            if !seen.insert(row.key()) {
                warn!(variant = %row.identity, "stored variant duplicates another combination; detached");
                self.detached.push(row);
                continue;
            }
            if row.is_default {
                if has_default {
                    warn!(variant = %row.identity, "extra default variant demoted");
                    row.is_default = false;
                    row.touch();
                } else {
                    has_default = true;
                }
            }
            rows.push(row);
        }

        let summary = LoadSummary {
            rows: rows.len(),
            detached: self.detached.len(),
        };
        self.selection = SelectionState::from_entries(entries);
        self.matrix.replace_all(rows);
        self.load = LoadState::Ready;
        info!(
            product_id = %self.product_id,
            rows = summary.rows,
            detached = summary.detached,
            "existing variants loaded"
        );
        Ok(summary)
    }

    // ---------------------------------------------------------------------
    // Selection transitions
    // ---------------------------------------------------------------------

    /// Switch an attribute type on or off.
    pub fn toggle_type(&mut self, type_id: &AttributeTypeId) -> VariantResult<Reconciliation> {
        self.ensure_ready()?;
        self.catalog.get(type_id)?;

        let disabling = self.selection.is_enabled(type_id);
        match (self.mode, disabling) {
            (Mode::Create, _) => self.ensure_idle(|_| true)?,
            (Mode::Edit, true) => self.ensure_idle(|r| r.combination.part(type_id).is_some())?,
            (Mode::Edit, false) => {}
        }

        let outcome = match (self.selection.toggle_type(type_id), self.mode) {
            (_, Mode::Create) => reconcile::regenerate(&self.catalog, &self.selection, &mut self.matrix)?,
            (TypeToggle::Enabled, Mode::Edit) => Reconciliation::default(),
            (TypeToggle::Disabled { removed_values }, Mode::Edit) => {
                let mut total = Reconciliation::default();
                for value in &removed_values {
                    let step = reconcile::on_value_removed(&mut self.matrix, type_id, value);
                    total.removed.extend(step.removed);
                }
                total
            }
        };
        Ok(self.settle(outcome))
    }

    /// Select or deselect one value of a switched-on type.
    pub fn toggle_value(
        &mut self,
        type_id: &AttributeTypeId,
        value_id: &AttributeValueId,
    ) -> VariantResult<Reconciliation> {
        self.ensure_ready()?;
        self.catalog.value(type_id, value_id)?;

        let direction = self.selection.plan_value_toggle(type_id, value_id)?;
        match (self.mode, direction) {
            (Mode::Create, _) => self.ensure_idle(|_| true)?,
            (Mode::Edit, ValueToggle::Removed) => {
                self.ensure_idle(|r| carries(r, type_id, value_id))?
            }
            // First value of a type extends every existing row.
            (Mode::Edit, ValueToggle::Added) if !self.type_is_active(type_id) => {
                self.ensure_idle(|r| r.combination.part(type_id).is_none())?
            }
            (Mode::Edit, ValueToggle::Added) => {}
        }

        self.selection.toggle_value(type_id, value_id)?;
        let outcome = match (self.mode, direction) {
            (Mode::Create, _) => {
                reconcile::regenerate(&self.catalog, &self.selection, &mut self.matrix)?
            }
            (Mode::Edit, ValueToggle::Added) => {
                let restored = self.restore_detached();
                let mut outcome = reconcile::on_value_added(
                    &self.catalog,
                    &self.selection,
                    &mut self.matrix,
                    type_id,
                    value_id,
                )?;
                outcome.restored = restored;
                outcome
            }
            (Mode::Edit, ValueToggle::Removed) => {
                reconcile::on_value_removed(&mut self.matrix, type_id, value_id)
            }
        };
        Ok(self.settle(outcome))
    }

    pub fn set_search(&mut self, type_id: &AttributeTypeId, text: impl Into<String>) -> VariantResult<()> {
        self.selection.set_search(type_id, text)
    }

    pub fn filtered_values(&self, type_id: &AttributeTypeId) -> VariantResult<Vec<&AttributeValue>> {
        self.selection.filtered_values(&self.catalog, type_id)
    }

    /// Move detached persisted rows whose values are all selected again back
    /// into the matrix, ahead of draft generation, so they keep their saved
    /// fields. Rows with a remote delete in flight stay detached.
    fn restore_detached(&mut self) -> usize {
        let order = self.selection.active_type_ids();
        let mut keys = self.matrix.keys();
        let selection = &self.selection;
        // At most one row per combination comes back.
        let mut fits = |row: &VariantRow| {
            !row.is_busy()
                && row.combination.len() == order.len()
                && row
                    .combination
                    .parts()
                    .iter()
                    .all(|p| selection.is_selected(&p.type_id, &p.value_id))
                && keys.insert(row.key())
        };
        let (back, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.detached).into_iter().partition(|r| fits(r));
        self.detached = kept;

        let mut has_default = self.matrix.default_row().is_some();
        let mut rows = Vec::with_capacity(back.len());
        for mut row in back {
            row.combination = row.combination.reordered(&order);
            if row.is_default {
                if has_default {
                    row.is_default = false;
                    row.touch();
                } else {
                    has_default = true;
                }
            }
            debug!(variant = %row.identity, "detached variant restored to matrix");
            rows.push(row);
        }
        self.matrix.append_unique(rows).0
    }

    /// Drafts removed by reconciliation are simply dropped; persisted rows
    /// are kept aside until their remote delete succeeds.
    fn settle(&mut self, outcome: Reconciliation) -> Reconciliation {
        for row in outcome.removed.iter().filter(|r| r.identity.is_persisted()) {
            debug!(variant = %row.identity, "persisted variant detached from matrix");
            self.detached.push(row.clone());
        }
        outcome
    }

    // ---------------------------------------------------------------------
    // Row edits
    // ---------------------------------------------------------------------

    pub fn update_field(&mut self, id: &Identity, edit: FieldEdit) -> VariantResult<()> {
        self.matrix.update_field(id, edit)
    }

    pub fn set_default(&mut self, id: &Identity) -> VariantResult<()> {
        self.matrix.set_default(id)
    }

    pub fn apply_bulk(&mut self, patch: &BulkPatch) -> usize {
        let touched = self.matrix.apply_bulk(patch);
        debug!(rows = touched, "bulk patch applied");
        touched
    }

    /// Remove a draft row locally (no remote call is needed or made).
    pub fn remove_draft_row(&mut self, id: &Identity) -> VariantResult<VariantRow> {
        let row = self
            .matrix
            .get(id)
            .ok_or_else(|| VariantError::RowNotFound(id.clone()))?;
        if row.identity.is_persisted() {
            return Err(VariantError::AlreadyPersisted(id.clone()));
        }
        if row.is_busy() {
            return Err(VariantError::RowBusy(id.clone()));
        }
        self.matrix.remove_row(id)
    }

    pub fn promote_identity(&mut self, local_key: LocalKey, server_id: ServerVariantId) -> VariantResult<()> {
        self.matrix.promote_identity(local_key, server_id)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Readiness and upward outputs
    // ---------------------------------------------------------------------

    pub fn readiness(&self) -> ValidationReport {
        validation::evaluate(&self.selection, &self.matrix)
    }

    pub fn is_ready(&self) -> bool {
        self.load == LoadState::Ready && self.readiness().is_ready()
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        let readiness = self.readiness();
        EditorSnapshot {
            product_id: self.product_id.clone(),
            mode: self.mode,
            selection: self.selection.clone(),
            rows: self.matrix.rows().to_vec(),
            detached: self.detached.clone(),
            ready: self.load == LoadState::Ready && readiness.is_ready(),
            readiness,
        }
    }

    /// The owning view is gone: responses still in flight must not be applied.
    pub fn teardown(&mut self) {
        self.session = SessionId::new();
        for row in self.matrix.rows_mut().chain(self.detached.iter_mut()) {
            row.sync.in_flight = None;
        }
        debug!(product_id = %self.product_id, "variant editor session torn down");
    }

    // ---------------------------------------------------------------------
    // Row requests (two-phase: begin locks the row, complete releases it)
    // ---------------------------------------------------------------------

    pub fn begin_create(&mut self, id: &Identity) -> VariantResult<PendingRowOp> {
        if id.is_persisted() {
            return Err(VariantError::AlreadyPersisted(id.clone()));
        }
        self.begin(id, RowOpKind::Create)
    }

    pub fn begin_update(&mut self, id: &Identity) -> VariantResult<PendingRowOp> {
        if !id.is_persisted() {
            return Err(VariantError::NotPersisted(id.clone()));
        }
        self.begin(id, RowOpKind::Update)
    }

    pub fn begin_delete(&mut self, id: &Identity) -> VariantResult<PendingRowOp> {
        if !id.is_persisted() {
            return Err(VariantError::NotPersisted(id.clone()));
        }
        self.begin(id, RowOpKind::Delete)
    }

    fn begin(&mut self, id: &Identity, kind: RowOpKind) -> VariantResult<PendingRowOp> {
        let session = self.session;
        let product_id = self.product_id.clone();
        let row = self.matrix.get_mut(id)?;
        if row.is_busy() {
            return Err(VariantError::RowBusy(id.clone()));
        }
        row.sync.in_flight = Some(kind);
        Ok(PendingRowOp {
            session,
            product_id,
            kind,
            identity: id.clone(),
            payload: VariantPayload::from_row(row),
            revision: row.sync.revision,
        })
    }

    fn is_stale(&self, op: &PendingRowOp) -> bool {
        if op.session != self.session {
            debug!(variant = %op.identity, "stale response discarded");
            return true;
        }
        false
    }

    fn fail(&mut self, op: &PendingRowOp, error: GatewayError) -> RowOpError {
        warn!(variant = %op.identity, kind = ?op.kind, error = %error, "variant request failed");
        if let Ok(row) = self.matrix.get_mut(&op.identity) {
            row.sync.in_flight = None;
            row.sync.last_error = Some(error.to_string());
            if op.kind == RowOpKind::Update {
                row.sync.unconfirmed = true;
            }
        }
        RowOpError::Remote {
            identity: op.identity.clone(),
            source: error,
        }
    }

    fn confirm(row: &mut VariantRow, op: &PendingRowOp) {
        row.sync.in_flight = None;
        row.sync.last_error = None;
        row.sync.last_synced_at = Some(Utc::now());
        row.sync.unconfirmed = row.sync.revision != op.revision;
    }

    /// Apply the result of a create. On success the draft is promoted in
    /// place; on failure it stays a draft with its fields untouched.
    pub fn complete_create(
        &mut self,
        op: PendingRowOp,
        result: Result<ServerVariantId, GatewayError>,
    ) -> Result<Completion, RowOpError> {
        if self.is_stale(&op) {
            return Ok(Completion::Discarded);
        }
        let server_id = match result {
            Ok(id) => id,
            Err(e) => return Err(self.fail(&op, e)),
        };
        let local_key = op
            .identity
            .local_key()
            .ok_or_else(|| RowOpError::Rejected(VariantError::AlreadyPersisted(op.identity.clone())))?;

        if let Err(e) = self.matrix.promote_identity(local_key, server_id.clone()) {
            if let Ok(row) = self.matrix.get_mut(&op.identity) {
                row.sync.in_flight = None;
                row.sync.last_error = Some(e.to_string());
            }
            return Err(RowOpError::Rejected(e));
        }

        let promoted = Identity::persisted(server_id);
        let row = self.matrix.get_mut(&promoted).map_err(RowOpError::Rejected)?;
        Self::confirm(row, &op);
        info!(from = %op.identity, to = %promoted, "variant created");
        Ok(Completion::Applied)
    }

    /// Apply the result of an update. Local values are never rolled back;
    /// a failure only leaves them unconfirmed.
    pub fn complete_update(
        &mut self,
        op: PendingRowOp,
        result: Result<(), GatewayError>,
    ) -> Result<Completion, RowOpError> {
        if self.is_stale(&op) {
            return Ok(Completion::Discarded);
        }
        if let Err(e) = result {
            return Err(self.fail(&op, e));
        }
        let row = self.matrix.get_mut(&op.identity).map_err(RowOpError::Rejected)?;
        Self::confirm(row, &op);
        Ok(Completion::Applied)
    }

    /// Apply the result of a delete: remove the row on success, keep it
    /// intact on failure.
    pub fn complete_delete(
        &mut self,
        op: PendingRowOp,
        result: Result<(), GatewayError>,
    ) -> Result<Completion, RowOpError> {
        if self.is_stale(&op) {
            return Ok(Completion::Discarded);
        }
        if let Err(e) = result {
            return Err(self.fail(&op, e));
        }
        self.matrix.remove_row(&op.identity).map_err(RowOpError::Rejected)?;
        info!(variant = %op.identity, "variant deleted");
        Ok(Completion::Applied)
    }

    /// Forget a detached row once its remote delete succeeded.
    pub fn forget_detached(&mut self, server_id: &ServerVariantId) -> Option<VariantRow> {
        let idx = self
            .detached
            .iter()
            .position(|r| r.identity.server_id() == Some(server_id))?;
        Some(self.detached.remove(idx))
    }

    /// Lock every idle detached row for its remote delete and return their ids.
    pub(crate) fn begin_purge(&mut self) -> Vec<ServerVariantId> {
        self.detached
            .iter_mut()
            .filter(|r| !r.is_busy())
            .filter_map(|r| {
                let id = r.identity.server_id().cloned()?;
                r.sync.in_flight = Some(RowOpKind::Delete);
                Some(id)
            })
            .collect()
    }

    /// Release a detached row after its remote delete failed.
    pub(crate) fn fail_purge(&mut self, server_id: &ServerVariantId, error: &GatewayError) {
        if let Some(row) = self
            .detached
            .iter_mut()
            .find(|r| r.identity.server_id() == Some(server_id))
        {
            row.sync.in_flight = None;
            row.sync.last_error = Some(error.to_string());
        }
    }
}

/// Sorted attribute-type ids of a stored record.
fn record_structure(record: &PersistedVariantRecord) -> Vec<AttributeTypeId> {
    let mut types: Vec<AttributeTypeId> = record
        .attributes
        .iter()
        .map(|a| a.attribute_type_id.clone())
        .collect();
    types.sort();
    types
}

/// The attribute-type set shared by most records, earliest on ties. Records
/// without attributes or naming a type twice never qualify.
fn dominant_structure(records: &[PersistedVariantRecord]) -> Option<Vec<AttributeTypeId>> {
    let mut counts: Vec<(Vec<AttributeTypeId>, usize)> = Vec::new();
    for structure in records.iter().map(record_structure) {
        if structure.is_empty() || structure.windows(2).any(|w| w[0] == w[1]) {
            continue;
        }
        match counts.iter_mut().find(|(s, _)| *s == structure) {
            Some((_, n)) => *n += 1,
            None => counts.push((structure, 1)),
        }
    }
    let best = counts.iter().map(|(_, n)| *n).max()?;
    counts.into_iter().find(|(_, n)| *n == best).map(|(s, _)| s)
}

fn loaded_row(
    record: PersistedVariantRecord,
    order: &[AttributeTypeId],
    loaded_at: DateTime<Utc>,
) -> VariantRow {
    let combination = record.combination().reordered(order);
    let display_name = record
        .display_name
        .filter(|n| !is_blank(n))
        .unwrap_or_else(|| combination.display_name());
    VariantRow {
        identity: Identity::persisted(record.id),
        combination,
        display_name,
        cost_price: record.cost_price,
        selling_price: record.selling_price,
        discount_price: record.discount_price,
        stock_quantity: record.stock_quantity,
        is_default: record.is_default,
        status: record.status,
        sync: RowSyncState {
            last_synced_at: Some(loaded_at),
            ..RowSyncState::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::fixtures::catalog;
    use crate::gateway::RecordAttribute;
    use crate::row::RowStatus;

    fn stored(id: &str, parts: &[(&str, &str, &str, &str)], stock: i64) -> PersistedVariantRecord {
        PersistedVariantRecord {
            id: id.into(),
            attributes: parts
                .iter()
                .map(|(ty, ty_name, value_id, value)| RecordAttribute {
                    attribute_type_id: (*ty).into(),
                    attribute_type_name: ty_name.to_string(),
                    value_id: (*value_id).into(),
                    value: value.to_string(),
                })
                .collect(),
            display_name: None,
            cost_price: String::new(),
            selling_price: "10".to_string(),
            discount_price: String::new(),
            stock_quantity: stock,
            is_default: false,
            status: RowStatus::Active,
        }
    }

    fn loaded() -> VariantEditor {
        let mut editor = VariantEditor::for_edit("p1".into(), catalog());
        editor
            .finish_loading(vec![
                stored("10", &[("color", "Color", "red", "Red")], 5),
                stored("11", &[("color", "Color", "blue", "Blue")], 7),
            ])
            .unwrap();
        editor
    }

    #[test]
    fn dominant_structure_prefers_the_majority_then_the_earliest() {
        let a = stored("1", &[("color", "Color", "red", "Red")], 0);
        let b = stored(
            "2",
            &[("color", "Color", "red", "Red"), ("size", "Size", "s", "S")],
            0,
        );
        let twice = stored(
            "3",
            &[("color", "Color", "red", "Red"), ("color", "Color", "blue", "Blue")],
            0,
        );

        let color: AttributeTypeId = "color".into();
        assert_eq!(
            dominant_structure(&[b.clone(), a.clone(), a.clone()]),
            Some(vec![color.clone()])
        );
        assert_eq!(dominant_structure(&[a.clone(), b.clone()]), Some(vec![color]));
        assert_eq!(dominant_structure(&[twice.clone(), twice, b.clone()]), Some(record_structure(&b)));
        assert_eq!(dominant_structure(&[]), None);
    }

    #[test]
    fn rows_awaiting_remote_delete_stay_detached() {
        let mut editor = loaded();
        editor
            .toggle_value(&"color".into(), &"red".into())
            .unwrap();
        let ids = editor.begin_purge();
        assert_eq!(ids, vec![ServerVariantId::from("10")]);
        assert!(editor.begin_purge().is_empty());

        let outcome = editor
            .toggle_value(&"color".into(), &"red".into())
            .unwrap();
        assert_eq!(outcome.restored, 0);
        assert_eq!(outcome.appended, 1);
        assert_eq!(editor.detached().len(), 1);
        assert!(!editor.rows().iter().any(|r| r.identity.is_persisted() && r.stock_quantity == 5));
    }

    #[test]
    fn restored_default_yields_to_the_current_default() {
        let mut editor = loaded();
        let red = Identity::persisted("10".into());
        let blue = Identity::persisted("11".into());
        editor.set_default(&red).unwrap();
        editor
            .toggle_value(&"color".into(), &"red".into())
            .unwrap();
        editor.set_default(&blue).unwrap();

        editor
            .toggle_value(&"color".into(), &"red".into())
            .unwrap();
        assert!(editor.row(&blue).unwrap().is_default);
        let restored = editor.row(&red).unwrap();
        assert!(!restored.is_default);
        assert!(restored.sync.unconfirmed);
    }

    #[test]
    fn only_one_detached_row_per_combination_is_restored() {
        let mut editor = VariantEditor::for_edit("p1".into(), catalog());
        editor
            .finish_loading(vec![
                stored("10", &[("color", "Color", "red", "Red")], 5),
                stored("12", &[("color", "Color", "red", "Red")], 1),
            ])
            .unwrap();
        editor
            .toggle_value(&"color".into(), &"red".into())
            .unwrap();
        assert_eq!(editor.detached().len(), 2);

        let outcome = editor
            .toggle_value(&"color".into(), &"red".into())
            .unwrap();
        assert_eq!(outcome.restored, 1);
        assert_eq!(editor.rows().len(), 1);
        assert_eq!(editor.detached().len(), 1);
    }

    #[test]
    fn teardown_releases_detached_rows() {
        let mut editor = loaded();
        editor
            .toggle_value(&"color".into(), &"red".into())
            .unwrap();
        editor.begin_purge();
        editor.teardown();
        assert!(!editor.detached()[0].is_busy());
    }
}
