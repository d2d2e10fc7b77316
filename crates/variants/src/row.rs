//! Variant rows and their identity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sellerdesk_core::{AttributeValueId, Entity, LocalKey, ServerVariantId};

use crate::combination::{Combination, CombinationKey};

/// Identity of a row: in-memory only, or created remotely at least once.
///
/// The only legal transition is `Draft -> Persisted`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Identity {
    Draft { local_key: LocalKey },
    Persisted { server_id: ServerVariantId },
}

impl Identity {
    pub fn draft() -> Self {
        Identity::Draft {
            local_key: LocalKey::new(),
        }
    }

    pub fn persisted(server_id: ServerVariantId) -> Self {
        Identity::Persisted { server_id }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Identity::Persisted { .. })
    }

    pub fn local_key(&self) -> Option<LocalKey> {
        match self {
            Identity::Draft { local_key } => Some(*local_key),
            Identity::Persisted { .. } => None,
        }
    }

    pub fn server_id(&self) -> Option<&ServerVariantId> {
        match self {
            Identity::Draft { .. } => None,
            Identity::Persisted { server_id } => Some(server_id),
        }
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Identity::Draft { local_key } => write!(f, "draft:{local_key}"),
            Identity::Persisted { server_id } => write!(f, "persisted:{server_id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    #[default]
    Active,
    Inactive,
}

/// Kind of remote call a row can have outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowOpKind {
    Create,
    Update,
    Delete,
}

/// Row-scoped persistence bookkeeping (not part of the variant's data).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSyncState {
    /// Outstanding remote call; the row is locked while set.
    pub in_flight: Option<RowOpKind>,
    /// Local field values differ from what the backend last confirmed.
    pub unconfirmed: bool,
    /// Message of the last failed remote call, cleared on the next success.
    pub last_error: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Bumped on every local edit; used to tell whether a confirmed payload
    /// is still current.
    pub revision: u64,
}

impl RowSyncState {
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// Editable fields addressed by [`FieldEdit`] and by validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantField {
    DisplayName,
    CostPrice,
    SellingPrice,
    DiscountPrice,
    StockQuantity,
    Status,
}

/// A single field assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldEdit {
    DisplayName(String),
    CostPrice(String),
    SellingPrice(String),
    DiscountPrice(String),
    StockQuantity(i64),
    Status(RowStatus),
}

impl FieldEdit {
    pub fn field(&self) -> VariantField {
        match self {
            FieldEdit::DisplayName(_) => VariantField::DisplayName,
            FieldEdit::CostPrice(_) => VariantField::CostPrice,
            FieldEdit::SellingPrice(_) => VariantField::SellingPrice,
            FieldEdit::DiscountPrice(_) => VariantField::DiscountPrice,
            FieldEdit::StockQuantity(_) => VariantField::StockQuantity,
            FieldEdit::Status(_) => VariantField::Status,
        }
    }
}

/// One variant: a combination plus its pricing, stock and flags.
///
/// Prices are kept as the seller typed them; they are only interpreted by
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRow {
    pub identity: Identity,
    pub combination: Combination,
    pub display_name: String,
    pub cost_price: String,
    pub selling_price: String,
    pub discount_price: String,
    pub stock_quantity: i64,
    pub is_default: bool,
    pub status: RowStatus,
    #[serde(default)]
    pub sync: RowSyncState,
}

impl VariantRow {
    /// Fresh in-memory row: no pricing, zero stock, not default, active.
    pub fn draft(combination: Combination) -> Self {
        Self {
            identity: Identity::draft(),
            display_name: combination.display_name(),
            combination,
            cost_price: String::new(),
            selling_price: String::new(),
            discount_price: String::new(),
            stock_quantity: 0,
            is_default: false,
            status: RowStatus::Active,
            sync: RowSyncState::default(),
        }
    }

    pub fn key(&self) -> CombinationKey {
        self.combination.key()
    }

    pub fn value_ids(&self) -> Vec<AttributeValueId> {
        self.combination.value_ids()
    }

    pub fn is_busy(&self) -> bool {
        self.sync.is_busy()
    }

    /// Parsed selling price, if the text is a number.
    pub fn selling_price_amount(&self) -> Option<Decimal> {
        parse_amount(&self.selling_price)
    }

    /// Assign one field and record the edit.
    pub fn apply_edit(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::DisplayName(v) => self.display_name = v,
            FieldEdit::CostPrice(v) => self.cost_price = v,
            FieldEdit::SellingPrice(v) => self.selling_price = v,
            FieldEdit::DiscountPrice(v) => self.discount_price = v,
            FieldEdit::StockQuantity(v) => self.stock_quantity = v,
            FieldEdit::Status(v) => self.status = v,
        }
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.sync.revision += 1;
        if self.identity.is_persisted() {
            self.sync.unconfirmed = true;
        }
    }
}

impl Entity for VariantRow {
    type Id = Identity;

    fn id(&self) -> &Self::Id {
        &self.identity
    }
}

pub(crate) fn parse_amount(raw: &str) -> Option<Decimal> {
    raw.trim().parse::<Decimal>().ok()
}

pub(crate) fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::{fixtures::axis, generate};

    fn row() -> VariantRow {
        VariantRow::draft(generate(&[axis("Color", &["Red"]), axis("Size", &["S"])]).remove(0))
    }

    #[test]
    fn draft_rows_start_empty() {
        let row = row();
        assert!(!row.identity.is_persisted());
        assert_eq!(row.display_name, "Red / S");
        assert!(row.selling_price.is_empty());
        assert_eq!(row.stock_quantity, 0);
        assert!(!row.is_default);
        assert_eq!(row.status, RowStatus::Active);
        assert!(!row.is_busy());
    }

    #[test]
    fn edits_bump_revision_and_only_persisted_rows_become_unconfirmed() {
        let mut draft = row();
        draft.apply_edit(FieldEdit::StockQuantity(4));
        assert_eq!(draft.stock_quantity, 4);
        assert_eq!(draft.sync.revision, 1);
        assert!(!draft.sync.unconfirmed);

        let mut persisted = row();
        persisted.identity = Identity::persisted("9".into());
        persisted.apply_edit(FieldEdit::SellingPrice("12.50".to_string()));
        assert!(persisted.sync.unconfirmed);
        assert_eq!(persisted.selling_price_amount(), Some(Decimal::new(1250, 2)));
    }

    #[test]
    fn identity_serializes_as_tagged_union() {
        let json = serde_json::to_value(Identity::persisted("55".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "persisted", "server_id": "55"}));

        let back: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(back.server_id().map(|s| s.as_str()), Some("55"));
    }

    #[test]
    fn unparsable_price_has_no_amount() {
        let mut row = row();
        row.selling_price = "ten".to_string();
        assert_eq!(row.selling_price_amount(), None);
    }
}
