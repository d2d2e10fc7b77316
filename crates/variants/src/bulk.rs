//! Copy one set of field values onto every row.

use serde::{Deserialize, Serialize};

use crate::row::{FieldEdit, RowStatus, is_blank};

/// Partial row fields to broadcast. Omitted or blank fields are left alone on
/// every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkPatch {
    #[serde(default)]
    pub cost_price: Option<String>,
    #[serde(default)]
    pub selling_price: Option<String>,
    #[serde(default)]
    pub discount_price: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub status: Option<RowStatus>,
}

impl BulkPatch {
    /// Field assignments this patch will make, skipping blank text.
    pub fn edits(&self) -> Vec<FieldEdit> {
        let text = |v: &Option<String>| v.as_ref().filter(|s| !is_blank(s)).cloned();

        let mut edits = Vec::new();
        if let Some(v) = text(&self.cost_price) {
            edits.push(FieldEdit::CostPrice(v));
        }
        if let Some(v) = text(&self.selling_price) {
            edits.push(FieldEdit::SellingPrice(v));
        }
        if let Some(v) = text(&self.discount_price) {
            edits.push(FieldEdit::DiscountPrice(v));
        }
        if let Some(v) = self.stock_quantity {
            edits.push(FieldEdit::StockQuantity(v));
        }
        if let Some(v) = self.status {
            edits.push(FieldEdit::Status(v));
        }
        edits
    }

    pub fn is_noop(&self) -> bool {
        self.edits().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_missing_fields_produce_no_edits() {
        let patch = BulkPatch {
            cost_price: Some("   ".to_string()),
            selling_price: None,
            ..BulkPatch::default()
        };
        assert!(patch.is_noop());
    }

    #[test]
    fn provided_fields_become_edits_in_field_order() {
        let patch = BulkPatch {
            selling_price: Some("80".to_string()),
            stock_quantity: Some(3),
            ..BulkPatch::default()
        };
        assert_eq!(
            patch.edits(),
            vec![
                FieldEdit::SellingPrice("80".to_string()),
                FieldEdit::StockQuantity(3)
            ]
        );
    }

    #[test]
    fn deserializes_from_partial_json() {
        let patch: BulkPatch = serde_json::from_str(r#"{"selling_price":"80"}"#).unwrap();
        assert_eq!(patch.selling_price.as_deref(), Some("80"));
        assert!(patch.cost_price.is_none());
    }
}
