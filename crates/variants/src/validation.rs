//! Readiness check gating progression to the next workflow step.
//!
//! Issues are values, not errors: they are shown next to the offending row or
//! field and block only progression, never editing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sellerdesk_core::AttributeTypeId;

use crate::matrix::VariantMatrix;
use crate::row::{Identity, VariantField};
use crate::selection::SelectionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    NoAttributeTypes,
    AttributeTypeWithoutValues { attribute_type: AttributeTypeId },
    EmptyMatrix,
    /// Selling price missing, unparsable, or not above zero.
    SellingPriceNotPositive,
    NegativeStock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub row: Option<Identity>,
    pub field: Option<VariantField>,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl ValidationIssue {
    fn global(kind: IssueKind) -> Self {
        Self {
            row: None,
            field: None,
            kind,
        }
    }

    fn row(row: &Identity, field: VariantField, kind: IssueKind) -> Self {
        Self {
            row: Some(row.clone()),
            field: Some(field),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues_for<'a>(&'a self, row: &'a Identity) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.row.as_ref() == Some(row))
    }
}

/// Ready iff at least one type is switched on, every switched-on type has a
/// value, the matrix has rows, and every row has `selling_price > 0` and
/// `stock_quantity >= 0`.
pub fn evaluate(selection: &SelectionState, matrix: &VariantMatrix) -> ValidationReport {
    let mut issues = Vec::new();

    if selection.entries().is_empty() {
        issues.push(ValidationIssue::global(IssueKind::NoAttributeTypes));
    }
    for entry in selection.entries().iter().filter(|e| !e.is_active()) {
        issues.push(ValidationIssue::global(IssueKind::AttributeTypeWithoutValues {
            attribute_type: entry.attribute_type_id.clone(),
        }));
    }
    if matrix.is_empty() {
        issues.push(ValidationIssue::global(IssueKind::EmptyMatrix));
    }

    for row in matrix.rows() {
        let price_ok = row
            .selling_price_amount()
            .is_some_and(|p| p > Decimal::ZERO);
        if !price_ok {
            issues.push(ValidationIssue::row(
                &row.identity,
                VariantField::SellingPrice,
                IssueKind::SellingPriceNotPositive,
            ));
        }
        if row.stock_quantity < 0 {
            issues.push(ValidationIssue::row(
                &row.identity,
                VariantField::StockQuantity,
                IssueKind::NegativeStock,
            ));
        }
    }

    ValidationReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::BulkPatch;
    use crate::matrix::fixtures::matrix;
    use crate::row::FieldEdit;

    fn complete_selection() -> SelectionState {
        let mut s = SelectionState::new();
        s.toggle_type(&"color".into());
        s.toggle_value(&"color".into(), &"red".into()).unwrap();
        s
    }

    fn priced(m: &mut VariantMatrix) {
        m.apply_bulk(&BulkPatch {
            selling_price: Some("19.99".to_string()),
            ..BulkPatch::default()
        });
    }

    #[test]
    fn empty_editor_is_not_ready() {
        let report = evaluate(&SelectionState::new(), &VariantMatrix::new());
        assert!(!report.is_ready());
        let kinds: Vec<_> = report.issues.iter().map(|i| i.kind.clone()).collect();
        assert_eq!(kinds, vec![IssueKind::NoAttributeTypes, IssueKind::EmptyMatrix]);
    }

    #[test]
    fn priced_complete_matrix_is_ready() {
        let mut m = matrix();
        priced(&mut m);
        assert!(evaluate(&complete_selection(), &m).is_ready());
    }

    #[test]
    fn switched_on_type_without_values_blocks() {
        let mut m = matrix();
        priced(&mut m);
        let mut selection = complete_selection();
        selection.toggle_type(&"size".into());

        let report = evaluate(&selection, &m);
        assert_eq!(
            report.issues,
            vec![ValidationIssue::global(IssueKind::AttributeTypeWithoutValues {
                attribute_type: "size".into()
            })]
        );
    }

    #[test]
    fn zero_blank_or_garbage_price_is_flagged_per_row() {
        let mut m = matrix();
        priced(&mut m);
        let ids: Vec<_> = m.rows().iter().map(|r| r.identity.clone()).collect();
        m.update_field(&ids[0], FieldEdit::SellingPrice("0".to_string())).unwrap();
        m.update_field(&ids[1], FieldEdit::SellingPrice(String::new())).unwrap();
        m.update_field(&ids[2], FieldEdit::SellingPrice("abc".to_string())).unwrap();

        let report = evaluate(&complete_selection(), &m);
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.issues_for(&ids[3]).count(), 0);
        let flagged = report.issues_for(&ids[0]).next().unwrap();
        assert_eq!(flagged.field, Some(VariantField::SellingPrice));
    }

    #[test]
    fn negative_stock_is_flagged_but_zero_is_fine() {
        let mut m = matrix();
        priced(&mut m);
        let ids: Vec<_> = m.rows().iter().map(|r| r.identity.clone()).collect();
        m.update_field(&ids[1], FieldEdit::StockQuantity(-1)).unwrap();

        let report = evaluate(&complete_selection(), &m);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::NegativeStock);
        assert_eq!(report.issues[0].row.as_ref(), Some(&ids[1]));
    }
}
