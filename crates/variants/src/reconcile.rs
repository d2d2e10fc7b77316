//! Keeps the matrix consistent with the selection.
//!
//! Two strategies, fixed for the lifetime of an editor:
//! - [`Mode::Create`]: rows are disposable, so every selection change
//!   regenerates the whole matrix.
//! - [`Mode::Edit`]: rows carry saved pricing and stock, so the matrix is only
//!   ever patched. Adding a value appends the missing combinations; removing a
//!   value drops exactly the rows carrying it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use sellerdesk_core::{AttributeTypeId, AttributeValueId};

use crate::attribute::AttributeCatalogView;
use crate::combination::{Combination, CombinationPart, cross_with, generate};
use crate::error::VariantResult;
use crate::matrix::VariantMatrix;
use crate::row::VariantRow;
use crate::selection::SelectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Create,
    Edit,
}

/// What a reconciliation pass did to the matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub appended: usize,
    /// Generated rows skipped because their combination already existed.
    pub duplicates_dropped: usize,
    /// Existing rows that gained a component for a newly active type.
    pub extended: usize,
    /// Detached persisted rows moved back because their values are selected again.
    pub restored: usize,
    pub removed: Vec<VariantRow>,
}

/// Does `row` carry `value` for `attribute_type`?
pub fn carries(row: &VariantRow, attribute_type: &AttributeTypeId, value: &AttributeValueId) -> bool {
    row.combination
        .part(attribute_type)
        .is_some_and(|p| &p.value_id == value)
}

/// Rebuild every row from the selection. An incomplete selection (any
/// switched-on type without values) yields an empty matrix.
pub fn regenerate(
    catalog: &AttributeCatalogView,
    selection: &SelectionState,
    matrix: &mut VariantMatrix,
) -> VariantResult<Reconciliation> {
    let rows: Vec<VariantRow> = if selection.is_complete() {
        generate(&catalog.axes(selection)?)
            .into_iter()
            .map(VariantRow::draft)
            .collect()
    } else {
        Vec::new()
    };

    let appended = rows.len();
    let removed = matrix.replace_all(rows);
    debug!(rows = appended, discarded = removed.len(), "variant matrix regenerated");

    Ok(Reconciliation {
        appended,
        removed,
        ..Reconciliation::default()
    })
}

/// Patch the matrix after `value` was added to `attribute_type`.
///
/// `selection` must already contain the value. When the type has just become
/// active, existing rows are first extended with the new component so every
/// row keeps one value per active type.
pub fn on_value_added(
    catalog: &AttributeCatalogView,
    selection: &SelectionState,
    matrix: &mut VariantMatrix,
    attribute_type: &AttributeTypeId,
    value: &AttributeValueId,
) -> VariantResult<Reconciliation> {
    let axis = catalog.axis(attribute_type, std::slice::from_ref(value))?;
    let added = &axis.values[0];
    let order = selection.active_type_ids();

    let mut extended = 0;
    for row in matrix.rows_mut() {
        if row.combination.part(attribute_type).is_some() {
            continue;
        }
        let auto_named = row.display_name == row.combination.display_name();
        let mut parts = row.combination.parts().to_vec();
        parts.push(CombinationPart {
            type_id: axis.type_id.clone(),
            type_name: axis.type_name.clone(),
            value_id: added.id.clone(),
            value: added.value.clone(),
        });
        row.combination = Combination::new(parts).reordered(&order);
        if auto_named {
            row.display_name = row.combination.display_name();
        }
        row.touch();
        extended += 1;
    }

    let others = selection
        .active_entries()
        .filter(|e| &e.attribute_type_id != attribute_type)
        .map(|e| catalog.axis(&e.attribute_type_id, &e.selected_value_ids))
        .collect::<VariantResult<Vec<_>>>()?;

    let rows = cross_with(&others, &axis, added)
        .into_iter()
        .map(|c| VariantRow::draft(c.reordered(&order)))
        .collect();
    let (appended, duplicates_dropped) = matrix.append_unique(rows);

    debug!(
        attribute_type = %attribute_type,
        value = %value,
        appended,
        duplicates_dropped,
        extended,
        "variant matrix patched after value added"
    );

    Ok(Reconciliation {
        appended,
        duplicates_dropped,
        extended,
        ..Reconciliation::default()
    })
}

/// Patch the matrix after `value` was removed from `attribute_type`: drop
/// exactly the rows carrying it and leave every other row as it was.
pub fn on_value_removed(
    matrix: &mut VariantMatrix,
    attribute_type: &AttributeTypeId,
    value: &AttributeValueId,
) -> Reconciliation {
    let removed = matrix.extract(|row| carries(row, attribute_type, value));
    debug!(
        attribute_type = %attribute_type,
        value = %value,
        removed = removed.len(),
        "variant matrix patched after value removed"
    );
    Reconciliation {
        removed,
        ..Reconciliation::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::fixtures::catalog;
    use crate::row::{FieldEdit, Identity};

    fn t(id: &str) -> AttributeTypeId {
        id.into()
    }

    fn v(id: &str) -> AttributeValueId {
        id.into()
    }

    fn select(pairs: &[(&str, &[&str])]) -> SelectionState {
        let mut s = SelectionState::new();
        for (ty, values) in pairs {
            s.toggle_type(&t(ty));
            for value in *values {
                s.toggle_value(&t(ty), &v(value)).unwrap();
            }
        }
        s
    }

    fn names(m: &VariantMatrix) -> Vec<String> {
        m.rows().iter().map(|r| r.display_name.clone()).collect()
    }

    #[test]
    fn regenerate_single_type() {
        let mut m = VariantMatrix::new();
        regenerate(&catalog(), &select(&[("color", &["red", "blue"])]), &mut m).unwrap();
        assert_eq!(names(&m), vec!["Red", "Blue"]);
    }

    #[test]
    fn regenerate_two_types_in_nesting_order() {
        let mut m = VariantMatrix::new();
        let selection = select(&[("color", &["red", "blue"]), ("size", &["s", "m"])]);
        regenerate(&catalog(), &selection, &mut m).unwrap();
        assert_eq!(names(&m), vec!["Red / S", "Red / M", "Blue / S", "Blue / M"]);
    }

    #[test]
    fn regenerate_with_an_empty_switched_on_type_empties_the_matrix() {
        let mut m = VariantMatrix::new();
        regenerate(&catalog(), &select(&[("color", &["red"])]), &mut m).unwrap();
        assert_eq!(m.len(), 1);

        let selection = select(&[("color", &["red"]), ("size", &[])]);
        let outcome = regenerate(&catalog(), &selection, &mut m).unwrap();
        assert!(m.is_empty());
        assert_eq!(outcome.removed.len(), 1);
    }

    #[test]
    fn adding_a_value_appends_only_new_combinations_and_keeps_existing_rows() {
        let catalog = catalog();
        let mut selection = select(&[("color", &["red", "blue"]), ("size", &["s"])]);
        let mut m = VariantMatrix::new();
        regenerate(&catalog, &selection, &mut m).unwrap();
        let red_s = m.rows()[0].identity.clone();
        let blue_s = m.rows()[1].identity.clone();
        m.update_field(&red_s, FieldEdit::StockQuantity(5)).unwrap();
        m.update_field(&blue_s, FieldEdit::StockQuantity(7)).unwrap();

        selection.toggle_value(&t("size"), &v("m")).unwrap();
        let outcome = on_value_added(&catalog, &selection, &mut m, &t("size"), &v("m")).unwrap();

        assert_eq!(outcome.appended, 2);
        assert_eq!(names(&m), vec!["Red / S", "Blue / S", "Red / M", "Blue / M"]);
        let stocks: Vec<_> = m.rows().iter().map(|r| r.stock_quantity).collect();
        assert_eq!(stocks, vec![5, 7, 0, 0]);
        assert!(m.rows()[2..].iter().all(|r| matches!(r.identity, Identity::Draft { .. })));
    }

    #[test]
    fn adding_the_same_value_twice_never_duplicates_rows() {
        let catalog = catalog();
        let selection = select(&[("color", &["red"]), ("size", &["s"])]);
        let mut m = VariantMatrix::new();
        regenerate(&catalog, &selection, &mut m).unwrap();

        let outcome = on_value_added(&catalog, &selection, &mut m, &t("size"), &v("s")).unwrap();
        assert_eq!(outcome.appended, 0);
        assert_eq!(outcome.duplicates_dropped, 1);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn first_value_of_a_new_type_extends_existing_rows() {
        let catalog = catalog();
        let mut selection = select(&[("color", &["red", "blue"])]);
        let mut m = VariantMatrix::new();
        regenerate(&catalog, &selection, &mut m).unwrap();
        let red = m.rows()[0].identity.clone();
        m.update_field(&red, FieldEdit::SellingPrice("10".to_string())).unwrap();

        selection.toggle_type(&t("size"));
        selection.toggle_value(&t("size"), &v("s")).unwrap();
        let outcome = on_value_added(&catalog, &selection, &mut m, &t("size"), &v("s")).unwrap();

        assert_eq!(outcome.extended, 2);
        assert_eq!(outcome.appended, 0);
        assert_eq!(names(&m), vec!["Red / S", "Blue / S"]);
        assert_eq!(m.get(&red).unwrap().selling_price, "10");
    }

    #[test]
    fn adding_to_the_only_type_creates_one_row() {
        let catalog = catalog();
        let selection = select(&[("color", &["green"])]);
        let mut m = VariantMatrix::new();
        on_value_added(&catalog, &selection, &mut m, &t("color"), &v("green")).unwrap();
        assert_eq!(names(&m), vec!["Green"]);
    }

    #[test]
    fn removing_a_value_drops_exactly_its_rows() {
        let catalog = catalog();
        let selection = select(&[("color", &["red", "blue"]), ("size", &["s", "m"])]);
        let mut m = VariantMatrix::new();
        regenerate(&catalog, &selection, &mut m).unwrap();
        let survivors: Vec<_> = m
            .rows()
            .iter()
            .filter(|r| !carries(r, &t("size"), &v("m")))
            .cloned()
            .collect();

        let outcome = on_value_removed(&mut m, &t("size"), &v("m"));
        assert_eq!(outcome.removed.len(), 2);
        assert_eq!(m.rows(), survivors.as_slice());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        #[derive(Debug, Clone)]
        enum Op {
            Toggle(usize, usize),
            Stock(usize, i64),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0usize..2, 0usize..3).prop_map(|(t, v)| Op::Toggle(t, v)),
                (0usize..16, 0i64..100).prop_map(|(r, s)| Op::Stock(r, s)),
            ]
        }

        const TYPES: [&str; 2] = ["color", "size"];
        const VALUES: [[&str; 3]; 2] = [["red", "blue", "green"], ["s", "m", "l"]];

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: after any sequence of incremental patches the matrix
            /// has no duplicate combinations and every row carries every
            /// active type.
            #[test]
            fn incremental_patching_keeps_matrix_consistent(ops in prop::collection::vec(op_strategy(), 0..40)) {
                let catalog = catalog();
                let mut selection = SelectionState::new();
                selection.toggle_type(&t(TYPES[0]));
                selection.toggle_type(&t(TYPES[1]));
                let mut m = VariantMatrix::new();

                for op in ops {
                    match op {
                        Op::Toggle(ti, vi) => {
                            let (ty, val) = (t(TYPES[ti]), v(VALUES[ti][vi]));
                            match selection.toggle_value(&ty, &val).unwrap() {
                                crate::selection::ValueToggle::Added => {
                                    on_value_added(&catalog, &selection, &mut m, &ty, &val).unwrap();
                                }
                                crate::selection::ValueToggle::Removed => {
                                    on_value_removed(&mut m, &ty, &val);
                                }
                            }
                        }
                        Op::Stock(ri, stock) => {
                            if let Some(id) = m.rows().get(ri).map(|r| r.identity.clone()) {
                                m.update_field(&id, FieldEdit::StockQuantity(stock)).unwrap();
                            }
                        }
                    }

                    let keys: HashSet<_> = m.rows().iter().map(VariantRow::key).collect();
                    prop_assert_eq!(keys.len(), m.len());

                    let active: HashSet<_> = selection.active_type_ids().into_iter().collect();
                    for row in m.rows() {
                        let carried: HashSet<_> = row.combination.type_ids().cloned().collect();
                        prop_assert_eq!(&carried, &active);
                    }
                }
            }

            /// Property: removing a value leaves every other row unchanged.
            #[test]
            fn removal_is_local(stocks in prop::collection::vec(0i64..1000, 9), victim in 0usize..3) {
                let catalog = catalog();
                let selection = select(&[("color", &["red", "blue", "green"]), ("size", &["s", "m", "l"])]);
                let mut m = VariantMatrix::new();
                regenerate(&catalog, &selection, &mut m).unwrap();
                let ids: Vec<_> = m.rows().iter().map(|r| r.identity.clone()).collect();
                for (id, stock) in ids.iter().zip(stocks) {
                    m.update_field(id, FieldEdit::StockQuantity(stock)).unwrap();
                }

                let value = v(VALUES[1][victim]);
                let expected: Vec<_> = m
                    .rows()
                    .iter()
                    .filter(|r| !carries(r, &t("size"), &value))
                    .cloned()
                    .collect();
                on_value_removed(&mut m, &t("size"), &value);
                prop_assert_eq!(m.rows(), expected.as_slice());
            }
        }
    }
}
