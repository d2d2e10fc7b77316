#![allow(dead_code)]

use sellerdesk_variants::{
    AttributeCatalogView, AttributeType, AttributeValue, Identity, PersistedVariantRecord,
    RecordAttribute, RowStatus, VariantEditor,
};

pub fn attribute(id: &str, name: &str, values: &[(&str, &str)]) -> AttributeType {
    AttributeType {
        id: id.into(),
        name: name.to_string(),
        values: values
            .iter()
            .map(|(id, value)| AttributeValue {
                id: (*id).into(),
                value: value.to_string(),
            })
            .collect(),
    }
}

pub fn catalog_types() -> Vec<AttributeType> {
    vec![
        attribute(
            "color",
            "Color",
            &[("red", "Red"), ("blue", "Blue"), ("green", "Green")],
        ),
        attribute("size", "Size", &[("s", "S"), ("m", "M"), ("l", "L")]),
    ]
}

pub fn catalog() -> AttributeCatalogView {
    AttributeCatalogView::new(catalog_types())
}

fn part(type_id: &str, value_id: &str) -> RecordAttribute {
    let types = catalog_types();
    let ty = types.iter().find(|t| t.id.as_str() == type_id).unwrap();
    let value = ty.values.iter().find(|v| v.id.as_str() == value_id).unwrap();
    RecordAttribute {
        attribute_type_id: ty.id.clone(),
        attribute_type_name: ty.name.clone(),
        value_id: value.id.clone(),
        value: value.value.clone(),
    }
}

/// Stored variant with the given `(type, value)` assignments.
pub fn record(id: &str, attrs: &[(&str, &str)], stock: i64) -> PersistedVariantRecord {
    PersistedVariantRecord {
        id: id.into(),
        attributes: attrs.iter().map(|(t, v)| part(t, v)).collect(),
        display_name: None,
        cost_price: "5".to_string(),
        selling_price: "10".to_string(),
        discount_price: String::new(),
        stock_quantity: stock,
        is_default: false,
        status: RowStatus::Active,
    }
}

pub fn names(editor: &VariantEditor) -> Vec<String> {
    editor.rows().iter().map(|r| r.display_name.clone()).collect()
}

pub fn ids(editor: &VariantEditor) -> Vec<Identity> {
    editor.rows().iter().map(|r| r.identity.clone()).collect()
}

pub fn create_editor() -> VariantEditor {
    VariantEditor::for_create("p1".into(), catalog())
}

/// Edit-mode editor loaded with Red-S(stock 5) and Blue-S(stock 7).
pub fn edit_editor() -> VariantEditor {
    let mut editor = VariantEditor::for_edit("p1".into(), catalog());
    editor
        .finish_loading(vec![
            record("10", &[("color", "red"), ("size", "s")], 5),
            record("11", &[("color", "blue"), ("size", "s")], 7),
        ])
        .unwrap();
    editor
}
