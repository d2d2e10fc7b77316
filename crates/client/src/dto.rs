//! Wire shapes of the dashboard backend and their mapping to domain types.
//!
//! The backend is loose about numbers: prices and ids arrive either as JSON
//! strings or as JSON numbers, so both are accepted.

use serde::{Deserialize, Serialize};

use sellerdesk_core::{AttributeTypeId, AttributeValueId, DomainError, ServerVariantId};
use sellerdesk_variants::{
    AttributeType, AttributeValue, PersistedVariantRecord, RecordAttribute, RowStatus,
    VariantPayload,
};

/// A string-or-number scalar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Text(String),
    Number(serde_json::Number),
}

impl Loose {
    pub fn into_string(self) -> String {
        match self {
            Loose::Text(s) => s,
            Loose::Number(n) => n.to_string(),
        }
    }
}

fn loose_string(value: Option<Loose>) -> String {
    value.map(Loose::into_string).unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeValueDto {
    pub id: Loose,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeTypeDto {
    pub id: Loose,
    pub name: String,
    #[serde(default)]
    pub values: Vec<AttributeValueDto>,
}

impl TryFrom<AttributeTypeDto> for AttributeType {
    type Error = DomainError;

    fn try_from(dto: AttributeTypeDto) -> Result<Self, Self::Error> {
        Ok(AttributeType {
            id: AttributeTypeId::parse(dto.id.into_string())?,
            name: dto.name,
            values: dto
                .values
                .into_iter()
                .map(|v| {
                    Ok(AttributeValue {
                        id: AttributeValueId::parse(v.id.into_string())?,
                        value: v.value,
                    })
                })
                .collect::<Result<_, DomainError>>()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantAttributeDto {
    pub attribute_type_id: Loose,
    pub attribute_type_name: String,
    pub value_id: Loose,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantDto {
    pub id: Loose,
    #[serde(default)]
    pub attributes: Vec<VariantAttributeDto>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cost_price: Option<Loose>,
    #[serde(default)]
    pub price: Option<Loose>,
    #[serde(default)]
    pub discount_price: Option<Loose>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub status: RowStatus,
}

impl TryFrom<VariantDto> for PersistedVariantRecord {
    type Error = DomainError;

    fn try_from(dto: VariantDto) -> Result<Self, Self::Error> {
        let attributes = dto
            .attributes
            .into_iter()
            .map(|a| {
                Ok(RecordAttribute {
                    attribute_type_id: AttributeTypeId::parse(a.attribute_type_id.into_string())?,
                    attribute_type_name: a.attribute_type_name,
                    value_id: AttributeValueId::parse(a.value_id.into_string())?,
                    value: a.value,
                })
            })
            .collect::<Result<_, DomainError>>()?;

        Ok(PersistedVariantRecord {
            id: ServerVariantId::parse(dto.id.into_string())?,
            attributes,
            display_name: dto.name,
            cost_price: loose_string(dto.cost_price),
            selling_price: loose_string(dto.price),
            discount_price: loose_string(dto.discount_price),
            stock_quantity: dto.stock,
            is_default: dto.is_default,
            status: dto.status,
        })
    }
}

/// Body of create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantWriteDto {
    pub attribute_value_ids: Vec<String>,
    pub name: String,
    pub cost_price: Option<String>,
    pub price: Option<String>,
    pub discount_price: Option<String>,
    pub stock: i64,
    pub is_default: bool,
    pub status: RowStatus,
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl From<&VariantPayload> for VariantWriteDto {
    fn from(payload: &VariantPayload) -> Self {
        Self {
            attribute_value_ids: payload
                .value_ids()
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
            name: payload.display_name.clone(),
            cost_price: non_blank(&payload.cost_price),
            price: non_blank(&payload.selling_price),
            discount_price: non_blank(&payload.discount_price),
            stock: payload.stock_quantity,
            is_default: payload.is_default,
            status: payload.status,
        }
    }
}

/// Response of a create request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedDto {
    pub id: Loose,
}
