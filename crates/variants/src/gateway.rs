//! Contracts with the remote collaborators.
//!
//! The engine never talks to the network itself: hosts hand it an
//! [`AttributeCatalog`], an [`ExistingVariantsLoader`] and a
//! [`PersistenceGateway`]. Timeouts and retries are the implementor's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sellerdesk_core::{
    AttributeTypeId, AttributeValueId, CategoryId, ProductId, ServerVariantId,
};

use crate::attribute::AttributeType;
use crate::combination::{Combination, CombinationPart};
use crate::row::{RowStatus, VariantRow};

/// Failure of a remote call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found")]
    NotFound,
    #[error("configuration error: {0}")]
    Config(String),
}

/// One attribute assignment of a stored variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttribute {
    pub attribute_type_id: AttributeTypeId,
    pub attribute_type_name: String,
    pub value_id: AttributeValueId,
    pub value: String,
}

impl From<&CombinationPart> for RecordAttribute {
    fn from(part: &CombinationPart) -> Self {
        Self {
            attribute_type_id: part.type_id.clone(),
            attribute_type_name: part.type_name.clone(),
            value_id: part.value_id.clone(),
            value: part.value.clone(),
        }
    }
}

impl From<&RecordAttribute> for CombinationPart {
    fn from(attr: &RecordAttribute) -> Self {
        Self {
            type_id: attr.attribute_type_id.clone(),
            type_name: attr.attribute_type_name.clone(),
            value_id: attr.value_id.clone(),
            value: attr.value.clone(),
        }
    }
}

/// A variant as the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedVariantRecord {
    pub id: ServerVariantId,
    pub attributes: Vec<RecordAttribute>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub cost_price: String,
    #[serde(default)]
    pub selling_price: String,
    #[serde(default)]
    pub discount_price: String,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub status: RowStatus,
}

impl PersistedVariantRecord {
    pub fn combination(&self) -> Combination {
        Combination::new(self.attributes.iter().map(CombinationPart::from).collect())
    }
}

/// Field values sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPayload {
    pub attributes: Vec<RecordAttribute>,
    pub display_name: String,
    pub cost_price: String,
    pub selling_price: String,
    pub discount_price: String,
    pub stock_quantity: i64,
    pub is_default: bool,
    pub status: RowStatus,
}

impl VariantPayload {
    pub fn from_row(row: &VariantRow) -> Self {
        Self {
            attributes: row
                .combination
                .parts()
                .iter()
                .map(RecordAttribute::from)
                .collect(),
            display_name: row.display_name.clone(),
            cost_price: row.cost_price.clone(),
            selling_price: row.selling_price.clone(),
            discount_price: row.discount_price.clone(),
            stock_quantity: row.stock_quantity,
            is_default: row.is_default,
            status: row.status,
        }
    }

    pub fn value_ids(&self) -> Vec<AttributeValueId> {
        self.attributes.iter().map(|a| a.value_id.clone()).collect()
    }

    pub fn into_record(self, id: ServerVariantId) -> PersistedVariantRecord {
        PersistedVariantRecord {
            id,
            attributes: self.attributes,
            display_name: Some(self.display_name),
            cost_price: self.cost_price,
            selling_price: self.selling_price,
            discount_price: self.discount_price,
            stock_quantity: self.stock_quantity,
            is_default: self.is_default,
            status: self.status,
        }
    }
}

/// Supplies attribute types for a category.
#[async_trait]
pub trait AttributeCatalog: Send + Sync {
    async fn attributes_for_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<AttributeType>, GatewayError>;
}

/// Supplies the variants already stored for a product.
#[async_trait]
pub trait ExistingVariantsLoader: Send + Sync {
    async fn variants(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<PersistedVariantRecord>, GatewayError>;
}

/// Per-row remote persistence. Calls are independent and never batched.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn create(
        &self,
        product_id: &ProductId,
        payload: &VariantPayload,
    ) -> Result<ServerVariantId, GatewayError>;

    async fn update(
        &self,
        product_id: &ProductId,
        variant_id: &ServerVariantId,
        payload: &VariantPayload,
    ) -> Result<(), GatewayError>;

    async fn delete(
        &self,
        product_id: &ProductId,
        variant_id: &ServerVariantId,
    ) -> Result<(), GatewayError>;
}
