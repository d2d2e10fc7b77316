//! In-memory collaborator implementing every gateway trait.
//!
//! Intended for tests/dev. Failures can be scripted per operation kind.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use sellerdesk_core::{CategoryId, ProductId, ServerVariantId};

use crate::attribute::AttributeType;
use crate::gateway::{
    AttributeCatalog, ExistingVariantsLoader, GatewayError, PersistedVariantRecord,
    PersistenceGateway, VariantPayload,
};
use crate::row::RowOpKind;

#[derive(Debug, Default)]
pub struct InMemoryVariantStore {
    categories: RwLock<HashMap<CategoryId, Vec<AttributeType>>>,
    products: RwLock<HashMap<ProductId, Vec<PersistedVariantRecord>>>,
    failures: RwLock<VecDeque<(RowOpKind, GatewayError)>>,
    calls: RwLock<Vec<RowOpKind>>,
    next_id: AtomicU64,
}

fn poisoned() -> GatewayError {
    GatewayError::Api(500, "lock poisoned".to_string())
}

impl InMemoryVariantStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding recovers a poisoned lock and clears the poison: the guarded
    // collections hold no cross-field invariant a panic could have broken.

    pub fn with_category(mut self, category_id: CategoryId, types: Vec<AttributeType>) -> Self {
        self.categories
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category_id, types);
        self.categories.clear_poison();
        self
    }

    pub fn with_variants(mut self, product_id: ProductId, records: Vec<PersistedVariantRecord>) -> Self {
        self.products
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product_id, records);
        self.products.clear_poison();
        self
    }

    /// Make the next call of `kind` fail with `error`.
    pub fn fail_next(&self, kind: RowOpKind, error: GatewayError) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back((kind, error));
        self.failures.clear_poison();
    }

    /// Remote calls received so far, in order.
    pub fn calls(&self) -> Vec<RowOpKind> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn stored(&self, product_id: &ProductId) -> Vec<PersistedVariantRecord> {
        self.products
            .read()
            .ok()
            .and_then(|p| p.get(product_id).cloned())
            .unwrap_or_default()
    }

    fn record_call(&self, kind: RowOpKind) -> Result<(), GatewayError> {
        self.calls.write().map_err(|_| poisoned())?.push(kind);

        let mut failures = self.failures.write().map_err(|_| poisoned())?;
        if let Some(idx) = failures.iter().position(|(k, _)| *k == kind) {
            if let Some((_, err)) = failures.remove(idx) {
                return Err(err);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AttributeCatalog for InMemoryVariantStore {
    async fn attributes_for_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<AttributeType>, GatewayError> {
        let categories = self.categories.read().map_err(|_| poisoned())?;
        categories
            .get(category_id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }
}

#[async_trait]
impl ExistingVariantsLoader for InMemoryVariantStore {
    async fn variants(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<PersistedVariantRecord>, GatewayError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(product_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryVariantStore {
    async fn create(
        &self,
        product_id: &ProductId,
        payload: &VariantPayload,
    ) -> Result<ServerVariantId, GatewayError> {
        self.record_call(RowOpKind::Create)?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = ServerVariantId::parse(n.to_string())
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        let mut products = self.products.write().map_err(|_| poisoned())?;
        products
            .entry(product_id.clone())
            .or_default()
            .push(payload.clone().into_record(id.clone()));
        Ok(id)
    }

    async fn update(
        &self,
        product_id: &ProductId,
        variant_id: &ServerVariantId,
        payload: &VariantPayload,
    ) -> Result<(), GatewayError> {
        self.record_call(RowOpKind::Update)?;
        let mut products = self.products.write().map_err(|_| poisoned())?;
        let record = products
            .get_mut(product_id)
            .and_then(|records| records.iter_mut().find(|r| &r.id == variant_id))
            .ok_or(GatewayError::NotFound)?;
        *record = payload.clone().into_record(variant_id.clone());
        Ok(())
    }

    async fn delete(
        &self,
        product_id: &ProductId,
        variant_id: &ServerVariantId,
    ) -> Result<(), GatewayError> {
        self.record_call(RowOpKind::Delete)?;
        let mut products = self.products.write().map_err(|_| poisoned())?;
        let records = products.get_mut(product_id).ok_or(GatewayError::NotFound)?;
        let before = records.len();
        records.retain(|r| &r.id != variant_id);
        if records.len() == before {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }
}
