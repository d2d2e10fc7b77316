//! Per-row remote persistence.
//!
//! A row request runs in two phases so the rest of the matrix stays editable
//! while it is in flight:
//!
//! 1. `begin_*` on the editor locks the row and snapshots its payload into a
//!    [`PendingRowOp`];
//! 2. the gateway call runs with no editor borrow held;
//! 3. `complete_*` applies the outcome, unless the editor session changed in
//!    the meantime, in which case the response is discarded.
//!
//! [`RowSync`] drives this cycle for editors shared behind a
//! `tokio::sync::Mutex`. Failures stay scoped to their row and are never
//! retried here.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

use sellerdesk_core::{ProductId, ServerVariantId, SessionId};

use crate::editor::VariantEditor;
use crate::error::VariantError;
use crate::gateway::{GatewayError, PersistenceGateway, VariantPayload};
use crate::row::{Identity, RowOpKind};

/// Ticket for one outstanding row request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRowOp {
    pub session: SessionId,
    pub product_id: ProductId,
    pub kind: RowOpKind,
    pub identity: Identity,
    pub payload: VariantPayload,
    /// Row revision the payload was taken from.
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The owning session was torn down; nothing was changed.
    Discarded,
}

/// Row-scoped failure of a persistence request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowOpError {
    /// The request was refused locally (row busy, wrong state, ...).
    #[error(transparent)]
    Rejected(#[from] VariantError),

    #[error("request for variant {identity} failed: {source}")]
    Remote {
        identity: Identity,
        source: GatewayError,
    },
}

/// Drives row requests for an editor shared behind an async mutex.
pub struct RowSync<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G: ?Sized> Clone for RowSync<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> RowSync<G>
where
    G: PersistenceGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn create(
        &self,
        editor: &Mutex<VariantEditor>,
        id: &Identity,
    ) -> Result<Completion, RowOpError> {
        let op = editor.lock().await.begin_create(id)?;
        let result = self.gateway.create(&op.product_id, &op.payload).await;
        editor.lock().await.complete_create(op, result)
    }

    pub async fn update(
        &self,
        editor: &Mutex<VariantEditor>,
        id: &Identity,
    ) -> Result<Completion, RowOpError> {
        let op = editor.lock().await.begin_update(id)?;
        let result = match op.identity.server_id() {
            Some(server_id) => self.gateway.update(&op.product_id, server_id, &op.payload).await,
            None => Err(GatewayError::NotFound),
        };
        editor.lock().await.complete_update(op, result)
    }

    pub async fn delete(
        &self,
        editor: &Mutex<VariantEditor>,
        id: &Identity,
    ) -> Result<Completion, RowOpError> {
        let op = editor.lock().await.begin_delete(id)?;
        let result = match op.identity.server_id() {
            Some(server_id) => self.gateway.delete(&op.product_id, server_id).await,
            None => Err(GatewayError::NotFound),
        };
        editor.lock().await.complete_delete(op, result)
    }

    /// Create drafts, update persisted rows.
    pub async fn save(
        &self,
        editor: &Mutex<VariantEditor>,
        id: &Identity,
    ) -> Result<Completion, RowOpError> {
        if id.is_persisted() {
            self.update(editor, id).await
        } else {
            self.create(editor, id).await
        }
    }

    /// Remotely delete every detached row. Successful deletes are forgotten;
    /// failed ones stay detached and are reported.
    pub async fn purge_detached(
        &self,
        editor: &Mutex<VariantEditor>,
    ) -> Vec<(ServerVariantId, GatewayError)> {
        let (session, product_id, ids) = {
            let mut guard = editor.lock().await;
            let ids = guard.begin_purge();
            (guard.session(), guard.product_id().clone(), ids)
        };

        let mut failures = Vec::new();
        for id in ids {
            match self.gateway.delete(&product_id, &id).await {
                Ok(()) => {
                    let mut guard = editor.lock().await;
                    if guard.session() == session {
                        guard.forget_detached(&id);
                    }
                }
                Err(e) => {
                    warn!(variant = %id, error = %e, "detached variant delete failed");
                    let mut guard = editor.lock().await;
                    if guard.session() == session {
                        guard.fail_purge(&id, &e);
                    }
                    failures.push((id, e));
                }
            }
        }
        failures
    }
}
