//! `sellerdesk-variants`: product variant combination & reconciliation.
//!
//! Given the attribute types a seller switched on (Color, Size, ...) and the
//! values chosen for each, this crate keeps an ordered matrix of variant rows
//! in step with the selection and synchronizes each row with a remote store,
//! without ever dropping pricing or stock the seller already entered.
//!
//! Pure domain logic lives in [`combination`], [`selection`], [`matrix`],
//! [`reconcile`] and [`validation`]; [`editor`] wires them into a controller;
//! [`sync`] runs per-row remote requests against the traits in [`gateway`].

pub mod attribute;
pub mod bulk;
pub mod combination;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod in_memory;
pub mod matrix;
pub mod reconcile;
pub mod row;
pub mod selection;
pub mod sync;
pub mod validation;

pub use attribute::{AttributeCatalogView, AttributeType, AttributeValue};
pub use bulk::BulkPatch;
pub use combination::{Axis, Combination, CombinationKey, CombinationPart, generate};
pub use editor::{EditorSnapshot, LoadState, LoadSummary, OpenError, VariantEditor};
pub use error::{VariantError, VariantResult};
pub use gateway::{
    AttributeCatalog, ExistingVariantsLoader, GatewayError, PersistedVariantRecord,
    PersistenceGateway, RecordAttribute, VariantPayload,
};
pub use in_memory::InMemoryVariantStore;
pub use matrix::VariantMatrix;
pub use reconcile::{Mode, Reconciliation};
pub use row::{FieldEdit, Identity, RowOpKind, RowStatus, RowSyncState, VariantField, VariantRow};
pub use selection::{SelectionEntry, SelectionState, TypeToggle, ValueToggle};
pub use sync::{Completion, PendingRowOp, RowOpError, RowSync};
pub use validation::{IssueKind, ValidationIssue, ValidationReport};
