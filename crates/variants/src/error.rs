//! Engine error model.

use thiserror::Error;

use sellerdesk_core::{AttributeTypeId, AttributeValueId, DomainError};

use crate::row::Identity;

/// Result type used by every editor transition.
pub type VariantResult<T> = Result<T, VariantError>;

/// Local, deterministic failures of a matrix transition.
///
/// None of these are network failures: those stay scoped to the row that
/// issued the call (see [`crate::sync::RowOpError`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("unknown attribute type: {0}")]
    UnknownAttributeType(AttributeTypeId),

    #[error("unknown attribute value {value} for type {attribute_type}")]
    UnknownAttributeValue {
        attribute_type: AttributeTypeId,
        value: AttributeValueId,
    },

    #[error("attribute type {0} is not active")]
    InactiveAttributeType(AttributeTypeId),

    #[error("variant row not found: {0}")]
    RowNotFound(Identity),

    /// A create/update/delete is outstanding for this row.
    #[error("variant row {0} has a request in flight")]
    RowBusy(Identity),

    #[error("variant row {0} has not been persisted yet")]
    NotPersisted(Identity),

    #[error("variant row {0} is already persisted")]
    AlreadyPersisted(Identity),

    /// Existing variants have not finished loading for this edit session.
    #[error("existing variants are still loading")]
    NotLoaded,

    #[error("existing variants were already loaded")]
    AlreadyLoaded,

    #[error(transparent)]
    Domain(#[from] DomainError),
}
