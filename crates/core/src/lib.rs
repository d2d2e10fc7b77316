//! `sellerdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no transport, no storage).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    AttributeTypeId, AttributeValueId, CategoryId, LocalKey, ProductId, ServerVariantId, SessionId,
};
pub use value_object::ValueObject;
