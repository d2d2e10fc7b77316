//! Value object trait: equality by value, not identity.
//!
//! A combination of attribute values is the canonical example in this
//! workspace: two combinations naming the same value ids are the same
//! combination, no matter which row carries them.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct CombinationKey(Vec<AttributeValueId>);
///
/// impl ValueObject for CombinationKey {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
