//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: an order line
/// for 10 `RED-CHAIR` on order `o1` is equal to any other line with the same
/// order, SKU and quantity. To "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
