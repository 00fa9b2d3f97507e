//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**: two value objects with the same values
//! are equal. Filter settings and aggregated metrics are value objects; an
//! invoice is an entity.

/// Marker trait for value objects.
///
/// Requires `Clone` (cheap to copy), `PartialEq` (compared by attribute values)
/// and `Debug` (shows up in logs and test failures).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct StatusMetrics {
///     count: usize,
///     amount: i64,
/// }
///
/// impl ValueObject for StatusMetrics {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
