//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two amounts of `$10.00` are the same
/// amount. Compare with [`crate::Entity`], where two records with equal ids
/// are the same record even if their fields differ.
///
/// ```
/// use cashguard_core::Money;
///
/// let a: Money = "10".parse().unwrap();
/// let b = Money::from_cents(1_000);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
