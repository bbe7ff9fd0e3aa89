//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two station names
/// with the same text are the same name, while two stations with the same name
/// but different ids are different entities.
///
/// Constructors of value objects are the place to enforce invariants, so that
/// holding an instance proves the value is valid:
///
/// ```ignore
/// let name = StationName::parse("강남역")?;
/// assert_eq!(name, StationName::parse(" 강남역 ")?);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
