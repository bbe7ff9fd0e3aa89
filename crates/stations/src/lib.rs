//! Stations domain module.
//!
//! A station is a named entity owned by exactly one member. Every operation is
//! scoped to the calling principal: other members' stations are invisible, and
//! touching one is indistinguishable from touching an id that does not exist.

pub mod repository;
pub mod service;
pub mod station;

pub use repository::{StationRepository, StationStoreError};
pub use service::{StationError, StationService};
pub use station::{NewStation, Station, StationName};
