//! Station and member store adapters.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryMemberStore, InMemoryStationStore};
pub use postgres::{PostgresMemberStore, PostgresStationStore, migrate};
