//! Outbound adapters implementing the map store port.
//!
//! - **persistence**: PostgreSQL-backed store using Diesel ORM
//! - **memory**: in-process store for tests and database-less runs
//!
//! Adapters translate between domain types and storage representations.
//! They contain no business rules.

pub mod memory;
pub mod persistence;

pub use memory::InMemoryMapStore;
