//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Provides [`DieselMapStore`], backed by PostgreSQL through `diesel-async`
//! with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapter**: the store only translates between Diesel rows and
//!   domain types.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Owned connections**: each transaction holds one pooled connection
//!   until it commits, rolls back, or is dropped.
//!
//! # Example
//!
//! ```no_run
//! use maps_backend::outbound::persistence::{DbPool, DieselMapStore, PoolConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/maps")).await?;
//! let store = DieselMapStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_map_store;
mod models;
mod pool;
mod schema;

pub use diesel_map_store::DieselMapStore;
pub use pool::{DbPool, PoolConfig, PoolError};
