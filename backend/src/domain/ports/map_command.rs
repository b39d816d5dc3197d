//! Driving port for map aggregate mutations.
//!
//! Identifiers arrive as the caller's raw strings; implementations decode
//! them before touching storage.

use async_trait::async_trait;

use crate::domain::{Error, MapId, MapInput};

/// Driving port for creating, updating and deleting maps.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapCommand: Send + Sync {
    /// Create a map with its zones and routes in one transaction.
    async fn create_map(&self, input: MapInput) -> Result<MapId, Error>;

    /// Overwrite map metadata and replace any supplied geometry sets.
    async fn update_map(&self, map_id: &str, input: MapInput) -> Result<(), Error>;

    /// Delete a map together with its zones and routes.
    async fn delete_map(&self, map_id: &str) -> Result<(), Error>;
}
