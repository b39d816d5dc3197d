//! Driving port for map aggregate reads.

use async_trait::async_trait;

use crate::domain::{Error, Map, MapAggregate};

/// Driving port for listing maps and reading one aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapQuery: Send + Sync {
    /// List map metadata in store order.
    async fn list_maps(&self) -> Result<Vec<Map>, Error>;

    /// Read a map with its zones and routes from a single snapshot.
    async fn get_map(&self, map_id: &str) -> Result<MapAggregate, Error>;
}
