//! Driven port for map aggregate persistence.
//!
//! Adapters expose per-entity operations grouped in a unit of work. Every
//! operation on a [`MapStoreTransaction`] observes the same snapshot and
//! becomes durable only on [`MapStoreTransaction::commit`]. Dropping a
//! transaction without committing discards its writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Map, MapId, Point, Route, RouteDraft, Zone, ZoneDraft};

use super::define_port_error;

define_port_error! {
    /// Errors raised by map store adapters.
    pub enum MapStoreError {
        /// The store could not be reached or a connection could not be
        /// acquired.
        Connection { message: String } => "map store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "map store query failed: {message}",
        /// The addressed map row does not exist.
        NotFound { map_id: MapId } => "map {map_id} not found",
    }
}

/// Metadata for a map row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMap {
    /// Display name.
    pub name: String,
    /// Location of the map's background image.
    pub image_url: String,
    /// Insertion time; the store also uses it as the initial `updated_at`.
    pub created_at: DateTime<Utc>,
}

/// Metadata overwrite applied by [`MapStoreTransaction::update_map_by_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapMetadataUpdate {
    /// Replacement display name.
    pub name: String,
    /// Replacement image location.
    pub image_url: String,
    /// Time of the overwrite; `created_at` is left as stored.
    pub updated_at: DateTime<Utc>,
}

/// Factory for map store transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapStore: Send + Sync {
    /// Open a unit of work.
    async fn begin(&self) -> Result<Box<dyn MapStoreTransaction>, MapStoreError>;
}

/// Unit of work over maps, zones and routes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapStoreTransaction: Send {
    /// Insert a map row; the store assigns its identifier.
    async fn insert_map(&mut self, map: NewMap) -> Result<Map, MapStoreError>;

    /// Overwrite map metadata. Fails with `NotFound` when no row matches.
    async fn update_map_by_id(
        &mut self,
        map_id: MapId,
        update: MapMetadataUpdate,
    ) -> Result<(), MapStoreError>;

    /// Delete a map row and, through the store cascade, its zones and routes.
    /// Fails with `NotFound` when no row was deleted.
    async fn delete_map_by_id(&mut self, map_id: MapId) -> Result<(), MapStoreError>;

    /// Look up a map row.
    async fn get_map_by_id(&mut self, map_id: MapId) -> Result<Option<Map>, MapStoreError>;

    /// List every map row in store order.
    async fn list_maps(&mut self) -> Result<Vec<Map>, MapStoreError>;

    /// Insert one zone for `map_id`.
    async fn insert_zone(
        &mut self,
        map_id: MapId,
        points: Vec<Point>,
        created_at: DateTime<Utc>,
    ) -> Result<Zone, MapStoreError>;

    /// List the zones belonging to `map_id`.
    async fn list_zones_by_map_id(&mut self, map_id: MapId) -> Result<Vec<Zone>, MapStoreError>;

    /// Replace the zone set of `map_id` with `zones`.
    async fn replace_zones_for_map(
        &mut self,
        map_id: MapId,
        zones: Vec<ZoneDraft>,
        created_at: DateTime<Utc>,
    ) -> Result<(), MapStoreError>;

    /// Insert one route for `map_id`.
    async fn insert_route(
        &mut self,
        map_id: MapId,
        points: Vec<Point>,
        created_at: DateTime<Utc>,
    ) -> Result<Route, MapStoreError>;

    /// List the routes belonging to `map_id`.
    async fn list_routes_by_map_id(&mut self, map_id: MapId)
    -> Result<Vec<Route>, MapStoreError>;

    /// Replace the route set of `map_id` with `routes`.
    async fn replace_routes_for_map(
        &mut self,
        map_id: MapId,
        routes: Vec<RouteDraft>,
        created_at: DateTime<Utc>,
    ) -> Result<(), MapStoreError>;

    /// Make every write in this unit of work durable.
    async fn commit(&mut self) -> Result<(), MapStoreError>;

    /// Discard every write in this unit of work.
    async fn rollback(&mut self) -> Result<(), MapStoreError>;
}
