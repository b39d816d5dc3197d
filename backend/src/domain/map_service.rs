//! Map aggregate service.
//!
//! Implements the [`MapCommand`] and [`MapQuery`] driving ports on top of the
//! [`MapStore`] driven port. Identifiers and geometry are validated before a
//! transaction is opened; every multi-entity write runs in one unit of work
//! that is committed on success and rolled back on any failure. Store errors
//! never cross this boundary unmapped.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    MapCommand, MapMetadataUpdate, MapQuery, MapStore, MapStoreError, MapStoreTransaction, NewMap,
};
use crate::domain::{
    Error, GeometryValidationError, Map, MapAggregate, MapId, MapInput, validate_routes,
    validate_zones,
};

fn map_store_error(error: MapStoreError) -> Error {
    match error {
        MapStoreError::NotFound { map_id } => Error::not_found(format!("map {map_id} not found"))
            .with_details(json!({ "id": map_id.to_string() })),
        MapStoreError::Connection { message } => {
            error!(%message, "map store unavailable");
            Error::store(format!("map store unavailable: {message}"))
        }
        MapStoreError::Query { message } => {
            warn!(%message, "map store query failed");
            Error::store(format!("map store query failed: {message}"))
        }
    }
}

fn map_geometry_error(error: GeometryValidationError) -> Error {
    Error::invalid_geometry(error.to_string()).with_details(json!({
        "kind": error.kind().as_str(),
        "index": error.index(),
        "reason": error.reason(),
    }))
}

fn parse_map_id(raw: &str) -> Result<MapId, Error> {
    MapId::parse(raw).map_err(|err| Error::invalid_identifier(err.to_string()))
}

fn validate_input(input: &MapInput) -> Result<(), Error> {
    validate_zones(&input.zones).map_err(map_geometry_error)?;
    validate_routes(&input.routes).map_err(map_geometry_error)
}

/// Commit on success; roll back and report the original failure otherwise.
async fn finish<T>(
    mut tx: Box<dyn MapStoreTransaction>,
    result: Result<T, MapStoreError>,
) -> Result<T, Error> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(map_store_error)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "map store rollback failed");
            }
            Err(map_store_error(err))
        }
    }
}

async fn create_in(
    tx: &mut dyn MapStoreTransaction,
    input: MapInput,
    now: DateTime<Utc>,
) -> Result<MapId, MapStoreError> {
    let map = tx
        .insert_map(NewMap {
            name: input.name,
            image_url: input.image_url,
            created_at: now,
        })
        .await?;
    for zone in input.zones {
        tx.insert_zone(map.id, zone.points, now).await?;
    }
    for route in input.routes {
        tx.insert_route(map.id, route.points, now).await?;
    }
    Ok(map.id)
}

async fn update_in(
    tx: &mut dyn MapStoreTransaction,
    map_id: MapId,
    input: MapInput,
    now: DateTime<Utc>,
) -> Result<(), MapStoreError> {
    tx.update_map_by_id(
        map_id,
        MapMetadataUpdate {
            name: input.name,
            image_url: input.image_url,
            updated_at: now,
        },
    )
    .await?;
    if !input.zones.is_empty() {
        tx.replace_zones_for_map(map_id, input.zones, now).await?;
    }
    if !input.routes.is_empty() {
        tx.replace_routes_for_map(map_id, input.routes, now).await?;
    }
    Ok(())
}

async fn read_in(
    tx: &mut dyn MapStoreTransaction,
    map_id: MapId,
) -> Result<MapAggregate, MapStoreError> {
    let map = tx
        .get_map_by_id(map_id)
        .await?
        .ok_or_else(|| MapStoreError::not_found(map_id))?;
    let zones = tx.list_zones_by_map_id(map_id).await?;
    let routes = tx.list_routes_by_map_id(map_id).await?;
    Ok(MapAggregate { map, zones, routes })
}

/// Map aggregate service implementing [`MapCommand`] and [`MapQuery`].
///
/// `S` may be unsized so a store chosen at start-up can be shared as
/// `Arc<dyn MapStore>`.
pub struct MapService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for MapService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: ?Sized> MapService<S> {
    /// Create a service over `store`, stamping writes with `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> MapService<S>
where
    S: MapStore + ?Sized,
{
    async fn begin(&self) -> Result<Box<dyn MapStoreTransaction>, Error> {
        self.store.begin().await.map_err(map_store_error)
    }
}

#[async_trait]
impl<S> MapCommand for MapService<S>
where
    S: MapStore + ?Sized,
{
    #[tracing::instrument(
        skip(self, input),
        fields(zones = input.zones.len(), routes = input.routes.len())
    )]
    async fn create_map(&self, input: MapInput) -> Result<MapId, Error> {
        validate_input(&input)?;
        let now = self.clock.utc();

        let mut tx = self.begin().await?;
        let result = create_in(&mut *tx, input, now).await;
        let map_id = finish(tx, result).await?;

        info!(%map_id, "map created");
        Ok(map_id)
    }

    #[tracing::instrument(
        skip(self, input),
        fields(zones = input.zones.len(), routes = input.routes.len())
    )]
    async fn update_map(&self, map_id: &str, input: MapInput) -> Result<(), Error> {
        let map_id = parse_map_id(map_id)?;
        validate_input(&input)?;
        let now = self.clock.utc();

        let mut tx = self.begin().await?;
        let result = update_in(&mut *tx, map_id, input, now).await;
        finish(tx, result).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_map(&self, map_id: &str) -> Result<(), Error> {
        let map_id = parse_map_id(map_id)?;

        let mut tx = self.begin().await?;
        let result = tx.delete_map_by_id(map_id).await;
        finish(tx, result).await
    }
}

#[async_trait]
impl<S> MapQuery for MapService<S>
where
    S: MapStore + ?Sized,
{
    #[tracing::instrument(skip(self))]
    async fn list_maps(&self) -> Result<Vec<Map>, Error> {
        let mut tx = self.begin().await?;
        let result = tx.list_maps().await;
        finish(tx, result).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_map(&self, map_id: &str) -> Result<MapAggregate, Error> {
        let map_id = parse_map_id(map_id)?;

        let mut tx = self.begin().await?;
        let result = read_in(&mut *tx, map_id).await;
        finish(tx, result).await
    }
}

#[cfg(test)]
#[path = "map_service_tests.rs"]
mod tests;
