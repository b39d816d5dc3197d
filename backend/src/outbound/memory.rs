//! In-memory map store.
//!
//! Tables live behind an async mutex. A transaction holds the lock for its
//! whole lifetime and works on a staged copy, so transactions are fully
//! serialised and a dropped or rolled-back transaction leaves no trace.
//! Deleting a map removes its zones and routes, mirroring the cascade in the
//! SQL schema.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::ports::{
    MapMetadataUpdate, MapStore, MapStoreError, MapStoreTransaction, NewMap,
};
use crate::domain::{Map, MapId, Point, Route, RouteDraft, Zone, ZoneDraft};

#[derive(Debug, Clone, Default)]
struct Tables {
    maps: Vec<Map>,
    zones: Vec<Zone>,
    routes: Vec<Route>,
}

impl Tables {
    fn ensure_map(&self, map_id: MapId) -> Result<(), MapStoreError> {
        if self.maps.iter().any(|map| map.id == map_id) {
            Ok(())
        } else {
            Err(MapStoreError::query(format!(
                "foreign key violation: map {map_id} does not exist"
            )))
        }
    }
}

/// Map store keeping every table in process memory.
///
/// Cloning yields another handle to the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMapStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryMapStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MapStore for InMemoryMapStore {
    async fn begin(&self) -> Result<Box<dyn MapStoreTransaction>, MapStoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard: Some(guard),
            staged,
        }))
    }
}

struct InMemoryTransaction {
    /// `None` once committed or rolled back.
    guard: Option<OwnedMutexGuard<Tables>>,
    staged: Tables,
}

impl InMemoryTransaction {
    fn tables(&mut self) -> Result<&mut Tables, MapStoreError> {
        if self.guard.is_none() {
            return Err(MapStoreError::query("transaction already closed"));
        }
        Ok(&mut self.staged)
    }
}

#[async_trait]
impl MapStoreTransaction for InMemoryTransaction {
    async fn insert_map(&mut self, map: NewMap) -> Result<Map, MapStoreError> {
        let tables = self.tables()?;
        let row = Map {
            id: MapId::random(),
            name: map.name,
            image_url: map.image_url,
            created_at: map.created_at,
            updated_at: map.created_at,
        };
        tables.maps.push(row.clone());
        Ok(row)
    }

    async fn update_map_by_id(
        &mut self,
        map_id: MapId,
        update: MapMetadataUpdate,
    ) -> Result<(), MapStoreError> {
        let tables = self.tables()?;
        let row = tables
            .maps
            .iter_mut()
            .find(|map| map.id == map_id)
            .ok_or_else(|| MapStoreError::not_found(map_id))?;
        row.name = update.name;
        row.image_url = update.image_url;
        row.updated_at = update.updated_at;
        Ok(())
    }

    async fn delete_map_by_id(&mut self, map_id: MapId) -> Result<(), MapStoreError> {
        let tables = self.tables()?;
        let position = tables
            .maps
            .iter()
            .position(|map| map.id == map_id)
            .ok_or_else(|| MapStoreError::not_found(map_id))?;
        tables.maps.remove(position);
        tables.zones.retain(|zone| zone.map_id != map_id);
        tables.routes.retain(|route| route.map_id != map_id);
        Ok(())
    }

    async fn get_map_by_id(&mut self, map_id: MapId) -> Result<Option<Map>, MapStoreError> {
        let tables = self.tables()?;
        Ok(tables.maps.iter().find(|map| map.id == map_id).cloned())
    }

    async fn list_maps(&mut self) -> Result<Vec<Map>, MapStoreError> {
        Ok(self.tables()?.maps.clone())
    }

    async fn insert_zone(
        &mut self,
        map_id: MapId,
        points: Vec<Point>,
        created_at: DateTime<Utc>,
    ) -> Result<Zone, MapStoreError> {
        let tables = self.tables()?;
        tables.ensure_map(map_id)?;
        let zone = Zone {
            id: Uuid::new_v4(),
            map_id,
            points,
            created_at,
        };
        tables.zones.push(zone.clone());
        Ok(zone)
    }

    async fn list_zones_by_map_id(&mut self, map_id: MapId) -> Result<Vec<Zone>, MapStoreError> {
        let tables = self.tables()?;
        Ok(tables
            .zones
            .iter()
            .filter(|zone| zone.map_id == map_id)
            .cloned()
            .collect())
    }

    async fn replace_zones_for_map(
        &mut self,
        map_id: MapId,
        zones: Vec<ZoneDraft>,
        created_at: DateTime<Utc>,
    ) -> Result<(), MapStoreError> {
        let tables = self.tables()?;
        tables.ensure_map(map_id)?;
        tables.zones.retain(|zone| zone.map_id != map_id);
        tables.zones.extend(zones.into_iter().map(|draft| Zone {
            id: Uuid::new_v4(),
            map_id,
            points: draft.points,
            created_at,
        }));
        Ok(())
    }

    async fn insert_route(
        &mut self,
        map_id: MapId,
        points: Vec<Point>,
        created_at: DateTime<Utc>,
    ) -> Result<Route, MapStoreError> {
        let tables = self.tables()?;
        tables.ensure_map(map_id)?;
        let route = Route {
            id: Uuid::new_v4(),
            map_id,
            points,
            created_at,
        };
        tables.routes.push(route.clone());
        Ok(route)
    }

    async fn list_routes_by_map_id(
        &mut self,
        map_id: MapId,
    ) -> Result<Vec<Route>, MapStoreError> {
        let tables = self.tables()?;
        Ok(tables
            .routes
            .iter()
            .filter(|route| route.map_id == map_id)
            .cloned()
            .collect())
    }

    async fn replace_routes_for_map(
        &mut self,
        map_id: MapId,
        routes: Vec<RouteDraft>,
        created_at: DateTime<Utc>,
    ) -> Result<(), MapStoreError> {
        let tables = self.tables()?;
        tables.ensure_map(map_id)?;
        tables.routes.retain(|route| route.map_id != map_id);
        tables.routes.extend(routes.into_iter().map(|draft| Route {
            id: Uuid::new_v4(),
            map_id,
            points: draft.points,
            created_at,
        }));
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), MapStoreError> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| MapStoreError::query("transaction already closed"))?;
        *guard = std::mem::take(&mut self.staged);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), MapStoreError> {
        self.guard = None;
        self.staged = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn store() -> InMemoryMapStore {
        InMemoryMapStore::new()
    }

    fn new_map(name: &str) -> NewMap {
        NewMap {
            name: name.to_owned(),
            image_url: format!("https://example.test/{name}.png"),
            created_at: Utc::now(),
        }
    }

    fn triangle() -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(0.0, 5.0), Point::new(5.0, 5.0)]
    }

    async fn seeded(store: &InMemoryMapStore, name: &str) -> MapId {
        let mut tx = store.begin().await.expect("begin");
        let map = tx.insert_map(new_map(name)).await.expect("insert map");
        tx.insert_zone(map.id, triangle(), Utc::now())
            .await
            .expect("insert zone");
        tx.insert_route(map.id, vec![Point::new(1.0, 1.0)], Utc::now())
            .await
            .expect("insert route");
        tx.commit().await.expect("commit");
        map.id
    }

    #[rstest]
    #[tokio::test]
    async fn committed_writes_are_visible_to_later_transactions(store: InMemoryMapStore) {
        let map_id = seeded(&store, "campus").await;

        let mut tx = store.begin().await.expect("begin");
        let map = tx.get_map_by_id(map_id).await.expect("get").expect("map exists");
        assert_eq!(map.name, "campus");
        assert_eq!(map.created_at, map.updated_at);
        assert_eq!(tx.list_zones_by_map_id(map_id).await.expect("zones").len(), 1);
        assert_eq!(tx.list_routes_by_map_id(map_id).await.expect("routes").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn dropped_transactions_leave_no_trace(store: InMemoryMapStore) {
        {
            let mut tx = store.begin().await.expect("begin");
            tx.insert_map(new_map("ghost")).await.expect("insert map");
        }

        let mut tx = store.begin().await.expect("begin");
        assert!(tx.list_maps().await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn rollback_discards_staged_writes(store: InMemoryMapStore) {
        let map_id = seeded(&store, "campus").await;

        let mut tx = store.begin().await.expect("begin");
        tx.delete_map_by_id(map_id).await.expect("delete");
        tx.rollback().await.expect("rollback");

        let mut tx = store.begin().await.expect("begin");
        assert!(tx.get_map_by_id(map_id).await.expect("get").is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn closed_transactions_reject_further_work(store: InMemoryMapStore) {
        let mut tx = store.begin().await.expect("begin");
        tx.commit().await.expect("commit");

        let err = tx.list_maps().await.expect_err("closed");
        assert_eq!(err, MapStoreError::query("transaction already closed"));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_cascades_to_zones_and_routes(store: InMemoryMapStore) {
        let doomed = seeded(&store, "doomed").await;
        let kept = seeded(&store, "kept").await;

        let mut tx = store.begin().await.expect("begin");
        tx.delete_map_by_id(doomed).await.expect("delete");
        tx.commit().await.expect("commit");

        let mut tx = store.begin().await.expect("begin");
        assert!(tx.list_zones_by_map_id(doomed).await.expect("zones").is_empty());
        assert!(tx.list_routes_by_map_id(doomed).await.expect("routes").is_empty());
        assert_eq!(tx.list_zones_by_map_id(kept).await.expect("zones").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_rows_report_not_found(store: InMemoryMapStore) {
        let map_id = MapId::random();
        let mut tx = store.begin().await.expect("begin");

        assert_eq!(
            tx.delete_map_by_id(map_id).await,
            Err(MapStoreError::not_found(map_id))
        );
        let update = MapMetadataUpdate {
            name: "x".to_owned(),
            image_url: "y".to_owned(),
            updated_at: Utc::now(),
        };
        assert_eq!(
            tx.update_map_by_id(map_id, update).await,
            Err(MapStoreError::not_found(map_id))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn children_require_an_existing_map(store: InMemoryMapStore) {
        let mut tx = store.begin().await.expect("begin");
        let err = tx
            .insert_zone(MapId::random(), triangle(), Utc::now())
            .await
            .expect_err("orphan zone");
        assert!(matches!(err, MapStoreError::Query { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn replace_swaps_only_the_target_maps_zones(store: InMemoryMapStore) {
        let target = seeded(&store, "target").await;
        let other = seeded(&store, "other").await;

        let mut tx = store.begin().await.expect("begin");
        let drafts = vec![
            ZoneDraft::new([(1.0, 1.0), (1.0, 2.0), (2.0, 2.0)]),
            ZoneDraft::new([(3.0, 3.0), (3.0, 4.0), (4.0, 4.0)]),
        ];
        tx.replace_zones_for_map(target, drafts, Utc::now())
            .await
            .expect("replace");
        tx.commit().await.expect("commit");

        let mut tx = store.begin().await.expect("begin");
        let zones = tx.list_zones_by_map_id(target).await.expect("zones");
        assert_eq!(zones.len(), 2);
        assert!(zones.iter().all(|zone| zone.points[0] != Point::new(0.0, 0.0)));
        assert_eq!(tx.list_zones_by_map_id(other).await.expect("zones").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn transactions_are_serialised(store: InMemoryMapStore) {
        let first = store.begin().await.expect("begin");

        let blocked = tokio::time::timeout(Duration::from_millis(50), store.begin()).await;
        assert!(blocked.is_err(), "second transaction must wait for the first");

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(50), store.begin()).await;
        assert!(matches!(second, Ok(Ok(_))));
    }
}
