//! PostgreSQL-backed `MapStore` implementation using Diesel ORM.
//!
//! Each transaction owns one pooled connection for its whole lifetime and is
//! driven through diesel-async's ANSI transaction manager. Transactions run at
//! `REPEATABLE READ`, so every statement inside one sees the same snapshot and
//! an aggregate read cannot mix zones from before and after a concurrent
//! replace. Write conflicts surface as serialization failures, which map to
//! retryable query errors.
//!
//! A transaction that is dropped without `commit` or `rollback` leaves its
//! connection inside an open transaction; the pool then treats the connection
//! as broken and discards it, which aborts the transaction server-side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};

use crate::domain::ports::{
    MapMetadataUpdate, MapStore, MapStoreError, MapStoreTransaction, NewMap,
};
use crate::domain::{Map, MapId, Point, Route, RouteDraft, Zone, ZoneDraft};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    MapMetadataChangeset, MapRow, NewMapRow, NewRouteRow, NewZoneRow, RouteRow, ZoneRow,
    encode_points,
};
use super::pool::DbPool;
use super::schema::{maps, routes, zones};

const BEGIN_SNAPSHOT: &str = "BEGIN ISOLATION LEVEL REPEATABLE READ";

/// Diesel-backed implementation of the map store port.
#[derive(Clone)]
pub struct DieselMapStore {
    pool: DbPool,
}

impl DieselMapStore {
    /// Create a store over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MapStore for DieselMapStore {
    async fn begin(&self) -> Result<Box<dyn MapStoreTransaction>, MapStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction_sql(&mut *conn, BEGIN_SNAPSHOT)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselMapStoreTransaction { conn: Some(conn) }))
    }
}

struct DieselMapStoreTransaction {
    /// `None` once committed or rolled back.
    conn: Option<PooledConnection<'static, AsyncPgConnection>>,
}

impl DieselMapStoreTransaction {
    fn conn(&mut self) -> Result<&mut AsyncPgConnection, MapStoreError> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| MapStoreError::query("transaction already closed"))
    }
}

fn new_zone_rows(
    map_id: MapId,
    drafts: &[ZoneDraft],
    created_at: DateTime<Utc>,
) -> Result<Vec<NewZoneRow>, MapStoreError> {
    drafts
        .iter()
        .map(|zone| {
            Ok(NewZoneRow {
                map_id: *map_id.as_uuid(),
                points: encode_points(&zone.points)?,
                created_at,
            })
        })
        .collect()
}

fn new_route_rows(
    map_id: MapId,
    drafts: &[RouteDraft],
    created_at: DateTime<Utc>,
) -> Result<Vec<NewRouteRow>, MapStoreError> {
    drafts
        .iter()
        .map(|route| {
            Ok(NewRouteRow {
                map_id: *map_id.as_uuid(),
                points: encode_points(&route.points)?,
                created_at,
            })
        })
        .collect()
}

#[async_trait]
impl MapStoreTransaction for DieselMapStoreTransaction {
    async fn insert_map(&mut self, map: NewMap) -> Result<Map, MapStoreError> {
        let conn = self.conn()?;
        let row = NewMapRow {
            name: &map.name,
            image_url: &map.image_url,
            created_at: map.created_at,
            updated_at: map.created_at,
        };

        diesel::insert_into(maps::table)
            .values(&row)
            .returning(MapRow::as_returning())
            .get_result(conn)
            .await
            .map(Map::from)
            .map_err(map_diesel_error)
    }

    async fn update_map_by_id(
        &mut self,
        map_id: MapId,
        update: MapMetadataUpdate,
    ) -> Result<(), MapStoreError> {
        let conn = self.conn()?;
        let changeset = MapMetadataChangeset {
            name: &update.name,
            image_url: &update.image_url,
            updated_at: update.updated_at,
        };

        let updated = diesel::update(maps::table.find(*map_id.as_uuid()))
            .set(&changeset)
            .execute(conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(MapStoreError::not_found(map_id));
        }
        Ok(())
    }

    async fn delete_map_by_id(&mut self, map_id: MapId) -> Result<(), MapStoreError> {
        let conn = self.conn()?;
        let deleted = diesel::delete(maps::table.find(*map_id.as_uuid()))
            .execute(conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(MapStoreError::not_found(map_id));
        }
        Ok(())
    }

    async fn get_map_by_id(&mut self, map_id: MapId) -> Result<Option<Map>, MapStoreError> {
        let conn = self.conn()?;
        maps::table
            .find(*map_id.as_uuid())
            .select(MapRow::as_select())
            .first(conn)
            .await
            .optional()
            .map(|row| row.map(Map::from))
            .map_err(map_diesel_error)
    }

    async fn list_maps(&mut self) -> Result<Vec<Map>, MapStoreError> {
        let conn = self.conn()?;
        let rows: Vec<MapRow> = maps::table
            .order((maps::created_at.asc(), maps::id.asc()))
            .select(MapRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Map::from).collect())
    }

    async fn insert_zone(
        &mut self,
        map_id: MapId,
        points: Vec<Point>,
        created_at: DateTime<Utc>,
    ) -> Result<Zone, MapStoreError> {
        let row = NewZoneRow {
            map_id: *map_id.as_uuid(),
            points: encode_points(&points)?,
            created_at,
        };
        let conn = self.conn()?;

        let inserted: ZoneRow = diesel::insert_into(zones::table)
            .values(&row)
            .returning(ZoneRow::as_returning())
            .get_result(conn)
            .await
            .map_err(map_diesel_error)?;
        Zone::try_from(inserted)
    }

    async fn list_zones_by_map_id(&mut self, map_id: MapId) -> Result<Vec<Zone>, MapStoreError> {
        let conn = self.conn()?;
        let rows: Vec<ZoneRow> = zones::table
            .filter(zones::map_id.eq(*map_id.as_uuid()))
            .order((zones::created_at.asc(), zones::id.asc()))
            .select(ZoneRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Zone::try_from).collect()
    }

    async fn replace_zones_for_map(
        &mut self,
        map_id: MapId,
        drafts: Vec<ZoneDraft>,
        created_at: DateTime<Utc>,
    ) -> Result<(), MapStoreError> {
        let rows = new_zone_rows(map_id, &drafts, created_at)?;
        let conn = self.conn()?;

        diesel::delete(zones::table.filter(zones::map_id.eq(*map_id.as_uuid())))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        if !rows.is_empty() {
            diesel::insert_into(zones::table)
                .values(&rows)
                .execute(conn)
                .await
                .map_err(map_diesel_error)?;
        }
        Ok(())
    }

    async fn insert_route(
        &mut self,
        map_id: MapId,
        points: Vec<Point>,
        created_at: DateTime<Utc>,
    ) -> Result<Route, MapStoreError> {
        let row = NewRouteRow {
            map_id: *map_id.as_uuid(),
            points: encode_points(&points)?,
            created_at,
        };
        let conn = self.conn()?;

        let inserted: RouteRow = diesel::insert_into(routes::table)
            .values(&row)
            .returning(RouteRow::as_returning())
            .get_result(conn)
            .await
            .map_err(map_diesel_error)?;
        Route::try_from(inserted)
    }

    async fn list_routes_by_map_id(
        &mut self,
        map_id: MapId,
    ) -> Result<Vec<Route>, MapStoreError> {
        let conn = self.conn()?;
        let rows: Vec<RouteRow> = routes::table
            .filter(routes::map_id.eq(*map_id.as_uuid()))
            .order((routes::created_at.asc(), routes::id.asc()))
            .select(RouteRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Route::try_from).collect()
    }

    async fn replace_routes_for_map(
        &mut self,
        map_id: MapId,
        drafts: Vec<RouteDraft>,
        created_at: DateTime<Utc>,
    ) -> Result<(), MapStoreError> {
        let rows = new_route_rows(map_id, &drafts, created_at)?;
        let conn = self.conn()?;

        diesel::delete(routes::table.filter(routes::map_id.eq(*map_id.as_uuid())))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        if !rows.is_empty() {
            diesel::insert_into(routes::table)
                .values(&rows)
                .execute(conn)
                .await
                .map_err(map_diesel_error)?;
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), MapStoreError> {
        let mut conn = self
            .conn
            .take()
            .ok_or_else(|| MapStoreError::query("transaction already closed"))?;
        AnsiTransactionManager::commit_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(&mut self) -> Result<(), MapStoreError> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };
        AnsiTransactionManager::rollback_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)
    }
}
