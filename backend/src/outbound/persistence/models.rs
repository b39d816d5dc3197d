//! Internal Diesel row structs for the map tables.
//!
//! These types never leave the persistence layer. Geometry is stored as JSON
//! and decoded into domain points on the way out.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::MapStoreError;
use crate::domain::{Map, MapId, Point, Route, Zone};

use super::schema::{maps, routes, zones};

/// Row struct for reading from the maps table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = maps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MapRow {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MapRow> for Map {
    fn from(row: MapRow) -> Self {
        Self {
            id: MapId::from_uuid(row.id),
            name: row.name,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating map rows; the id is defaulted by SQL.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = maps)]
pub(crate) struct NewMapRow<'a> {
    pub name: &'a str,
    pub image_url: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset overwriting map metadata.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = maps)]
pub(crate) struct MapMetadataChangeset<'a> {
    pub name: &'a str,
    pub image_url: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the zones table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = zones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ZoneRow {
    pub id: Uuid,
    pub map_id: Uuid,
    pub points: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ZoneRow> for Zone {
    type Error = MapStoreError;

    fn try_from(row: ZoneRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            map_id: MapId::from_uuid(row.map_id),
            points: decode_points(row.points, "zone")?,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for zone rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = zones)]
pub(crate) struct NewZoneRow {
    pub map_id: Uuid,
    pub points: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the routes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = routes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RouteRow {
    pub id: Uuid,
    pub map_id: Uuid,
    pub points: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RouteRow> for Route {
    type Error = MapStoreError;

    fn try_from(row: RouteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            map_id: MapId::from_uuid(row.map_id),
            points: decode_points(row.points, "route")?,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for route rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = routes)]
pub(crate) struct NewRouteRow {
    pub map_id: Uuid,
    pub points: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Encode points as a JSON array of `{x, y}` objects.
pub(crate) fn encode_points(points: &[Point]) -> Result<serde_json::Value, MapStoreError> {
    serde_json::to_value(points)
        .map_err(|err| MapStoreError::query(format!("serialise points: {err}")))
}

fn decode_points(value: serde_json::Value, kind: &str) -> Result<Vec<Point>, MapStoreError> {
    serde_json::from_value(value)
        .map_err(|err| MapStoreError::query(format!("decode {kind} points: {err}")))
}
