//! Map aggregate records.
//!
//! A [`Map`] owns its zones and routes; they are linked solely through
//! [`MapId`]. Identity and timestamps are assigned on the way into the store,
//! so callers describe new geometry with [`ZoneDraft`] and [`RouteDraft`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MapId, Point, RouteDraft, ZoneDraft};

/// Persisted map metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Map {
    /// Store-assigned identity.
    pub id: MapId,
    /// Display name.
    pub name: String,
    /// Location of the map's background image.
    pub image_url: String,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Last metadata overwrite; equals `created_at` until the first update.
    pub updated_at: DateTime<Utc>,
}

/// Persisted zone polygon belonging to a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Store-assigned identity.
    pub id: Uuid,
    /// Owning map.
    pub map_id: MapId,
    /// The polygon vertices, in drawing order.
    pub points: Vec<Point>,
    /// Insertion time; replacing a map's set stamps every member anew.
    pub created_at: DateTime<Utc>,
}

/// Persisted route path belonging to a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Store-assigned identity.
    pub id: Uuid,
    /// Owning map.
    pub map_id: MapId,
    /// The path vertices, in travel order.
    pub points: Vec<Point>,
    /// Insertion time; replacing a map's set stamps every member anew.
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied map content for create and update.
///
/// On update, an empty `zones` or `routes` list leaves the stored set
/// untouched; a non-empty list replaces it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInput {
    /// Display name.
    pub name: String,
    /// Location of the map's background image.
    pub image_url: String,
    /// Zone polygons to store.
    #[serde(default)]
    pub zones: Vec<ZoneDraft>,
    /// Route paths to store.
    #[serde(default)]
    pub routes: Vec<RouteDraft>,
}

impl MapInput {
    /// Build an input with metadata only.
    ///
    /// # Examples
    /// ```
    /// use maps_backend::domain::{MapInput, ZoneDraft};
    ///
    /// let input = MapInput::new("Campus", "https://example.test/campus.png")
    ///     .with_zone(ZoneDraft::new([(0.0, 0.0), (0.0, 5.0), (5.0, 5.0)]));
    /// assert_eq!(input.zones.len(), 1);
    /// assert!(input.routes.is_empty());
    /// ```
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            zones: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Append a zone.
    #[must_use]
    pub fn with_zone(mut self, zone: ZoneDraft) -> Self {
        self.zones.push(zone);
        self
    }

    /// Append a route.
    #[must_use]
    pub fn with_route(mut self, route: RouteDraft) -> Self {
        self.routes.push(route);
        self
    }
}

/// A map together with its zones and routes, read from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapAggregate {
    /// Map metadata.
    pub map: Map,
    /// Zones ordered by `(created_at, id)`.
    pub zones: Vec<Zone>,
    /// Routes ordered by `(created_at, id)`.
    pub routes: Vec<Route>,
}
