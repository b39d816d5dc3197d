//! Zone and route geometry plus the invariants they must satisfy.
//!
//! Zones are closed polygons on the map image: at least
//! [`MIN_ZONE_POINTS`] vertices, all in the non-negative quadrant. Routes are
//! open paths with no shape invariant beyond finite coordinates.
//! Validation is all-or-nothing: the first offending item rejects the whole
//! batch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of vertices a zone polygon must have.
pub const MIN_ZONE_POINTS: usize = 3;

/// A vertex in map image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn is_non_negative(self) -> bool {
        self.x >= 0.0 && self.y >= 0.0
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Zone geometry supplied by callers before the store assigns identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDraft {
    /// Polygon vertices in order; the closing edge is implicit.
    pub points: Vec<Point>,
}

impl ZoneDraft {
    /// Build a zone draft from its vertices.
    #[must_use]
    pub fn new(points: impl IntoIterator<Item = impl Into<Point>>) -> Self {
        Self {
            points: points.into_iter().map(Into::into).collect(),
        }
    }
}

/// Route geometry supplied by callers before the store assigns identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDraft {
    /// Path vertices in travel order.
    pub points: Vec<Point>,
}

impl RouteDraft {
    /// Build a route draft from its vertices.
    #[must_use]
    pub fn new(points: impl IntoIterator<Item = impl Into<Point>>) -> Self {
        Self {
            points: points.into_iter().map(Into::into).collect(),
        }
    }
}

/// Which collection a geometry error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// A zone polygon.
    Zone,
    /// A route path.
    Route,
}

impl GeometryKind {
    /// Lowercase name used in messages and error details.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zone => "zone",
            Self::Route => "route",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry invariant violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryValidationError {
    /// A zone has fewer vertices than a polygon needs.
    #[error("zone {index} has {count} points; at least {min} are required")]
    TooFewPoints {
        /// Position of the zone in the batch.
        index: usize,
        /// Number of points supplied.
        count: usize,
        /// Required minimum.
        min: usize,
    },
    /// A zone vertex lies outside the non-negative quadrant.
    #[error("zone {index} point {point_index} ({x}, {y}) has a negative coordinate")]
    NegativeCoordinate {
        /// Position of the zone in the batch.
        index: usize,
        /// Position of the vertex in the zone.
        point_index: usize,
        /// Offending horizontal coordinate.
        x: f64,
        /// Offending vertical coordinate.
        y: f64,
    },
    /// A vertex is NaN or infinite.
    #[error("{kind} {index} point {point_index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Zone or route.
        kind: GeometryKind,
        /// Position of the item in the batch.
        index: usize,
        /// Position of the vertex in the item.
        point_index: usize,
    },
}

impl GeometryValidationError {
    /// Machine-readable reason used in error details.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::TooFewPoints { .. } => "too_few_points",
            Self::NegativeCoordinate { .. } => "negative_coordinate",
            Self::NonFiniteCoordinate { .. } => "non_finite_coordinate",
        }
    }

    /// The collection the offending item belongs to.
    #[must_use]
    pub const fn kind(&self) -> GeometryKind {
        match self {
            Self::TooFewPoints { .. } | Self::NegativeCoordinate { .. } => GeometryKind::Zone,
            Self::NonFiniteCoordinate { kind, .. } => *kind,
        }
    }

    /// Position of the offending item in its batch.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::TooFewPoints { index, .. }
            | Self::NegativeCoordinate { index, .. }
            | Self::NonFiniteCoordinate { index, .. } => *index,
        }
    }
}

fn check_finite(
    kind: GeometryKind,
    index: usize,
    points: &[Point],
) -> Result<(), GeometryValidationError> {
    match points.iter().position(|point| !point.is_finite()) {
        Some(point_index) => Err(GeometryValidationError::NonFiniteCoordinate {
            kind,
            index,
            point_index,
        }),
        None => Ok(()),
    }
}

fn validate_zone(index: usize, zone: &ZoneDraft) -> Result<(), GeometryValidationError> {
    let count = zone.points.len();
    if count < MIN_ZONE_POINTS {
        return Err(GeometryValidationError::TooFewPoints {
            index,
            count,
            min: MIN_ZONE_POINTS,
        });
    }

    check_finite(GeometryKind::Zone, index, &zone.points)?;

    let negative = zone
        .points
        .iter()
        .enumerate()
        .find(|(_, point)| !point.is_non_negative());
    match negative {
        Some((point_index, point)) => Err(GeometryValidationError::NegativeCoordinate {
            index,
            point_index,
            x: point.x,
            y: point.y,
        }),
        None => Ok(()),
    }
}

/// Validate a batch of zones.
///
/// # Examples
/// ```
/// use maps_backend::domain::{ZoneDraft, validate_zones};
///
/// let square = ZoneDraft::new([(0.0, 0.0), (0.0, 5.0), (5.0, 5.0)]);
/// assert!(validate_zones(&[square]).is_ok());
///
/// let line = ZoneDraft::new([(0.0, 0.0), (1.0, 1.0)]);
/// assert!(validate_zones(&[line]).is_err());
/// ```
pub fn validate_zones(zones: &[ZoneDraft]) -> Result<(), GeometryValidationError> {
    zones
        .iter()
        .enumerate()
        .try_for_each(|(index, zone)| validate_zone(index, zone))
}

/// Validate a batch of routes. Only coordinate well-formedness is checked.
pub fn validate_routes(routes: &[RouteDraft]) -> Result<(), GeometryValidationError> {
    routes
        .iter()
        .enumerate()
        .try_for_each(|(index, route)| check_finite(GeometryKind::Route, index, &route.points))
}
