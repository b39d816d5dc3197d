//! Domain primitives, the map aggregate service and its ports.
//!
//! Purpose: keep map rules independent of transport and storage. Inbound
//! adapters call the driving ports in [`ports`]; outbound adapters implement
//! [`ports::MapStore`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): domain failure with a stable code.
//! - MapId (alias to `map_id::MapId`): validated map identifier.
//! - MapService (alias to `map_service::MapService`): aggregate service.
//! - validate_zones / validate_routes: geometry invariants.

pub mod error;
pub mod geometry;
pub mod map_id;
mod map_service;
pub mod maps;
pub mod ports;
mod trace_id;

pub use self::error::{Error, ErrorClass, ErrorCode, ErrorValidationError};
pub use self::geometry::{
    GeometryKind, GeometryValidationError, MIN_ZONE_POINTS, Point, RouteDraft, ZoneDraft,
    validate_routes, validate_zones,
};
pub use self::map_id::{MapId, MapIdError};
pub use self::map_service::MapService;
pub use self::maps::{Map, MapAggregate, MapInput, Route, Zone};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use maps_backend::domain::{DomainResult, Error, MapId};
///
/// fn lookup(raw: &str) -> DomainResult<MapId> {
///     MapId::parse(raw).map_err(|err| Error::invalid_identifier(err.to_string()))
/// }
///
/// assert!(lookup("not-a-uuid").is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
