//! Map aggregate backend.
//!
//! A map is an image with named metadata plus zone polygons and route paths.
//! The [`domain`] layer validates and persists the whole aggregate through the
//! store port in one transaction; [`inbound`] exposes it over HTTP and
//! [`outbound`] provides PostgreSQL and in-memory stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
