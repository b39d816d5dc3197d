//! OpenAPI documentation for the map REST API.
//!
//! Registers the map handlers, the health probes and the error schema
//! wrappers. Swagger UI serves the generated document in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::maps::{
    CreateMapResponseBody, GeometryBody, GeometryResponseBody, MapAggregateResponseBody,
    MapRequestBody, MapResponseBody, PointBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Maps backend API",
        description = "Maps with their zone polygons and route paths, stored as one aggregate."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::maps::list_maps,
        crate::inbound::http::maps::get_map,
        crate::inbound::http::maps::create_map,
        crate::inbound::http::maps::update_map,
        crate::inbound::http::maps::delete_map,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        PointBody,
        GeometryBody,
        MapRequestBody,
        MapResponseBody,
        GeometryResponseBody,
        MapAggregateResponseBody,
        CreateMapResponseBody,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "maps", description = "Map aggregate operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
