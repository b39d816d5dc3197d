//! Map aggregate HTTP handlers.
//!
//! ```text
//! GET    /maps
//! GET    /map/{id}
//! POST   /map
//! PUT    /map/{id}
//! DELETE /map/{id}
//! ```
//!
//! The same routes are served unversioned and under `/api/v1`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Map, MapAggregate, MapInput, Point, Route, RouteDraft, Zone, ZoneDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// A vertex in map image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct PointBody {
    pub x: f64,
    pub y: f64,
}

/// Ordered vertex list of a zone or route.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct GeometryBody {
    pub points: Vec<PointBody>,
}

/// Request payload for creating or updating a map.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapRequestBody {
    #[schema(example = "Campus")]
    pub name: String,
    /// Background image location. The snake_case `image_url` spelling is
    /// also accepted for older clients.
    #[serde(alias = "image_url")]
    #[schema(example = "https://example.test/campus.png")]
    pub image_url: String,
    /// Zone polygons; on update a non-empty list replaces the stored set.
    #[serde(default)]
    pub zones: Vec<GeometryBody>,
    /// Route paths; on update a non-empty list replaces the stored set.
    #[serde(default)]
    pub routes: Vec<GeometryBody>,
}

/// Map metadata response.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub image_url: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

/// Stored zone or route response.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeometryResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub map_id: String,
    pub points: Vec<PointBody>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

/// A map with its zones and routes.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapAggregateResponseBody {
    pub map: MapResponseBody,
    pub zones: Vec<GeometryResponseBody>,
    pub routes: Vec<GeometryResponseBody>,
}

/// Response payload for map creation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMapResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
}

impl From<PointBody> for Point {
    fn from(value: PointBody) -> Self {
        Point::new(value.x, value.y)
    }
}

impl From<Point> for PointBody {
    fn from(value: Point) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

fn to_points(body: GeometryBody) -> Vec<Point> {
    body.points.into_iter().map(Point::from).collect()
}

fn from_points(points: Vec<Point>) -> Vec<PointBody> {
    points.into_iter().map(PointBody::from).collect()
}

impl From<MapRequestBody> for MapInput {
    fn from(value: MapRequestBody) -> Self {
        Self {
            name: value.name,
            image_url: value.image_url,
            zones: value
                .zones
                .into_iter()
                .map(|zone| ZoneDraft {
                    points: to_points(zone),
                })
                .collect(),
            routes: value
                .routes
                .into_iter()
                .map(|route| RouteDraft {
                    points: to_points(route),
                })
                .collect(),
        }
    }
}

impl From<Map> for MapResponseBody {
    fn from(value: Map) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            image_url: value.image_url,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

impl From<Zone> for GeometryResponseBody {
    fn from(value: Zone) -> Self {
        Self {
            id: value.id.to_string(),
            map_id: value.map_id.to_string(),
            points: from_points(value.points),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

impl From<Route> for GeometryResponseBody {
    fn from(value: Route) -> Self {
        Self {
            id: value.id.to_string(),
            map_id: value.map_id.to_string(),
            points: from_points(value.points),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

impl From<MapAggregate> for MapAggregateResponseBody {
    fn from(value: MapAggregate) -> Self {
        Self {
            map: value.map.into(),
            zones: value.zones.into_iter().map(Into::into).collect(),
            routes: value.routes.into_iter().map(Into::into).collect(),
        }
    }
}

/// JSON extractor configuration reporting decode failures as
/// `invalid_request_body`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Register the map routes on `cfg`.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use maps_backend::inbound::http::maps;
///
/// let app = App::new()
///     .app_data(maps::json_config())
///     .service(web::scope("/api/v1").configure(maps::configure))
///     .configure(maps::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_maps)
        .service(get_map)
        .service(create_map)
        .service(update_map)
        .service(delete_map);
}

/// List map metadata.
#[utoipa::path(
    get,
    path = "/api/v1/maps",
    responses(
        (status = 200, description = "Maps in store order", body = [MapResponseBody]),
        (status = 500, description = "Store failure", body = ErrorSchema)
    ),
    tags = ["maps"],
    operation_id = "listMaps"
)]
#[get("/maps")]
pub async fn list_maps(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<MapResponseBody>>> {
    let maps = state.maps_query.list_maps().await?;
    Ok(web::Json(maps.into_iter().map(Into::into).collect()))
}

/// Read one map with its zones and routes.
#[utoipa::path(
    get,
    path = "/api/v1/map/{id}",
    params(("id" = String, Path, description = "Map identifier (UUID)")),
    responses(
        (status = 200, description = "Map aggregate", body = MapAggregateResponseBody),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Map not found", body = ErrorSchema),
        (status = 500, description = "Store failure", body = ErrorSchema)
    ),
    tags = ["maps"],
    operation_id = "getMap"
)]
#[get("/map/{id}")]
pub async fn get_map(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MapAggregateResponseBody>> {
    let aggregate = state.maps_query.get_map(&path.into_inner()).await?;
    Ok(web::Json(aggregate.into()))
}

/// Create a map with its zones and routes.
#[utoipa::path(
    post,
    path = "/api/v1/map",
    request_body = MapRequestBody,
    responses(
        (status = 201, description = "Map created", body = CreateMapResponseBody),
        (status = 400, description = "Malformed request body", body = ErrorSchema),
        (status = 422, description = "Invalid zone or route geometry", body = ErrorSchema),
        (status = 500, description = "Store failure", body = ErrorSchema)
    ),
    tags = ["maps"],
    operation_id = "createMap"
)]
#[post("/map")]
pub async fn create_map(
    state: web::Data<HttpState>,
    payload: web::Json<MapRequestBody>,
) -> ApiResult<HttpResponse> {
    let map_id = state.maps.create_map(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(CreateMapResponseBody {
        id: map_id.to_string(),
    }))
}

/// Overwrite map metadata and replace any supplied zone or route set.
#[utoipa::path(
    put,
    path = "/api/v1/map/{id}",
    params(("id" = String, Path, description = "Map identifier (UUID)")),
    request_body = MapRequestBody,
    responses(
        (status = 204, description = "Map updated"),
        (status = 400, description = "Malformed identifier or body", body = ErrorSchema),
        (status = 404, description = "Map not found", body = ErrorSchema),
        (status = 422, description = "Invalid zone or route geometry", body = ErrorSchema),
        (status = 500, description = "Store failure", body = ErrorSchema)
    ),
    tags = ["maps"],
    operation_id = "updateMap"
)]
#[put("/map/{id}")]
pub async fn update_map(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<MapRequestBody>,
) -> ApiResult<HttpResponse> {
    state
        .maps
        .update_map(&path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a map together with its zones and routes.
#[utoipa::path(
    delete,
    path = "/api/v1/map/{id}",
    params(("id" = String, Path, description = "Map identifier (UUID)")),
    responses(
        (status = 204, description = "Map deleted"),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Map not found", body = ErrorSchema),
        (status = 500, description = "Store failure", body = ErrorSchema)
    ),
    tags = ["maps"],
    operation_id = "deleteMap"
)]
#[delete("/map/{id}")]
pub async fn delete_map(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.maps.delete_map(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "maps_tests.rs"]
mod tests;
