//! OpenAPI schema definitions for domain types.
//!
//! The domain error type stays free of utoipa derives; these wrappers mirror
//! its wire shape so the generated document can reference it.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// A path identifier is not a valid UUID.
    #[schema(rename = "invalid_identifier")]
    InvalidIdentifier,
    /// A zone or route breaks its geometric rules.
    #[schema(rename = "invalid_geometry")]
    InvalidGeometry,
    /// The JSON body could not be decoded.
    #[schema(rename = "invalid_request_body")]
    InvalidRequestBody,
    /// The map does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The backing store failed; the message is redacted.
    #[schema(rename = "store_error")]
    StoreError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_geometry")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "zone 0 has 2 points; at least 3 are required")]
    message: String,
    /// Identifier of the request that failed, echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Structured details, e.g. the offending geometry index.
    details: Option<serde_json::Value>,
}
