//! Domain-level error taxonomy.
//!
//! Every map operation fails with one [`Error`] whose [`ErrorCode`] belongs to
//! a small closed set. The codes are transport agnostic: inbound adapters
//! translate them to status codes via [`ErrorCode::class`], never by
//! inspecting messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// An external identifier is not a valid UUID encoding.
    InvalidIdentifier,
    /// A zone or route violates its geometric invariants.
    InvalidGeometry,
    /// The request payload could not be decoded.
    InvalidRequestBody,
    /// The referenced map does not exist.
    NotFound,
    /// The backing store failed for any other reason.
    StoreError,
}

/// Coarse classification consumed by transports to pick a response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller sent something unacceptable; retrying verbatim is futile.
    Client,
    /// The caller referenced an aggregate that does not exist.
    NotFound,
    /// The server failed; the whole operation may be retried.
    Server,
}

impl ErrorCode {
    /// Classification of this code.
    ///
    /// # Examples
    /// ```
    /// use maps_backend::domain::{ErrorClass, ErrorCode};
    ///
    /// assert_eq!(ErrorCode::InvalidGeometry.class(), ErrorClass::Client);
    /// assert_eq!(ErrorCode::StoreError.class(), ErrorClass::Server);
    /// ```
    #[must_use]
    pub const fn class(self) -> ErrorClass {
        match self {
            Self::InvalidIdentifier | Self::InvalidGeometry | Self::InvalidRequestBody => {
                ErrorClass::Client
            }
            Self::NotFound => ErrorClass::NotFound,
            Self::StoreError => ErrorClass::Server,
        }
    }

    /// Whether callers may retry the whole operation.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::StoreError)
    }

    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "invalid_identifier",
            Self::InvalidGeometry => "invalid_geometry",
            Self::InvalidRequestBody => "invalid_request_body",
            Self::NotFound => "not_found",
            Self::StoreError => "store_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors emitted by [`Error::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was empty once trimmed.
    #[error("error message must not be empty")]
    EmptyMessage,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
/// - `trace_id` is captured from the enclosing [`TraceId`] scope at
///   construction time.
///
/// # Examples
/// ```
/// use maps_backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("map missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "map missing");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create an error, falling back to the code name when `message` is blank.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.as_str().to_owned(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Fallible constructor that rejects blank messages.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier captured when the error was created.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured details for clients.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the captured trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidIdentifier`].
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidIdentifier, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidGeometry`].
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidGeometry, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequestBody`].
    pub fn invalid_request_body(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequestBody, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::StoreError`].
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}
