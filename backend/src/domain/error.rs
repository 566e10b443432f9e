//! Transport-agnostic error type shared by the whole request pipeline.
//!
//! The HTTP adapter maps [`ErrorCode`] onto status codes; everything else in
//! the crate only builds and propagates [`Error`] values.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::TraceId;

/// Stable machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The caller has no valid session.
    Unauthorized,
    /// The caller is known but may not perform the action.
    Forbidden,
    /// A referenced resource does not exist.
    NotFound,
    /// A backing store is unreachable.
    ServiceUnavailable,
    /// An unexpected failure inside the service.
    InternalError,
}

/// Error payload returned to clients.
///
/// Multi-message failures (validation) keep every message under
/// `details.messages` and join them for the top-level `message`.
///
/// # Examples
/// ```
/// use listings_backend::domain::{Error, ErrorCode};
///
/// let err = Error::with_messages(
///     ErrorCode::InvalidRequest,
///     vec!["name is required".to_owned(), "price is required".to_owned()],
/// );
/// assert_eq!(err.message(), "name is required, price is required");
/// assert_eq!(err.messages(), vec!["name is required", "price is required"]);
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
    /// Create an error, stamping the trace id of the current request.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Create an error carrying an ordered list of messages.
    pub fn with_messages(code: ErrorCode, messages: Vec<String>) -> Self {
        let message = messages.join(", ");
        Self::new(code, message).with_details(json!({ "messages": messages }))
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier of the request that produced the error.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured details, if any.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Individual messages: `details.messages` when present, otherwise the
    /// top-level message alone.
    pub fn messages(&self) -> Vec<&str> {
        self.details
            .as_ref()
            .and_then(|details| details.get("messages"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_else(|| vec![self.message.as_str()])
    }

    /// Override the trace identifier.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests;
