//! HTTP mapping for domain errors.
//!
//! Purpose: keep [`Error`] transport agnostic while giving every failure a
//! consistent JSON body, status code and `trace-id` header. This is the
//! single upstream handler that every pipeline stage raises into.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::ports::{ListingStoreError, UserStoreError};
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if status_for(error.code()) == StatusCode::INTERNAL_SERVER_ERROR {
        let redacted = Error::internal("Internal server error");
        match error.trace_id() {
            Some(id) => redacted.with_trace_id(id),
            None => redacted,
        }
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<UserStoreError> for Error {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::Unavailable { message } => {
                warn!(%message, "user store unavailable");
                Error::service_unavailable("user store unavailable")
            }
            UserStoreError::DuplicateEmail { .. } => Error::invalid_request("email already exists"),
            UserStoreError::Missing { id } => Error::not_found(format!("no user with id {id}")),
        }
    }
}

impl From<ListingStoreError> for Error {
    fn from(err: ListingStoreError) -> Self {
        match err {
            ListingStoreError::Unavailable { message } => {
                warn!(%message, "listing store unavailable");
                Error::service_unavailable("listing store unavailable")
            }
            ListingStoreError::Missing { id } => {
                Error::not_found(format!("no listing with id {id}"))
            }
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak framework details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}
