//! Turn a violation list into the single error a request fails with.

use super::runner::{Violation, ViolationKind};
use crate::domain::{Error, ErrorCode};

/// Fixed message for ownership failures.
pub const FORBIDDEN_MESSAGE: &str = "not authorized to access this route";

/// Classify by the first violation only.
///
/// - `NotFound` → not found, carrying every message.
/// - `Forbidden` → forbidden with [`FORBIDDEN_MESSAGE`]; other messages are
///   dropped.
/// - otherwise → invalid request, carrying every message.
///
/// Returns `None` for an empty list.
pub fn classify(violations: Vec<Violation>) -> Option<Error> {
    let kind = violations.first()?.kind;
    let messages = || -> Vec<String> { violations.iter().map(|v| v.message.clone()).collect() };
    Some(match kind {
        ViolationKind::NotFound => Error::with_messages(ErrorCode::NotFound, messages()),
        ViolationKind::Forbidden => Error::forbidden(FORBIDDEN_MESSAGE),
        ViolationKind::Invalid => Error::with_messages(ErrorCode::InvalidRequest, messages()),
    })
}
