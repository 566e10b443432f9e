//! HTTP inbound adapter exposing the `/api/v1` REST surface.

pub mod auth;
pub mod authorization;
pub mod error;
pub mod gate;
pub mod listings;
pub mod routes;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token;
pub mod upload;
pub mod users;
pub mod validation;

pub use crate::domain::ApiResult;
