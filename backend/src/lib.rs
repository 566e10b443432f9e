//! Listings backend: validation, session, authorization and upload pipeline
//! in front of user and listing stores.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use domain::TraceId;
pub use middleware::Trace;
