//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route. Authentication
//! and authorization gates live with the HTTP adapter in
//! [`crate::inbound::http`].

pub mod trace;

pub use trace::Trace;
