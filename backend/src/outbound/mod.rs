//! Outbound adapters implementing the domain ports.
//!
//! - **memory**: process-local stores for development and tests.

pub mod memory;
