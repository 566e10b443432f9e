//! Inbound adapters translating HTTP requests into store calls while keeping
//! framework details at the edge.

pub mod http;
