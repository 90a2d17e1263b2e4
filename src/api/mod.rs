//! Network boundary: wire types and the backend client.

pub mod client;
pub mod types;

pub use client::{AgentBackend, ApiError, HttpBackend};
