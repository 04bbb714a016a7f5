//! RiverData Client - Flood-Monitoring API Access
//!
//! A reqwest-based [`ReadingSource`](riverdata_core::ReadingSource) for the
//! Environment Agency flood-monitoring readings endpoints, plus uncached
//! station-wide reads.

pub mod client;
pub mod error;

pub use client::{
    decode_events, readings_query, ClientConfig, FloodMonitoringClient, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT,
};
pub use error::ClientError;
