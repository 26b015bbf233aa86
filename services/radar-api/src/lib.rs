//! Radar API Service Library
//!
//! HTTP endpoints over the NEXRAD archive, real-time chunk and Level III
//! buckets. Handlers are thin: each parses its path, calls
//! [`radar_processor::RadarDataService`] and serializes the result.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
