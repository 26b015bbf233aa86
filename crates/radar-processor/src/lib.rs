//! Volume services over the NEXRAD buckets.
//!
//! This crate turns object-storage bytes into decoded radar data while
//! downloading as little as possible:
//!
//! - [`index`]: which LDM records feed which elevation of a volume
//! - [`cache`]: per-filename index cache shared across requests
//! - [`assembler`]: concurrent ranged fetch and merge of selected records
//! - [`listing`]: archive and product directory listings
//! - [`level3_archive`]: members of the Level III daily tarballs
//! - [`service`]: the [`RadarDataService`] facade used by the API

pub mod assembler;
pub mod cache;
pub mod config;
pub mod index;
pub mod level3_archive;
pub mod listing;
pub mod service;

pub use assembler::{AssembledVolume, ChunkAssembler, ChunkRef, VolumeSource};
pub use cache::{CacheStats, VolumeIndexCache};
pub use config::RadarProcessorConfig;
pub use index::{ElevationChunkIndex, VolumeMetadata};
pub use listing::FileDate;
pub use service::RadarDataService;
