//! Storage abstractions for radar services.
//!
//! Provides a read interface over the public NEXRAD buckets:
//! - Level II archive volumes
//! - Level II real-time chunks
//! - Level III products
//!
//! Every bucket gets its own [`ObjectStorage`]. Consumers depend on the
//! [`ObjectReader`] trait so tests can substitute failing readers.

pub mod object_store;
pub mod paths;
pub mod reader;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig, StorageStats, GCS_ENDPOINT};
pub use reader::{Listing, ObjectInfo, ObjectReader};
