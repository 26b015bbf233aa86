//! Concurrent fetch and merge of LDM records.
//!
//! Two sources feed the same fan-out:
//! - byte ranges of one archive object, selected through a [`VolumeMetadata`]
//! - whole real-time chunk objects, one LDM record run each
//!
//! Every chunk is fetched on its own task, decoded on the blocking pool and
//! merged into a shared [`Archive2`] under a mutex. Merge order is whatever
//! order fetches complete in, so radials are re-sorted by azimuth number
//! afterwards.

use bytes::Bytes;
use futures::future::join_all;
use radar_common::{RadarError, RadarResult};
use radar_decode::{decode_ldm_record, Archive2, DecodeResult, LdmRecord};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use storage::ObjectReader;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::config::RadarProcessorConfig;
use crate::index::VolumeMetadata;

/// Identifies one chunk that could not be fetched or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkRef {
    /// Byte offset of a record inside an archive object.
    Offset(usize),
    /// Key of a real-time chunk object.
    Object(String),
}

impl fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkRef::Offset(offset) => write!(f, "offset {}", offset),
            ChunkRef::Object(key) => write!(f, "object {}", key),
        }
    }
}

/// How an [`AssembledVolume`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeSource {
    /// Header region plus the records of one elevation, by ranged reads.
    PartialFetch,
    /// The whole object was downloaded and decoded.
    FullDecode,
    /// Real-time chunk objects merged into one volume.
    Realtime,
}

/// A merged volume and the chunks that did not make it in.
#[derive(Debug, Clone)]
pub struct AssembledVolume {
    pub volume: Archive2,
    pub missing: Vec<ChunkRef>,
    pub source: VolumeSource,
}

impl AssembledVolume {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

enum ChunkJob {
    Range { path: String, range: Range<usize> },
    Object(String),
}

impl ChunkJob {
    fn chunk_ref(&self) -> ChunkRef {
        match self {
            ChunkJob::Range { range, .. } => ChunkRef::Offset(range.start),
            ChunkJob::Object(key) => ChunkRef::Object(key.clone()),
        }
    }

    async fn fetch(&self, reader: &dyn ObjectReader) -> RadarResult<Bytes> {
        match self {
            ChunkJob::Range { path, range } => reader.get_range(path, range.clone()).await,
            ChunkJob::Object(key) => reader.get(key).await,
        }
    }
}

/// Run CPU-bound decoding or meshing on the blocking pool.
pub(crate) async fn run_blocking<T, E, F>(work: F) -> RadarResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<RadarError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| RadarError::Internal(format!("blocking task failed: {}", e)))?
        .map_err(Into::into)
}

/// Decode every LDM record in `data`, back to back.
fn decode_records(data: &[u8]) -> DecodeResult<Vec<LdmRecord>> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let record = decode_ldm_record(&data[offset..])?;
        offset += record.encoded_len;
        records.push(record);
    }
    Ok(records)
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = RadarResult<T>>,
) -> RadarResult<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| RadarError::Timeout)?
}

/// Fetches chunks concurrently and merges them into one volume.
#[derive(Debug, Clone)]
pub struct ChunkAssembler {
    fetch_timeout: Duration,
    max_failed_ratio: f64,
}

impl ChunkAssembler {
    pub fn new(config: &RadarProcessorConfig) -> Self {
        Self {
            fetch_timeout: config.chunk_fetch_timeout,
            max_failed_ratio: config.max_failed_chunk_ratio,
        }
    }

    /// Fetch only the records that feed `elevation` of the archive object at `path`.
    ///
    /// The header region is read first to recover the volume header and VCP;
    /// any radials it holds are dropped and come back through the chunk list.
    #[instrument(skip(self, reader, metadata))]
    pub async fn assemble_elevation(
        &self,
        reader: Arc<dyn ObjectReader>,
        path: &str,
        metadata: &VolumeMetadata,
        elevation: u8,
    ) -> RadarResult<AssembledVolume> {
        let offsets = metadata
            .elevation_chunks
            .offsets(elevation)
            .ok_or(RadarError::ElevationNotFound(elevation))?;

        let header = with_timeout(
            self.fetch_timeout,
            reader.get_range(path, metadata.header_region()),
        )
        .await?;
        let mut volume = run_blocking(move || Archive2::extract(&header)).await?;
        volume.clear_radials();

        let jobs = offsets
            .iter()
            .map(|&offset| ChunkJob::Range {
                path: path.to_string(),
                range: metadata.chunk_range(offset),
            })
            .collect();

        let (mut volume, missing) = self.fetch_into(reader, jobs, volume).await?;
        volume.retain_elevation(elevation);
        volume.sort_radials();

        debug!(
            chunks = offsets.len(),
            missing = missing.len(),
            radials = volume.radial_count(),
            "Assembled elevation from ranged reads"
        );
        Ok(AssembledVolume {
            volume,
            missing,
            source: VolumeSource::PartialFetch,
        })
    }

    /// Merge real-time chunk objects. `keys` must be in chunk order; the
    /// first one carries the volume header.
    #[instrument(skip(self, reader, keys), fields(chunks = keys.len()))]
    pub async fn assemble_objects(
        &self,
        reader: Arc<dyn ObjectReader>,
        keys: &[String],
    ) -> RadarResult<AssembledVolume> {
        let (first, rest) = keys
            .split_first()
            .ok_or_else(|| RadarError::NotFound("no chunks for volume".to_string()))?;

        let data = with_timeout(self.fetch_timeout, reader.get(first)).await?;
        let volume = run_blocking(move || Archive2::extract(&data)).await?;

        let jobs = rest.iter().cloned().map(ChunkJob::Object).collect();
        let (mut volume, missing) = self.fetch_into(reader, jobs, volume).await?;
        volume.sort_radials();

        Ok(AssembledVolume {
            volume,
            missing,
            source: VolumeSource::Realtime,
        })
    }

    async fn fetch_into(
        &self,
        reader: Arc<dyn ObjectReader>,
        jobs: Vec<ChunkJob>,
        volume: Archive2,
    ) -> RadarResult<(Archive2, Vec<ChunkRef>)> {
        let total = jobs.len();
        let shared = Arc::new(Mutex::new(volume));

        let handles = jobs.into_iter().map(|job| {
            let reader = Arc::clone(&reader);
            let shared = Arc::clone(&shared);
            let limit = self.fetch_timeout;
            tokio::spawn(async move {
                let result = fetch_and_merge(reader.as_ref(), &job, &shared, limit).await;
                (job.chunk_ref(), result)
            })
        });

        let mut missing = Vec::new();
        for joined in join_all(handles).await {
            let (chunk, result) =
                joined.map_err(|e| RadarError::Internal(format!("chunk task failed: {}", e)))?;
            metrics::counter!("chunk_fetches_total").increment(1);
            if let Err(e) = result {
                warn!(chunk = %chunk, error = %e, "Chunk fetch failed");
                metrics::counter!("chunk_fetch_failures_total").increment(1);
                missing.push(chunk);
            }
        }

        if !missing.is_empty() && missing.len() as f64 / total as f64 > self.max_failed_ratio {
            return Err(RadarError::PartialFetch {
                failed: missing.len(),
                total,
            });
        }

        let volume = Arc::try_unwrap(shared)
            .map_err(|_| RadarError::Internal("volume still shared after merge".to_string()))?
            .into_inner();
        Ok((volume, missing))
    }
}

async fn fetch_and_merge(
    reader: &dyn ObjectReader,
    job: &ChunkJob,
    volume: &Mutex<Archive2>,
    limit: Duration,
) -> RadarResult<()> {
    let data = with_timeout(limit, job.fetch(reader)).await?;
    let records = run_blocking(move || decode_records(&data)).await?;

    let mut volume = volume.lock().await;
    for record in records {
        volume.add_record(record);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_ref_display() {
        assert_eq!(ChunkRef::Offset(124).to_string(), "offset 124");
        assert_eq!(
            ChunkRef::Object("KOKX/1/x".to_string()).to_string(),
            "object KOKX/1/x"
        );
    }

    #[test]
    fn test_decode_records_empty() {
        assert!(decode_records(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_records_rejects_garbage() {
        assert!(decode_records(&[0, 0, 0, 0]).is_err());
    }
}
