//! Per-volume chunk index.
//!
//! An Archive II file is a header followed by LDM records. The index records
//! where each record starts and which elevations it carries, so that a later
//! request for one elevation only downloads the records it needs.

use radar_decode::{Archive2, RecordSummary};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Elevation number to the ascending offsets of every record holding at
/// least one radial of that elevation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ElevationChunkIndex(BTreeMap<u8, Vec<usize>>);

impl ElevationChunkIndex {
    pub fn from_records(records: &[RecordSummary]) -> Self {
        let mut sets: BTreeMap<u8, BTreeSet<usize>> = BTreeMap::new();
        for record in records {
            for &elevation in &record.elevation_numbers {
                sets.entry(elevation).or_default().insert(record.offset);
            }
        }

        Self(
            sets.into_iter()
                .map(|(elevation, offsets)| (elevation, offsets.into_iter().collect()))
                .collect(),
        )
    }

    /// Offsets feeding `elevation`, or `None` if the volume never mentions it.
    pub fn offsets(&self, elevation: u8) -> Option<&[usize]> {
        self.0.get(&elevation).map(Vec::as_slice)
    }

    pub fn elevations(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a cached volume needs for ranged fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeMetadata {
    /// Start offset of every LDM record, ascending.
    pub ldm_offsets: Vec<usize>,
    pub elevation_chunks: ElevationChunkIndex,
    /// Size of the source object in bytes.
    pub file_size: usize,
}

impl VolumeMetadata {
    pub fn from_volume(volume: &Archive2, file_size: usize) -> Self {
        Self {
            ldm_offsets: volume.ldm_offsets(),
            elevation_chunks: ElevationChunkIndex::from_records(&volume.records),
            file_size,
        }
    }

    /// Volume header plus the first LDM record (the metadata record).
    pub fn header_region(&self) -> Range<usize> {
        match self.ldm_offsets.get(1) {
            Some(&end) => 0..end,
            None => 0..self.file_size,
        }
    }

    /// Byte range of the record starting at `offset`, ending where the next
    /// record starts or at the end of the file.
    pub fn chunk_range(&self, offset: usize) -> Range<usize> {
        let end = match self.ldm_offsets.binary_search(&offset) {
            Ok(i) => self.ldm_offsets.get(i + 1).copied(),
            Err(i) => self.ldm_offsets.get(i).copied(),
        };
        offset..end.unwrap_or(self.file_size)
    }
}
