//! High-level radar data service.
//!
//! The `RadarDataService` is the single entry point the HTTP layer talks to.
//! It owns the per-bucket readers, the shared volume index cache and the
//! chunk assembler, and hands back canonical [`RadialSet`]s, elevation sets
//! and isosurface meshes.
//!
//! # Example
//!
//! ```rust,ignore
//! use radar_processor::{RadarDataService, RadarProcessorConfig, VolumeIndexCache};
//!
//! let service = RadarDataService::new(archive, Arc::new(VolumeIndexCache::new()), config)
//!     .with_realtime(chunks);
//!
//! let sweep = service
//!     .radial_set("KOKX20210902_012345_V06", Moment::Reflectivity, 1)
//!     .await?;
//! ```

use bytes::Bytes;
use chrono::{Days, NaiveDate, Utc};
use isosurface::{build_isosurface, IsosurfaceOptions, Triangle};
use radar_common::{ElevationSet, Moment, RadarError, RadarResult, RadialSet, VolumeFilename};
use radar_decode::archive2::Message31Header;
use radar_decode::normalize::{radial_set_from_level2, radial_set_from_level3};
use radar_decode::{Archive2, DecodeError, Level3Product};
use rayon::prelude::*;
use std::sync::Arc;
use storage::paths::{level3_archive_path, level3_object_path, realtime_volume_prefix};
use storage::{ObjectInfo, ObjectReader};
use tracing::{debug, instrument};

use crate::assembler::{run_blocking, AssembledVolume, ChunkAssembler, VolumeSource};
use crate::cache::{CacheStats, VolumeIndexCache};
use crate::config::RadarProcessorConfig;
use crate::index::VolumeMetadata;
use crate::level3_archive;
use crate::listing::{self, FileDate};

/// High-level service for accessing radar data.
///
/// Handles:
/// - Archive II volumes (metadata, single elevations, full volumes)
/// - Real-time chunk volumes, when a chunk reader is attached
/// - Level III products, when a product reader is attached
/// - Historic Level III products, when a daily-archive reader is attached
/// - Isosurface extraction over a full volume
pub struct RadarDataService {
    /// Level II archive bucket
    archive: Arc<dyn ObjectReader>,
    /// Level II real-time chunk bucket
    realtime: Option<Arc<dyn ObjectReader>>,
    /// Level III product bucket
    level3: Option<Arc<dyn ObjectReader>>,
    /// Level III daily-archive bucket
    level3_archive: Option<Arc<dyn ObjectReader>>,
    /// Volume index cache (shared across requests)
    cache: Arc<VolumeIndexCache>,
    assembler: ChunkAssembler,
    config: RadarProcessorConfig,
}

impl RadarDataService {
    pub fn new(
        archive: Arc<dyn ObjectReader>,
        cache: Arc<VolumeIndexCache>,
        config: RadarProcessorConfig,
    ) -> Self {
        Self {
            archive,
            realtime: None,
            level3: None,
            level3_archive: None,
            cache,
            assembler: ChunkAssembler::new(&config),
            config,
        }
    }

    /// Attach the real-time chunk bucket.
    pub fn with_realtime(mut self, reader: Arc<dyn ObjectReader>) -> Self {
        self.realtime = Some(reader);
        self
    }

    /// Attach the Level III product bucket.
    pub fn with_level3(mut self, reader: Arc<dyn ObjectReader>) -> Self {
        self.level3 = Some(reader);
        self
    }

    /// Attach the Level III daily-archive bucket.
    pub fn with_level3_archive(mut self, reader: Arc<dyn ObjectReader>) -> Self {
        self.level3_archive = Some(reader);
        self
    }

    pub fn config(&self) -> &RadarProcessorConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<VolumeIndexCache> {
        &self.cache
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    // ========================================================================
    // Archive II
    // ========================================================================

    /// Chunk index of a volume.
    ///
    /// A cache hit does no I/O and returns `None` for the volume. A miss
    /// downloads and decodes the whole file, indexes it and returns the
    /// decoded volume alongside so the caller need not fetch it again.
    #[instrument(skip(self))]
    pub async fn volume_metadata(
        &self,
        filename: &str,
    ) -> RadarResult<(Arc<VolumeMetadata>, Option<Archive2>)> {
        let name = VolumeFilename::parse(filename)?;
        if let Some(metadata) = self.cache.get(&name.name).await {
            return Ok((metadata, None));
        }

        debug!(filename = %name.name, "Volume index cache miss");
        let (volume, file_size) = self.fetch_volume(&name).await?;
        let metadata = self
            .cache
            .insert(&name.name, VolumeMetadata::from_volume(&volume, file_size))
            .await;
        Ok((metadata, Some(volume)))
    }

    /// Download and decode a whole volume. The index cache is warmed as a
    /// side effect.
    #[instrument(skip(self))]
    pub async fn full_volume(&self, filename: &str) -> RadarResult<Archive2> {
        let name = VolumeFilename::parse(filename)?;
        let (volume, file_size) = self.fetch_volume(&name).await?;
        if !self.cache.contains(&name.name).await {
            self.cache
                .insert(&name.name, VolumeMetadata::from_volume(&volume, file_size))
                .await;
        }
        Ok(volume)
    }

    /// A volume holding only one elevation's radials.
    ///
    /// With a cached index only the header region and that elevation's
    /// records are downloaded. Without one, the full decode done to build
    /// the index is filtered instead.
    #[instrument(skip(self))]
    pub async fn elevation_volume(
        &self,
        filename: &str,
        elevation: u8,
    ) -> RadarResult<AssembledVolume> {
        let name = VolumeFilename::parse(filename)?;
        let (metadata, full) = self.volume_metadata(filename).await?;

        match full {
            Some(mut volume) => {
                if !volume.elevation_scans.contains_key(&elevation) {
                    return Err(RadarError::ElevationNotFound(elevation));
                }
                volume.retain_elevation(elevation);
                Ok(AssembledVolume {
                    volume,
                    missing: Vec::new(),
                    source: VolumeSource::FullDecode,
                })
            }
            None => {
                self.assembler
                    .assemble_elevation(
                        Arc::clone(&self.archive),
                        &name.object_path(),
                        &metadata,
                        elevation,
                    )
                    .await
            }
        }
    }

    /// One elevation of one moment as a canonical sweep.
    #[instrument(skip(self))]
    pub async fn radial_set(
        &self,
        filename: &str,
        moment: Moment,
        elevation: u8,
    ) -> RadarResult<RadialSet> {
        let assembled = self.elevation_volume(filename, elevation).await?;
        sweep_from_volume(assembled, moment, elevation).await
    }

    /// Every elevation of a volume that carries `moment`.
    ///
    /// Elevations recorded without the moment (surveillance cuts have no
    /// velocity) are left out. If none carry it the request fails.
    #[instrument(skip(self))]
    pub async fn elevation_set(&self, filename: &str, moment: Moment) -> RadarResult<ElevationSet> {
        let volume = self.full_volume(filename).await?;
        run_blocking(move || normalize_volume(&volume, moment)).await
    }

    /// Isosurface of `moment` at `threshold` over the whole volume.
    #[instrument(skip(self))]
    pub async fn isosurface(
        &self,
        filename: &str,
        moment: Moment,
        threshold: f32,
    ) -> RadarResult<Vec<Triangle>> {
        let elevations = self.elevation_set(filename, moment).await?;
        let options = IsosurfaceOptions {
            row_mismatch_tolerance: self.config.isosurface_row_tolerance,
        };
        run_blocking(move || build_isosurface(elevations, threshold, &options)).await
    }

    async fn fetch_volume(&self, name: &VolumeFilename) -> RadarResult<(Archive2, usize)> {
        let data = self.archive.get(&name.object_path()).await?;
        let file_size = data.len();
        let volume = run_blocking(move || Archive2::extract(&data)).await?;
        Ok((volume, file_size))
    }

    // ========================================================================
    // Real-time chunks
    // ========================================================================

    /// Merge every chunk published so far for a real-time volume.
    #[instrument(skip(self))]
    pub async fn realtime_volume(&self, site: &str, volume: u32) -> RadarResult<AssembledVolume> {
        let reader = self
            .realtime
            .as_ref()
            .ok_or_else(|| RadarError::NotConfigured("real-time chunk storage".to_string()))?;

        let prefix = realtime_volume_prefix(site, volume);
        let mut objects = reader.list(&prefix).await?;
        if objects.is_empty() {
            return Err(RadarError::NotFound(format!("no chunks under {}", prefix)));
        }
        objects.sort_by(|a, b| a.path.cmp(&b.path));
        let keys: Vec<String> = objects.into_iter().map(|o| o.path).collect();

        self.assembler
            .assemble_objects(Arc::clone(reader), &keys)
            .await
    }

    /// The header of the first radial of each elevation, lowest first.
    pub async fn realtime_headers(
        &self,
        site: &str,
        volume: u32,
    ) -> RadarResult<Vec<Message31Header>> {
        let assembled = self.realtime_volume(site, volume).await?;
        Ok(assembled
            .volume
            .elevation_scans
            .values()
            .filter_map(|radials| radials.first())
            .map(|radial| radial.header.clone())
            .collect())
    }

    pub async fn realtime_radial_set(
        &self,
        site: &str,
        volume: u32,
        elevation: u8,
        moment: Moment,
    ) -> RadarResult<RadialSet> {
        let assembled = self.realtime_volume(site, volume).await?;
        sweep_from_volume(assembled, moment, elevation).await
    }

    // ========================================================================
    // Level III
    // ========================================================================

    fn level3_reader(&self) -> RadarResult<&Arc<dyn ObjectReader>> {
        self.level3
            .as_ref()
            .ok_or_else(|| RadarError::NotConfigured("Level III storage".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn level3_product(
        &self,
        site: &str,
        product: &str,
        filename: &str,
    ) -> RadarResult<Level3Product> {
        let path = level3_object_path(&self.config.level3_prefix, site, product, filename);
        let data = self.level3_reader()?.get(&path).await?;
        run_blocking(move || Level3Product::decode(&data)).await
    }

    pub async fn level3_radial_set(
        &self,
        site: &str,
        product: &str,
        filename: &str,
    ) -> RadarResult<RadialSet> {
        let product = self.level3_product(site, product, filename).await?;
        Ok(radial_set_from_level3(&product))
    }

    /// Download the daily tarball holding every product `site` issued on `date`.
    async fn level3_archive_data(&self, site: &str, date: NaiveDate) -> RadarResult<Bytes> {
        let reader = self
            .level3_archive
            .as_ref()
            .ok_or_else(|| RadarError::NotConfigured("Level III archive storage".to_string()))?;
        reader.get(&level3_archive_path(date, site)).await
    }

    /// A product read from the daily archive of `date`.
    #[instrument(skip(self))]
    pub async fn level3_archived_product(
        &self,
        site: &str,
        filename: &str,
        date: NaiveDate,
    ) -> RadarResult<Level3Product> {
        let data = self.level3_archive_data(site, date).await?;
        let wanted = filename.to_string();
        run_blocking(move || {
            let product = level3_archive::extract_product(&data, &wanted)?;
            Level3Product::decode(&product).map_err(RadarError::from)
        })
        .await
    }

    /// A product from the real-time bucket, or from the daily archive when
    /// `date` names a day.
    pub async fn level3_product_on(
        &self,
        site: &str,
        product: &str,
        filename: &str,
        date: Option<FileDate>,
    ) -> RadarResult<Level3Product> {
        match date {
            Some(FileDate::Day(day)) => self.level3_archived_product(site, filename, day).await,
            _ => self.level3_product(site, product, filename).await,
        }
    }

    /// [`Self::level3_product_on`] as a sweep.
    pub async fn level3_radial_set_on(
        &self,
        site: &str,
        product: &str,
        filename: &str,
        date: Option<FileDate>,
    ) -> RadarResult<RadialSet> {
        let product = self.level3_product_on(site, product, filename, date).await?;
        Ok(radial_set_from_level3(&product))
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Sites with archive data for `date`, defaulting to yesterday (UTC),
    /// the most recent complete day.
    pub async fn list_sites(&self, date: Option<NaiveDate>) -> RadarResult<Vec<String>> {
        let date = match date {
            Some(date) => date,
            None => yesterday()?,
        };
        listing::list_sites(self.archive.as_ref(), date).await
    }

    /// Volume files for a site. No date means today (UTC).
    pub async fn list_volume_files(
        &self,
        site: &str,
        date: Option<FileDate>,
    ) -> RadarResult<Vec<ObjectInfo>> {
        let today = Utc::now().date_naive();
        match date.unwrap_or(FileDate::Day(today)) {
            FileDate::Day(day) => listing::list_volume_files(self.archive.as_ref(), site, day).await,
            FileDate::Latest => {
                listing::list_latest_volume_files(
                    self.archive.as_ref(),
                    site,
                    today,
                    self.config.latest_listing_days,
                    self.config.latest_listing_limit,
                )
                .await
            }
        }
    }

    pub async fn list_level3_sites(&self) -> RadarResult<Vec<String>> {
        listing::list_level3_sites(self.level3_reader()?.as_ref(), &self.config.level3_prefix).await
    }

    pub async fn list_level3_products(&self, site: &str) -> RadarResult<Vec<String>> {
        listing::list_level3_products(
            self.level3_reader()?.as_ref(),
            &self.config.level3_prefix,
            site,
        )
        .await
    }

    /// Names of one product's files for a day. `Latest` lists the real-time
    /// bucket; a day lists the members of that day's archive.
    #[instrument(skip(self))]
    pub async fn list_level3_files_on(
        &self,
        site: &str,
        product: &str,
        date: FileDate,
    ) -> RadarResult<Vec<String>> {
        match date {
            FileDate::Latest => Ok(self
                .list_level3_files(site, product)
                .await?
                .iter()
                .map(|f| f.file_name().to_string())
                .collect()),
            FileDate::Day(day) => {
                let data = self.level3_archive_data(site, day).await?;
                let product = product.to_string();
                run_blocking(move || level3_archive::list_products(&data, &product)).await
            }
        }
    }

    pub async fn list_level3_files(&self, site: &str, product: &str) -> RadarResult<Vec<ObjectInfo>> {
        listing::list_level3_files(
            self.level3_reader()?.as_ref(),
            &self.config.level3_prefix,
            site,
            product,
        )
        .await
    }
}

fn yesterday() -> RadarResult<NaiveDate> {
    Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| RadarError::Internal("date out of range".to_string()))
}

async fn sweep_from_volume(
    mut assembled: AssembledVolume,
    moment: Moment,
    elevation: u8,
) -> RadarResult<RadialSet> {
    let radials = assembled
        .volume
        .elevation_scans
        .remove(&elevation)
        .ok_or(RadarError::ElevationNotFound(elevation))?;
    run_blocking(move || radial_set_from_level2(&radials, moment)).await
}

/// Normalize every elevation of a volume in parallel.
fn normalize_volume(volume: &Archive2, moment: Moment) -> Result<ElevationSet, DecodeError> {
    let sweeps = volume
        .elevation_scans
        .par_iter()
        .filter_map(|(_, radials)| match radial_set_from_level2(radials, moment) {
            Ok(sweep) => Some(Ok(sweep)),
            Err(DecodeError::MomentNotAvailable { .. }) => None,
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if sweeps.is_empty() {
        return Err(DecodeError::MomentNotAvailable {
            moment: moment.to_string(),
            elevation: volume.elevation_scans.keys().next().copied().unwrap_or(0),
        });
    }

    let mut elevations = ElevationSet::new(sweeps);
    elevations.sort_by_elevation();
    Ok(elevations)
}
