//! Level II archive handlers.

use axum::{
    extract::{Extension, Path, Query},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use radar_common::{Moment, RadarError, RadialSet, VolumeFilename};
use radar_processor::{FileDate, VolumeMetadata};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use super::{file_names, parse_param};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// The filename must belong to the site in the path.
fn volume_filename(site: &str, filename: &str) -> ApiResult<VolumeFilename> {
    let name = VolumeFilename::parse(filename)?;
    if !name.site.eq_ignore_ascii_case(site) {
        return Err(RadarError::invalid_parameter(
            "site",
            format!("{} does not belong to site {}", filename, site),
        )
        .into());
    }
    Ok(name)
}

/// GET /api/l2?date=YYYYMMDD - Sites with data for a day (default: yesterday)
#[instrument(skip(state))]
pub async fn sites_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let date = match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(d) => Some(NaiveDate::parse_from_str(d, "%Y%m%d").map_err(|_| {
            RadarError::invalid_parameter("date", format!("'{}' is not YYYYMMDD", d))
        })?),
        None => None,
    };
    Ok(Json(state.service.list_sites(date).await?))
}

/// GET /api/l2/:site - Today's volume files
#[instrument(skip(state))]
pub async fn files_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(site): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let files = state.service.list_volume_files(&site, None).await?;
    Ok(Json(file_names(&files)))
}

/// GET /api/l2/:site/date/:date - Volume files for a day, or `latest`
#[instrument(skip(state))]
pub async fn files_by_date_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, date)): Path<(String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    let date: FileDate = date.parse()?;
    let files = state.service.list_volume_files(&site, Some(date)).await?;
    Ok(Json(file_names(&files)))
}

/// GET /api/l2/:site/:fn - Chunk index of a volume
#[instrument(skip(state))]
pub async fn metadata_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, filename)): Path<(String, String)>,
) -> ApiResult<Json<VolumeMetadata>> {
    let name = volume_filename(&site, &filename)?;
    let (metadata, _) = state.service.volume_metadata(&name.name).await?;
    Ok(Json(metadata.as_ref().clone()))
}

/// GET /api/l2/:site/:fn/:product/:elv/radial - One elevation as a sweep
#[instrument(skip(state))]
pub async fn radial_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, filename, product, elevation)): Path<(String, String, String, String)>,
) -> ApiResult<Json<RadialSet>> {
    let name = volume_filename(&site, &filename)?;
    let moment: Moment = product.parse()?;
    let elevation: u8 = parse_param("elevation", &elevation)?;

    let sweep = state
        .service
        .radial_set(&name.name, moment, elevation)
        .await?;
    Ok(Json(sweep))
}

/// GET /api/l2/:site/:fn/:product/isosurface/:threshold - OBJ mesh
#[instrument(skip(state))]
pub async fn isosurface_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, filename, product, threshold)): Path<(String, String, String, String)>,
) -> ApiResult<Response> {
    let name = volume_filename(&site, &filename)?;
    let moment: Moment = product.parse()?;
    let threshold: f32 = parse_param("threshold", &threshold)?;
    if !threshold.is_finite() {
        return Err(ApiError(RadarError::invalid_parameter(
            "threshold",
            "must be a finite number",
        )));
    }

    let triangles = state
        .service
        .isosurface(&name.name, moment, threshold)
        .await?;

    let mut body = Vec::new();
    isosurface::obj::write_obj(&triangles, &mut body).map_err(RadarError::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "max-age=3600"),
        ],
        body,
    )
        .into_response())
}
