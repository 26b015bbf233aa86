//! Level III product handlers.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use radar_common::RadialSet;
use radar_decode::Level3Product;
use radar_processor::FileDate;
use std::sync::Arc;
use tracing::instrument;

use super::file_names;
use super::level2::DateQuery;
use crate::error::ApiResult;
use crate::state::AppState;

/// `?date=YYYYMMDD` selects the daily archive; absent or `latest` means
/// the real-time bucket.
fn archive_date(query: &DateQuery) -> ApiResult<Option<FileDate>> {
    match query.date.as_deref() {
        Some(date) => Ok(Some(date.parse()?)),
        None => Ok(None),
    }
}

/// GET /api/l3 - Sites publishing products
#[instrument(skip(state))]
pub async fn sites_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.service.list_level3_sites().await?))
}

/// GET /api/l3/:site - Products published by a site
#[instrument(skip(state))]
pub async fn products_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(site): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.service.list_level3_products(&site).await?))
}

/// GET /api/l3/:site/:product - Product files
#[instrument(skip(state))]
pub async fn files_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, product)): Path<(String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    let files = state.service.list_level3_files(&site, &product).await?;
    Ok(Json(file_names(&files)))
}

/// GET /api/l3/:site/:product/date/:date - Product files for a day
#[instrument(skip(state))]
pub async fn files_by_date_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, product, date)): Path<(String, String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    let date: FileDate = date.parse()?;
    Ok(Json(
        state
            .service
            .list_level3_files_on(&site, &product, date)
            .await?,
    ))
}

/// GET /api/l3/:site/:product/:fn[?date=YYYYMMDD] - Decoded product headers
#[instrument(skip(state))]
pub async fn product_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, product, filename)): Path<(String, String, String)>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<Level3Product>> {
    let date = archive_date(&query)?;
    Ok(Json(
        state
            .service
            .level3_product_on(&site, &product, &filename, date)
            .await?,
    ))
}

/// GET /api/l3/:site/:product/:fn/radial[?date=YYYYMMDD] - Product as a sweep
#[instrument(skip(state))]
pub async fn radial_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, product, filename)): Path<(String, String, String)>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<RadialSet>> {
    let date = archive_date(&query)?;
    Ok(Json(
        state
            .service
            .level3_radial_set_on(&site, &product, &filename, date)
            .await?,
    ))
}
