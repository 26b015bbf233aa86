//! Level II real-time chunk handlers.

use axum::{
    extract::{Extension, Path},
    Json,
};
use radar_common::{Moment, RadialSet};
use radar_decode::archive2::Message31Header;
use std::sync::Arc;
use tracing::instrument;

use super::parse_param;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/l2-realtime/:site/:volume - First radial header of each elevation
#[instrument(skip(state))]
pub async fn headers_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, volume)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Message31Header>>> {
    let volume: u32 = parse_param("volume", &volume)?;
    Ok(Json(state.service.realtime_headers(&site, volume).await?))
}

/// GET /api/l2-realtime/:site/:volume/:elv/:product/radial
#[instrument(skip(state))]
pub async fn radial_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((site, volume, elevation, product)): Path<(String, String, String, String)>,
) -> ApiResult<Json<RadialSet>> {
    let volume: u32 = parse_param("volume", &volume)?;
    let elevation: u8 = parse_param("elevation", &elevation)?;
    let moment: Moment = product.parse()?;

    let sweep = state
        .service
        .realtime_radial_set(&site, volume, elevation, moment)
        .await?;
    Ok(Json(sweep))
}
