//! Router construction.

use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{health, level2, level3, realtime};
use crate::state::AppState;

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Level II archive
        .route("/api/l2", get(level2::sites_handler))
        .route("/api/l2/:site", get(level2::files_handler))
        .route("/api/l2/:site/date/:date", get(level2::files_by_date_handler))
        .route("/api/l2/:site/:fn", get(level2::metadata_handler))
        .route(
            "/api/l2/:site/:fn/:product/:elv/radial",
            get(level2::radial_handler),
        )
        .route(
            "/api/l2/:site/:fn/:product/isosurface/:threshold",
            get(level2::isosurface_handler),
        )
        // Level II real-time chunks
        .route(
            "/api/l2-realtime/:site/:volume",
            get(realtime::headers_handler),
        )
        .route(
            "/api/l2-realtime/:site/:volume/:elv/:product/radial",
            get(realtime::radial_handler),
        )
        // Level III
        .route("/api/l3", get(level3::sites_handler))
        .route("/api/l3/:site", get(level3::products_handler))
        .route("/api/l3/:site/:product", get(level3::files_handler))
        .route(
            "/api/l3/:site/:product/date/:date",
            get(level3::files_by_date_handler),
        )
        .route("/api/l3/:site/:product/:fn", get(level3::product_handler))
        .route(
            "/api/l3/:site/:product/:fn/radial",
            get(level3::radial_handler),
        )
        // Health and metrics
        .route("/health", get(health::health_handler))
        .route("/ready", get(health::ready_handler))
        .route("/metrics", get(health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
