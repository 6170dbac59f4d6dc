use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::api;
use crate::config::PlannerConfig;
use crate::itinerary::ItineraryBuilder;
use crate::routing::{GeoJsonRenderer, MapView, ViewState};
use crate::wizard::TripPlanner;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// The full application: API under `/api`, front end for everything else
pub fn app(planner: api::SharedPlanner, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(planner))
        .fallback_service(ServeDir::new(static_dir))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
}

pub async fn run(config: &PlannerConfig, port: u16) -> Result<()> {
    let builder = ItineraryBuilder::from_config(config)?;
    let map = MapView::new(GeoJsonRenderer::new(), ViewState::from(&config.map));
    let planner = Arc::new(TripPlanner::new(builder, map, config));

    let app = app(planner, &config.web.static_dir);

    let addr = format!("{}:{}", config.web.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app)
        .await
        .context("Web server stopped unexpectedly")?;
    Ok(())
}
