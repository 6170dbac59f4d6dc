//! JSON API behind the browser wizard

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::PlannerError;
use crate::models::{Category, TripPreferences};
use crate::routing::{GeoJsonRenderer, ViewState};
use crate::wizard::{ItineraryPanel, TripPlanner, WizardStep};

pub type SharedPlanner = Arc<TripPlanner<GeoJsonRenderer>>;

#[derive(Serialize, Deserialize)]
pub struct ApiWizard {
    pub step: WizardStep,
    pub preferences: TripPreferences,
}

#[derive(Serialize, Deserialize)]
pub struct ApiItinerary {
    pub panel: ItineraryPanel,
    pub lines: Vec<String>,
    pub route: Option<Value>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiMap {
    pub view: Option<ViewState>,
    pub route: Option<Value>,
}

/// Planner errors as HTTP responses
pub struct ApiError(PlannerError);

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            PlannerError::Busy | PlannerError::Discarded => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::debug!("API request failed with {}: {}", status, self.0);
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

pub fn router(planner: SharedPlanner) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/wizard", get(get_wizard))
        .route("/wizard/next", post(next_step))
        .route("/wizard/back", post(previous_step))
        .route("/itinerary", post(create_itinerary))
        .route("/itinerary/export", get(export_itinerary))
        .route("/map", get(get_map))
        .route("/reset", post(reset))
        .with_state(planner)
}

async fn get_categories() -> Json<Vec<Category>> {
    Json(Category::ALL.to_vec())
}

async fn wizard(planner: &SharedPlanner) -> ApiWizard {
    ApiWizard {
        step: planner.step().await,
        preferences: planner.preferences().await,
    }
}

async fn get_wizard(State(planner): State<SharedPlanner>) -> Json<ApiWizard> {
    Json(wizard(&planner).await)
}

async fn next_step(State(planner): State<SharedPlanner>) -> Result<Json<ApiWizard>, ApiError> {
    planner.next().await?;
    Ok(Json(wizard(&planner).await))
}

async fn previous_step(State(planner): State<SharedPlanner>) -> Json<ApiWizard> {
    planner.back().await;
    Json(wizard(&planner).await)
}

async fn create_itinerary(
    State(planner): State<SharedPlanner>,
    Json(preferences): Json<TripPreferences>,
) -> Result<Json<ApiItinerary>, ApiError> {
    let panel = planner.plan(preferences).await?;
    let route = if panel.is_planned() {
        planner
            .with_map(|map| map.renderer().route_geojson().cloned())
            .await
    } else {
        None
    };

    Ok(Json(ApiItinerary {
        lines: panel.lines(),
        panel,
        route,
    }))
}

async fn export_itinerary(State(planner): State<SharedPlanner>) -> impl IntoResponse {
    let disposition = format!("attachment; filename=\"{}\"", planner.export_file_name());
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        planner.export_text().await,
    )
}

async fn get_map(State(planner): State<SharedPlanner>) -> Json<ApiMap> {
    let map = planner
        .with_map(|map| ApiMap {
            view: map.renderer().view(),
            route: map.renderer().route_geojson().cloned(),
        })
        .await;
    Json(map)
}

async fn reset(State(planner): State<SharedPlanner>) -> StatusCode {
    planner.reset().await;
    StatusCode::NO_CONTENT
}
