//! Wizard controller
//!
//! Walks the traveller through destination, preferences and review. Entering
//! the review step generates the itinerary, renders the panel and redraws
//! the route. Only one generation may run at a time.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::itinerary::{ItineraryBuilder, PlannedRoute};
use crate::models::TripPreferences;
use crate::routing::{MapView, RouteRenderer, RouteSummary};
use crate::{PlannerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Destination,
    Preferences,
    Review,
}

impl WizardStep {
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            WizardStep::Destination => Some(WizardStep::Preferences),
            WizardStep::Preferences => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Destination => None,
            WizardStep::Preferences => Some(WizardStep::Destination),
            WizardStep::Review => Some(WizardStep::Preferences),
        }
    }
}

/// Either the stop list or the reason there is none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PanelBody {
    Planned {
        route: PlannedRoute,
        summary: RouteSummary,
    },
    Failed {
        message: String,
    },
}

/// The rendered itinerary panel, as shown and exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryPanel {
    pub destination: String,
    pub preferences: TripPreferences,
    pub body: PanelBody,
    pub generated_at: DateTime<Utc>,
}

impl ItineraryPanel {
    fn planned(destination: String, preferences: TripPreferences, route: PlannedRoute) -> Self {
        let summary = RouteSummary::from_waypoints(&route.waypoints);
        Self {
            destination,
            preferences,
            body: PanelBody::Planned { route, summary },
            generated_at: Utc::now(),
        }
    }

    fn failed(destination: String, preferences: TripPreferences, error: &PlannerError) -> Self {
        Self {
            destination,
            preferences,
            body: PanelBody::Failed {
                message: format!("Error: {}", error.user_message()),
            },
            generated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_planned(&self) -> bool {
        matches!(self.body, PanelBody::Planned { .. })
    }

    #[must_use]
    pub fn route(&self) -> Option<&PlannedRoute> {
        match &self.body {
            PanelBody::Planned { route, .. } => Some(route),
            PanelBody::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Your Trip to {}", self.destination),
            format!(
                "Budget: {}, Pace: {}",
                self.preferences.budget, self.preferences.pace
            ),
            format!("Interests: {}", self.preferences.interests_label()),
        ];
        match &self.body {
            PanelBody::Planned { route, .. } => lines.extend(route.itinerary.display_lines()),
            PanelBody::Failed { message } => lines.push(message.clone()),
        }
        lines
    }

    /// Plain-text rendering used for export
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines().join("\n")
    }
}

struct WizardState<R> {
    step: WizardStep,
    preferences: TripPreferences,
    panel: Option<ItineraryPanel>,
    map: MapView<R>,
    /// Bumped by reset
    epoch: u64,
}

pub struct TripPlanner<R> {
    builder: ItineraryBuilder,
    destination_zoom: u8,
    export_file_name: String,
    state: Mutex<WizardState<R>>,
    in_flight: Mutex<()>,
}

impl<R: RouteRenderer> TripPlanner<R> {
    pub fn new(builder: ItineraryBuilder, map: MapView<R>, config: &PlannerConfig) -> Self {
        Self {
            builder,
            destination_zoom: config.map.destination_zoom,
            export_file_name: config.export.file_name.clone(),
            state: Mutex::new(WizardState {
                step: WizardStep::Destination,
                preferences: TripPreferences::default(),
                panel: None,
                map,
                epoch: 0,
            }),
            in_flight: Mutex::new(()),
        }
    }

    pub async fn step(&self) -> WizardStep {
        self.state.lock().await.step
    }

    pub async fn preferences(&self) -> TripPreferences {
        self.state.lock().await.preferences.clone()
    }

    /// Store new preferences; rejected while a generation is running
    pub async fn update_preferences(&self, mut preferences: TripPreferences) -> Result<()> {
        let _in_flight = self.claim()?;
        preferences.normalize();
        self.state.lock().await.preferences = preferences;
        Ok(())
    }

    /// Advance one step. Entering review generates the itinerary.
    pub async fn next(&self) -> Result<WizardStep> {
        {
            let mut state = self.state.lock().await;
            match state.step.next() {
                None => return Ok(state.step),
                Some(WizardStep::Review) => {}
                Some(step) => {
                    state.step = step;
                    return Ok(step);
                }
            }
        }

        let in_flight = self.claim()?;
        {
            let mut state = self.state.lock().await;
            if state.step.next() != Some(WizardStep::Review) {
                return Ok(state.step);
            }
            state.step = WizardStep::Review;
        }
        self.generate_locked(&in_flight).await?;
        Ok(WizardStep::Review)
    }

    pub async fn back(&self) -> WizardStep {
        let mut state = self.state.lock().await;
        if let Some(step) = state.step.previous() {
            state.step = step;
        }
        state.step
    }

    /// Jump straight to review with `preferences` and generate
    pub async fn plan(&self, mut preferences: TripPreferences) -> Result<ItineraryPanel> {
        let in_flight = self.claim()?;
        preferences.normalize();
        {
            let mut state = self.state.lock().await;
            state.preferences = preferences;
            state.step = WizardStep::Review;
        }
        self.generate_locked(&in_flight).await
    }

    /// Generate for the current preferences and render the panel.
    ///
    /// A failed lookup ends up in the panel rather than in the returned
    /// error; `Err` means the request was rejected ([`PlannerError::Busy`])
    /// or a reset discarded its result ([`PlannerError::Discarded`]).
    pub async fn generate(&self) -> Result<ItineraryPanel> {
        let in_flight = self.claim()?;
        self.generate_locked(&in_flight).await
    }

    fn claim(&self) -> Result<MutexGuard<'_, ()>> {
        self.in_flight.try_lock().map_err(|_| {
            warn!("Ignoring itinerary request while another one is running");
            PlannerError::Busy
        })
    }

    async fn generate_locked(&self, _in_flight: &MutexGuard<'_, ()>) -> Result<ItineraryPanel> {
        let (preferences, epoch) = {
            let state = self.state.lock().await;
            (state.preferences.clone(), state.epoch)
        };
        let destination = self.builder.destination_for(&preferences);
        let result = self.builder.generate(&preferences).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            info!("Discarding itinerary for '{}' after reset", destination);
            return Err(PlannerError::Discarded);
        }
        let panel = match result {
            Ok(route) => {
                state.map.set_view(route.center(), self.destination_zoom);
                state.map.replace_route(&route.waypoints);
                ItineraryPanel::planned(destination, preferences, route)
            }
            Err(e) => {
                warn!("Itinerary generation failed: {:?}", e);
                ItineraryPanel::failed(destination, preferences, &e)
            }
        };
        state.panel = Some(panel.clone());
        Ok(panel)
    }

    pub async fn panel(&self) -> Option<ItineraryPanel> {
        self.state.lock().await.panel.clone()
    }

    /// Text of the current panel, empty when nothing was generated yet
    pub async fn export_text(&self) -> String {
        self.panel()
            .await
            .map(|panel| panel.to_text())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn export_file_name(&self) -> &str {
        &self.export_file_name
    }

    /// Write the panel text into `dir` under the export file name
    pub async fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.export_file_name);
        tokio::fs::write(&path, self.export_text().await).await?;
        info!("Exported itinerary to {}", path.display());
        Ok(path)
    }

    /// Back to the first step with empty preferences and no route.
    /// A generation still running when this is called is discarded.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.step = WizardStep::Destination;
        state.preferences = TripPreferences::default();
        state.panel = None;
        state.map.clear();
    }

    /// Run `f` against the map while holding the state lock
    pub async fn with_map<T>(&self, f: impl FnOnce(&MapView<R>) -> T) -> T {
        let state = self.state.lock().await;
        f(&state.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::{GeocodingError, PlaceSearch, SearchHit};
    use crate::routing::{GeoJsonRenderer, ViewState};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::{Notify, Semaphore};

    /// Holds every search until released
    struct Gate {
        entered: Notify,
        release: Semaphore,
    }

    impl Gate {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                entered: Notify::new(),
                release: Semaphore::new(0),
            })
        }

        fn open(&self) {
            self.release.add_permits(1);
        }
    }

    /// Resolves everything except `"Qwxyzzzz"`, optionally behind a gate
    struct StubSearch {
        gate: Option<Arc<Gate>>,
    }

    #[async_trait]
    impl PlaceSearch for StubSearch {
        async fn search(
            &self,
            query: &str,
            _limit: Option<u32>,
        ) -> std::result::Result<Vec<SearchHit>, GeocodingError> {
            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                let _open = gate.release.acquire().await;
            }
            if query.contains("Qwxyzzzz") {
                return Ok(Vec::new());
            }
            Ok(vec![SearchHit {
                lat: "48.8566".to_string(),
                lon: "2.3522".to_string(),
                display_name: Some(format!("{query}, France")),
            }])
        }
    }

    fn planner_with(gate: Option<Arc<Gate>>) -> TripPlanner<GeoJsonRenderer> {
        let config = PlannerConfig::default();
        let builder = ItineraryBuilder::new(Arc::new(StubSearch { gate }), &config);
        let map = MapView::new(GeoJsonRenderer::new(), ViewState::from(&config.map));
        TripPlanner::new(builder, map, &config)
    }

    fn planner() -> TripPlanner<GeoJsonRenderer> {
        planner_with(None)
    }

    /// Start `plan(destination)` and wait until it is inside the search
    async fn plan_in_flight(
        destination: &str,
    ) -> (
        Arc<TripPlanner<GeoJsonRenderer>>,
        Arc<Gate>,
        tokio::task::JoinHandle<Result<ItineraryPanel>>,
    ) {
        let gate = Gate::new();
        let planner = Arc::new(planner_with(Some(gate.clone())));
        let first = {
            let planner = planner.clone();
            let preferences = TripPreferences::new(destination);
            tokio::spawn(async move { planner.plan(preferences).await })
        };
        gate.entered.notified().await;
        (planner, gate, first)
    }

    #[tokio::test]
    async fn test_steps_are_linear() {
        let planner = planner();
        assert_eq!(planner.back().await, WizardStep::Destination);
        assert_eq!(planner.next().await.unwrap(), WizardStep::Preferences);
        assert!(planner.panel().await.is_none());
        assert_eq!(planner.next().await.unwrap(), WizardStep::Review);
        assert!(planner.panel().await.is_some());
        assert_eq!(planner.next().await.unwrap(), WizardStep::Review);
        assert_eq!(planner.back().await, WizardStep::Preferences);
    }

    #[tokio::test]
    async fn test_panel_lines() {
        let planner = planner();
        let preferences = TripPreferences::new("Paris")
            .with_budget("medium")
            .with_pace("fast")
            .with_interests(["food", "art"]);

        let panel = planner.plan(preferences).await.unwrap();

        let lines = panel.lines();
        assert_eq!(lines[0], "Your Trip to Paris");
        assert_eq!(lines[1], "Budget: medium, Pace: fast");
        assert_eq!(lines[2], "Interests: food, art");
        assert_eq!(lines[3], "Main Destination: Paris");
        assert_eq!(lines[4], "Stop 1: museum in Paris");
        assert_eq!(lines.len(), 8);
        assert_eq!(planner.export_text().await, lines.join("\n"));
    }

    #[tokio::test]
    async fn test_failure_leaves_map_untouched() {
        let planner = planner();
        let panel = planner.plan(TripPreferences::new("Qwxyzzzz")).await.unwrap();

        assert!(!panel.is_planned());
        assert_eq!(
            panel.lines().last().unwrap(),
            "Error: Could not generate route for \"Qwxyzzzz\"."
        );
        assert_eq!(panel.lines()[2], "Interests: None");
        planner
            .with_map(|map| {
                assert!(!map.has_route());
                assert_eq!(
                    map.renderer().view(),
                    Some(ViewState::from(&PlannerConfig::default().map))
                );
            })
            .await;
    }

    #[tokio::test]
    async fn test_concurrent_generation_is_rejected() {
        let (planner, gate, first) = plan_in_flight("Paris").await;

        assert!(matches!(planner.generate().await, Err(PlannerError::Busy)));
        gate.open();
        assert!(first.await.unwrap().unwrap().is_planned());
    }

    #[tokio::test]
    async fn test_rejected_plan_leaves_state_alone() {
        let (planner, gate, first) = plan_in_flight("Paris").await;

        let second = planner.plan(TripPreferences::new("Rome")).await;
        assert!(matches!(second, Err(PlannerError::Busy)));
        assert!(matches!(
            planner.update_preferences(TripPreferences::new("Rome")).await,
            Err(PlannerError::Busy)
        ));
        gate.open();
        let panel = first.await.unwrap().unwrap();

        assert_eq!(panel.destination, "Paris");
        assert_eq!(planner.preferences().await.destination, "Paris");
        assert_eq!(planner.panel().await.unwrap().destination, "Paris");
    }

    #[tokio::test]
    async fn test_rejected_next_keeps_step() {
        let gate = Gate::new();
        let planner = Arc::new(planner_with(Some(gate.clone())));
        planner.next().await.unwrap();
        let first = {
            let planner = planner.clone();
            tokio::spawn(async move { planner.generate().await })
        };
        gate.entered.notified().await;

        assert!(matches!(planner.next().await, Err(PlannerError::Busy)));
        assert_eq!(planner.step().await, WizardStep::Preferences);
        gate.open();
        first.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_reset_discards_running_generation() {
        let (planner, gate, first) = plan_in_flight("Paris").await;

        planner.reset().await;
        gate.open();

        assert!(matches!(first.await.unwrap(), Err(PlannerError::Discarded)));
        assert_eq!(planner.step().await, WizardStep::Destination);
        assert!(planner.panel().await.is_none());
        assert!(!planner.with_map(|map| map.has_route()).await);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let planner = planner();
        planner.plan(TripPreferences::new("Paris")).await.unwrap();
        assert!(planner.with_map(|map| map.has_route()).await);

        planner.reset().await;

        assert_eq!(planner.step().await, WizardStep::Destination);
        assert_eq!(planner.preferences().await, TripPreferences::default());
        assert!(planner.panel().await.is_none());
        assert!(planner.export_text().await.is_empty());
        assert!(!planner.with_map(|map| map.has_route()).await);
    }

    #[tokio::test]
    async fn test_export_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let planner = planner();
        planner.plan(TripPreferences::new("Paris")).await.unwrap();

        let path = planner.export_to(dir.path()).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "travel_plan.txt");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("Your Trip to Paris\n"));
    }
}
