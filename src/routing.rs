//! Map view and route drawing
//!
//! A [`RouteRenderer`] is whatever actually displays the map. The
//! [`MapView`] owns it together with the handle of the route currently on
//! screen, so a route is always released before the next one is drawn.

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::MapConfig;
use crate::models::Waypoint;

/// Token for a drawn route. Not `Clone`: whoever holds it owns the route.
#[derive(Debug, PartialEq, Eq)]
pub struct RouteHandle(u64);

impl RouteHandle {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// Rendering capability driven by the planner
pub trait RouteRenderer: Send {
    fn set_view(&mut self, center: Waypoint, zoom: u8);
    /// Draw a route through `waypoints` in the given order
    fn draw_route(&mut self, waypoints: &[Waypoint]) -> RouteHandle;
    fn clear_route(&mut self, handle: RouteHandle);
}

/// Current map center and zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: Waypoint,
    pub zoom: u8,
}

pub struct MapView<R> {
    renderer: R,
    route: Option<RouteHandle>,
}

impl<R: RouteRenderer> MapView<R> {
    /// Wrap `renderer` and move it to `initial`
    pub fn new(mut renderer: R, initial: ViewState) -> Self {
        renderer.set_view(initial.center, initial.zoom);
        Self {
            renderer,
            route: None,
        }
    }

    pub fn set_view(&mut self, center: Waypoint, zoom: u8) {
        self.renderer.set_view(center, zoom);
    }

    /// Release the current route, if any, then draw `waypoints`
    pub fn replace_route(&mut self, waypoints: &[Waypoint]) {
        self.clear();
        let handle = self.renderer.draw_route(waypoints);
        debug!("Drew route {} through {} waypoints", handle.id(), waypoints.len());
        self.route = Some(handle);
    }

    pub fn clear(&mut self) {
        if let Some(handle) = self.route.take() {
            debug!("Releasing route {}", handle.id());
            self.renderer.clear_route(handle);
        }
    }

    #[must_use]
    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl From<&MapConfig> for ViewState {
    fn from(config: &MapConfig) -> Self {
        Self {
            center: Waypoint::new(config.initial_latitude, config.initial_longitude),
            zoom: config.initial_zoom,
        }
    }
}

/// Straight-line distances along a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Distance of each leg in km, `waypoints.len() - 1` entries
    pub legs_km: Vec<f64>,
    pub total_km: f64,
}

impl RouteSummary {
    #[must_use]
    pub fn from_waypoints(waypoints: &[Waypoint]) -> Self {
        let legs_km: Vec<f64> = waypoints
            .windows(2)
            .map(|pair| leg_distance_km(&pair[0], &pair[1]))
            .collect();
        let total_km = legs_km.iter().sum();
        Self { legs_km, total_km }
    }
}

fn leg_distance_km(from: &Waypoint, to: &Waypoint) -> f64 {
    distance(
        HaversineLocation {
            latitude: from.latitude,
            longitude: from.longitude,
        },
        HaversineLocation {
            latitude: to.latitude,
            longitude: to.longitude,
        },
        Units::Kilometers,
    )
}

/// Keeps the map as data: the current view plus the route as GeoJSON
#[derive(Debug, Default)]
pub struct GeoJsonRenderer {
    view: Option<ViewState>,
    route: Option<(u64, Value)>,
    next_id: u64,
}

impl GeoJsonRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn view(&self) -> Option<ViewState> {
        self.view
    }

    /// The drawn route as a GeoJSON `FeatureCollection`
    #[must_use]
    pub fn route_geojson(&self) -> Option<&Value> {
        self.route.as_ref().map(|(_, geojson)| geojson)
    }
}

impl RouteRenderer for GeoJsonRenderer {
    fn set_view(&mut self, center: Waypoint, zoom: u8) {
        self.view = Some(ViewState { center, zoom });
    }

    fn draw_route(&mut self, waypoints: &[Waypoint]) -> RouteHandle {
        self.next_id += 1;
        self.route = Some((self.next_id, route_to_geojson(waypoints)));
        RouteHandle::new(self.next_id)
    }

    fn clear_route(&mut self, handle: RouteHandle) {
        if self.route.as_ref().is_some_and(|(id, _)| *id == handle.id()) {
            self.route = None;
        }
    }
}

/// GeoJSON positions are `[longitude, latitude]`
fn route_to_geojson(waypoints: &[Waypoint]) -> Value {
    let coordinates: Vec<[f64; 2]> = waypoints
        .iter()
        .map(|w| [w.longitude, w.latitude])
        .collect();
    let summary = RouteSummary::from_waypoints(waypoints);

    let mut features = vec![json!({
        "type": "Feature",
        "geometry": { "type": "LineString", "coordinates": coordinates },
        "properties": { "total_km": summary.total_km },
    })];
    features.extend(coordinates.iter().enumerate().map(|(index, position)| {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": position },
            "properties": { "index": index },
        })
    }));

    json!({ "type": "FeatureCollection", "features": features })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Logs every call so ordering can be asserted
    #[derive(Default)]
    struct CallLog {
        calls: Vec<String>,
        next: u64,
    }

    impl RouteRenderer for CallLog {
        fn set_view(&mut self, center: Waypoint, zoom: u8) {
            self.calls
                .push(format!("view {} {} {}", center.latitude, center.longitude, zoom));
        }

        fn draw_route(&mut self, waypoints: &[Waypoint]) -> RouteHandle {
            self.next += 1;
            self.calls.push(format!("draw {} ({})", self.next, waypoints.len()));
            RouteHandle::new(self.next)
        }

        fn clear_route(&mut self, handle: RouteHandle) {
            self.calls.push(format!("clear {}", handle.id()));
        }
    }

    fn initial() -> ViewState {
        ViewState::from(&MapConfig::default())
    }

    #[test]
    fn test_replace_releases_previous_route_first() {
        let mut map = MapView::new(CallLog::default(), initial());
        let waypoints = [Waypoint::new(1.0, 1.0), Waypoint::new(2.0, 2.0)];

        map.replace_route(&waypoints);
        map.replace_route(&waypoints[..1]);
        map.clear();
        map.clear();

        assert_eq!(
            map.renderer().calls,
            [
                "view 14.5995 120.9842 5",
                "draw 1 (2)",
                "clear 1",
                "draw 2 (1)",
                "clear 2",
            ]
        );
        assert!(!map.has_route());
    }

    #[test]
    fn test_geojson_keeps_waypoint_order() {
        let mut map = MapView::new(GeoJsonRenderer::new(), initial());
        map.replace_route(&[
            Waypoint::new(48.8566, 2.3522),
            Waypoint::new(48.8611, 2.3364),
        ]);

        let geojson = map.renderer().route_geojson().unwrap();
        assert_eq!(geojson["type"], "FeatureCollection");
        assert_eq!(
            geojson["features"][0]["geometry"]["coordinates"],
            json!([[2.3522, 48.8566], [2.3364, 48.8611]])
        );
        assert_eq!(geojson["features"][2]["properties"]["index"], 1);

        map.clear();
        assert!(map.renderer().route_geojson().is_none());
        assert_eq!(map.renderer().view(), Some(initial()));
    }

    #[test]
    fn test_route_summary() {
        let summary = RouteSummary::from_waypoints(&[
            Waypoint::new(0.0, 0.0),
            Waypoint::new(0.0, 1.0),
            Waypoint::new(0.0, 2.0),
        ]);
        assert_eq!(summary.legs_km.len(), 2);
        // one degree of longitude on the equator is roughly 111 km
        assert!((summary.legs_km[0] - 111.2).abs() < 1.0);
        assert!((summary.total_km - 2.0 * summary.legs_km[0]).abs() < 1e-9);

        assert_eq!(RouteSummary::from_waypoints(&[]).total_km, 0.0);
    }
}
