//! View projection
//!
//! Turns a `ViewState` into the three things a map widget draws: where to
//! center, which pins to place, and which lines to trace. No domain logic
//! lives here.

use crate::coord::Coordinates;
use crate::tracker::ViewState;
use serde::{Deserialize, Serialize};

/// Label on the origin pin
pub const ORIGIN_LABEL: &str = "You are here";

/// Label on the destination pin
pub const DESTINATION_LABEL: &str = "Destination";

/// Which endpoint a pin marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Origin,
    Destination,
}

/// A labelled pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub coords: Coordinates,
    pub label: String,
    pub kind: MarkerKind,
}

/// Everything the map needs for one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFrame {
    pub center: Coordinates,
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
    /// The route, oldest point first
    pub polyline: Vec<Coordinates>,
    /// Road path between the endpoints, when known
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub directions: Vec<Coordinates>,
}

/// Project a state into a frame
///
/// The map follows the marker; before one is placed it shows the current
/// (possibly fallback) position.
pub fn project(state: &ViewState, zoom: u8) -> ViewFrame {
    let mut markers = Vec::with_capacity(2);
    if let Some(coords) = state.marker_position {
        markers.push(MapMarker {
            coords,
            label: ORIGIN_LABEL.to_string(),
            kind: MarkerKind::Origin,
        });
    }
    if let Some(coords) = state.destination_position {
        markers.push(MapMarker {
            coords,
            label: DESTINATION_LABEL.to_string(),
            kind: MarkerKind::Destination,
        });
    }

    ViewFrame {
        center: state.marker_position.unwrap_or(state.current_position),
        zoom,
        markers,
        polyline: state.route.clone(),
        directions: state.directions.clone(),
    }
}

impl ViewFrame {
    pub fn marker(&self, kind: MarkerKind) -> Option<&MapMarker> {
        self.markers.iter().find(|m| m.kind == kind)
    }
}
