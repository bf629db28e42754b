//! Position/route state management
//!
//! `ViewState` is everything the map shows. It changes only through
//! [`ViewState::apply`], which takes one [`Event`] at a time and returns the
//! [`Notification`]s the user should see. Side effects (geocoding,
//! directions, reading the device position) live in [`session`].

pub mod session;

use crate::coord::distance::distance_km;
use crate::coord::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The map's view of the world
///
/// Route invariant: no point equals the one before it, and the last point is
/// the destination when one is set, else the marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub current_position: Coordinates,
    pub marker_position: Option<Coordinates>,
    pub destination_position: Option<Coordinates>,
    /// Chronological; visited points first, destination last
    pub route: Vec<Coordinates>,
    pub search_query: String,
    pub destination_query: String,
    /// Path between the endpoints from the directions service
    #[serde(default)]
    pub directions: Vec<Coordinates>,
}

/// Something that happened to the view
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A reading from the continuous location stream
    GeolocationUpdate(Coordinates),
    /// The "your location" input was edited
    SearchQueryChanged(String),
    /// The "destination" input was edited
    DestinationQueryChanged(String),
    /// The "your location" query was geocoded
    SearchResolved(Coordinates),
    /// The destination query was geocoded
    DestinationResolved(Coordinates),
    /// Explicit "use current location" with the freshly read position
    Recenter(Coordinates),
    /// Exchange origin and destination
    SwapEndpoints,
    /// The directions service returned a path
    DirectionsResolved(Vec<Coordinates>),
}

/// User-visible message produced while handling an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    DistanceComputed { km: f64 },
    GeocodeFailed { query: String },
    DirectionsFailed { message: String },
    GeolocationUnavailable { message: String },
}

impl Notification {
    /// Failures as opposed to informational messages
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::DistanceComputed { .. })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DistanceComputed { km } => write!(f, "Estimated travel distance: {:.2} km", km),
            Self::GeocodeFailed { query } => write!(f, "Could not find location: {}", query),
            Self::DirectionsFailed { message } => {
                write!(f, "Error fetching route. Please try again. ({})", message)
            }
            Self::GeolocationUnavailable { message } => {
                write!(f, "Current location unavailable: {}", message)
            }
        }
    }
}

impl ViewState {
    /// Fresh state centered on `fallback` with nothing placed yet
    pub fn new(fallback: Coordinates) -> Self {
        Self {
            current_position: fallback,
            marker_position: None,
            destination_position: None,
            route: Vec::new(),
            search_query: String::new(),
            destination_query: String::new(),
            directions: Vec::new(),
        }
    }

    /// Apply one event and return what the user should be told
    pub fn apply(&mut self, event: Event) -> Vec<Notification> {
        debug!(?event, "Applying event");

        match event {
            Event::GeolocationUpdate(coords) | Event::Recenter(coords) => {
                self.current_position = coords;
                self.marker_position = Some(coords);
                self.push_visited(coords);
                Vec::new()
            }
            Event::SearchQueryChanged(text) => {
                self.search_query = text;
                Vec::new()
            }
            Event::DestinationQueryChanged(text) => {
                self.destination_query = text;
                Vec::new()
            }
            Event::SearchResolved(coords) => {
                self.current_position = coords;
                self.marker_position = Some(coords);
                self.destination_position = None;
                self.directions.clear();
                self.route = vec![coords];
                Vec::new()
            }
            Event::DestinationResolved(coords) => {
                self.pop_destination();
                self.destination_position = Some(coords);
                self.directions.clear();
                push_distinct(&mut self.route, coords);
                vec![Notification::DistanceComputed {
                    km: distance_km(self.current_position, coords),
                }]
            }
            Event::SwapEndpoints => self.swap_endpoints(),
            Event::DirectionsResolved(path) => {
                self.directions = path;
                Vec::new()
            }
        }
    }

    /// Origin and destination, when both are placed
    pub fn endpoints(&self) -> Option<(Coordinates, Coordinates)> {
        Some((self.marker_position?, self.destination_position?))
    }

    fn swap_endpoints(&mut self) -> Vec<Notification> {
        let Some((origin, destination)) = self.endpoints() else {
            return Vec::new();
        };

        // Drop the old destination and origin from the tail, then re-add in
        // the new order so the new destination stays last.
        self.pop_destination();
        if self.route.last() == Some(&origin) {
            self.route.pop();
        }
        push_distinct(&mut self.route, destination);
        push_distinct(&mut self.route, origin);

        self.marker_position = Some(destination);
        self.destination_position = Some(origin);
        std::mem::swap(&mut self.search_query, &mut self.destination_query);
        self.directions.clear();

        vec![Notification::DistanceComputed {
            km: distance_km(destination, origin),
        }]
    }

    /// Append a visited point, keeping any destination at the end
    fn push_visited(&mut self, coords: Coordinates) {
        let destination = self.pop_destination();
        push_distinct(&mut self.route, coords);
        if let Some(destination) = destination {
            push_distinct(&mut self.route, destination);
        }
    }

    /// Remove the trailing destination, if the route ends with it
    fn pop_destination(&mut self) -> Option<Coordinates> {
        let destination = self.destination_position?;
        if self.route.last() == Some(&destination) {
            self.route.pop()
        } else {
            None
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Coordinates::default())
    }
}

fn push_distinct(route: &mut Vec<Coordinates>, coords: Coordinates) {
    if route.last() != Some(&coords) {
        route.push(coords);
    }
}
