//! trailmark: location and route tracking for map widgets
//!
//! A library and CLI tool that keeps the state behind an interactive map:
//! where the user is, where they searched, where they are heading, and the
//! route in between.
//!
//! ## Features
//!
//! - Geocoding through OpenCage or Nominatim
//! - Continuous geolocation with cancellable watches
//! - A reducer-driven `ViewState` with route de-duplication and endpoint swap
//! - Best-effort driving directions from OpenRouteService
//! - View projection to JSON, text, GPX and map URLs
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use trailmark::coord::Coordinates;
//! use trailmark::tracker::{Event, Notification, ViewState};
//!
//! let mut state = ViewState::default();
//! state.apply(Event::SearchResolved(Coordinates::new(51.505, -0.09)));
//!
//! let notes = state.apply(Event::DestinationResolved(Coordinates::new(48.8566, 2.3522)));
//! assert!(matches!(notes[0], Notification::DistanceComputed { .. }));
//! assert_eq!(state.route.len(), 2);
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod server;
pub mod tracker;
pub mod view;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use tracker::session::{Session, SessionHandle};
pub use tracker::{Event, Notification, ViewState};
pub use view::{project, ViewFrame};
