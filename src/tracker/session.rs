//! Session event loop
//!
//! One task owns the `ViewState` and handles commands strictly one at a time.
//! Slow work (geocoding, directions, reading the device position) runs in
//! spawned tasks whose results come back as completions, so location updates
//! keep flowing while a lookup is in flight. Completions are applied in the
//! order they arrive: the last lookup to resolve wins.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::directions::DirectionsBackend;
use crate::geo::position::{PositionSource, Watch};
use crate::geo::{resolve, GeoBackend, GeoLocation};
use crate::tracker::{Event, Notification, ViewState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 64;
const NOTIFICATION_BUFFER: usize = 64;

type Reply = Option<oneshot::Sender<Vec<Notification>>>;

/// Requests from handles
#[derive(Debug)]
enum Command {
    Search { query: String, reply: Reply },
    Destination { query: String, reply: Reply },
    Recenter { reply: Reply },
    Swap { reply: Reply },
    Position { coords: Coordinates, reply: Reply },
    PositionUnavailable { message: String },
    Snapshot { reply: oneshot::Sender<ViewState> },
    Shutdown,
}

/// Results of work spawned by the session
#[derive(Debug)]
enum Completion {
    Search {
        query: String,
        location: Option<GeoLocation>,
        reply: Reply,
    },
    Destination {
        query: String,
        location: Option<GeoLocation>,
        reply: Reply,
    },
    Recenter {
        reading: Result<Coordinates>,
        reply: Reply,
    },
    Directions {
        start: Coordinates,
        end: Coordinates,
        path: Result<Vec<Coordinates>>,
    },
}

/// Owner of a `ViewState` and its collaborators
pub struct Session<G, D, P> {
    state: ViewState,
    geocoder: Arc<G>,
    directions: Arc<D>,
    locator: Arc<P>,
    notifications: broadcast::Sender<Notification>,
    completions: mpsc::UnboundedSender<Completion>,
}

/// Cloneable handle for talking to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    notifications: broadcast::Sender<Notification>,
}

impl<G, D, P> Session<G, D, P>
where
    G: GeoBackend + 'static,
    D: DirectionsBackend + 'static,
    P: PositionSource + 'static,
{
    /// Start a session task and return a handle to it
    ///
    /// The task stops on `shutdown` or when every handle is dropped.
    pub fn spawn(state: ViewState, geocoder: G, directions: D, locator: P) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (notifications, _) = broadcast::channel(NOTIFICATION_BUFFER);

        let session = Session {
            state,
            geocoder: Arc::new(geocoder),
            directions: Arc::new(directions),
            locator: Arc::new(locator),
            notifications: notifications.clone(),
            completions: completions_tx,
        };
        tokio::spawn(session.run(commands_rx, completions_rx));

        SessionHandle {
            commands: commands_tx,
            notifications,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        info!("Session started at {}", self.state.current_position);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(completion) = completions.recv() => self.handle_completion(completion),
            }
        }

        info!("Session stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Search { query, reply } => {
                self.apply(Event::SearchQueryChanged(query.clone()));
                let geocoder = self.geocoder.clone();
                let done = self.completions.clone();
                tokio::spawn(async move {
                    let location = resolve(geocoder.as_ref(), &query).await;
                    let _ = done.send(Completion::Search {
                        query,
                        location,
                        reply,
                    });
                });
            }
            Command::Destination { query, reply } => {
                self.apply(Event::DestinationQueryChanged(query.clone()));
                let geocoder = self.geocoder.clone();
                let done = self.completions.clone();
                tokio::spawn(async move {
                    let location = resolve(geocoder.as_ref(), &query).await;
                    let _ = done.send(Completion::Destination {
                        query,
                        location,
                        reply,
                    });
                });
            }
            Command::Recenter { reply } => {
                let locator = self.locator.clone();
                let done = self.completions.clone();
                tokio::spawn(async move {
                    let reading = locator.current_position().await;
                    let _ = done.send(Completion::Recenter { reading, reply });
                });
            }
            Command::Swap { reply } => {
                let notes = self.apply(Event::SwapEndpoints);
                if !notes.is_empty() {
                    if let Some((origin, destination)) = self.state.endpoints() {
                        self.request_directions(origin, destination);
                    }
                }
                respond(reply, notes);
            }
            Command::Position { coords, reply } => {
                let notes = self.apply(Event::GeolocationUpdate(coords));
                respond(reply, notes);
            }
            Command::PositionUnavailable { message } => {
                self.notify(Notification::GeolocationUnavailable { message });
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.state.clone());
            }
            Command::Shutdown => {}
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Search {
                query,
                location,
                reply,
            } => {
                let notes = match location {
                    Some(location) => {
                        info!("Located '{}' at {}", query, location.display_name);
                        self.apply(Event::SearchResolved(location.coords()))
                    }
                    None => self.notify(Notification::GeocodeFailed { query }),
                };
                respond(reply, notes);
            }
            Completion::Destination {
                query,
                location,
                reply,
            } => {
                let notes = match location {
                    Some(location) => {
                        info!("Destination '{}' at {}", query, location.display_name);
                        let coords = location.coords();
                        let notes = self.apply(Event::DestinationResolved(coords));
                        self.request_directions(self.state.current_position, coords);
                        notes
                    }
                    None => self.notify(Notification::GeocodeFailed { query }),
                };
                respond(reply, notes);
            }
            Completion::Recenter { reading, reply } => {
                let notes = match reading.and_then(|coords| coords.validate().map(|_| coords)) {
                    Ok(coords) => self.apply(Event::Recenter(coords)),
                    Err(e) => self.notify(Notification::GeolocationUnavailable {
                        message: e.to_string(),
                    }),
                };
                respond(reply, notes);
            }
            Completion::Directions { start, end, path } => {
                if !self.endpoints_current(start, end) {
                    debug!("Dropping directions for {} -> {}, endpoints moved", start, end);
                    return;
                }
                match path {
                    Ok(path) => {
                        debug!("Directions path with {} points", path.len());
                        self.apply(Event::DirectionsResolved(path));
                    }
                    Err(e) => {
                        self.notify(Notification::DirectionsFailed {
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    /// Fire-and-forget directions lookup
    fn request_directions(&self, start: Coordinates, end: Coordinates) {
        if !self.directions.enabled() {
            return;
        }
        let directions = self.directions.clone();
        let done = self.completions.clone();
        tokio::spawn(async move {
            let path = directions.directions(start, end).await;
            let _ = done.send(Completion::Directions { start, end, path });
        });
    }

    /// Whether a directions request for `start -> end` still matches the view
    ///
    /// The destination must be unchanged and `start` must still be the origin,
    /// either the current position or the marker.
    fn endpoints_current(&self, start: Coordinates, end: Coordinates) -> bool {
        self.state.destination_position == Some(end)
            && (self.state.current_position == start || self.state.marker_position == Some(start))
    }

    fn apply(&mut self, event: Event) -> Vec<Notification> {
        let notes = self.state.apply(event);
        for note in &notes {
            self.publish(note.clone());
        }
        notes
    }

    /// Publish a failure without touching the state
    fn notify(&self, note: Notification) -> Vec<Notification> {
        self.publish(note.clone());
        vec![note]
    }

    fn publish(&self, note: Notification) {
        if note.is_failure() {
            warn!("{}", note);
        } else {
            info!("{}", note);
        }
        // No subscribers is fine
        let _ = self.notifications.send(note);
    }
}

fn respond(reply: Reply, notes: Vec<Notification>) {
    if let Some(reply) = reply {
        let _ = reply.send(notes);
    }
}

impl SessionHandle {
    /// Geocode the "your location" query and move the marker there
    pub async fn search(&self, query: impl Into<String>) -> Result<Vec<Notification>> {
        let query = query.into();
        self.request(|reply| Command::Search { query, reply }).await
    }

    /// Geocode the destination query and place the destination
    pub async fn set_destination(&self, query: impl Into<String>) -> Result<Vec<Notification>> {
        let query = query.into();
        self.request(|reply| Command::Destination { query, reply })
            .await
    }

    /// Re-read the environment position and move the marker there
    pub async fn recenter(&self) -> Result<Vec<Notification>> {
        self.request(|reply| Command::Recenter { reply }).await
    }

    /// Exchange origin and destination
    pub async fn swap(&self) -> Result<Vec<Notification>> {
        self.request(|reply| Command::Swap { reply }).await
    }

    /// Deliver a geolocation update
    pub async fn update_position(&self, coords: Coordinates) -> Result<Vec<Notification>> {
        coords.validate()?;
        self.request(|reply| Command::Position { coords, reply })
            .await
    }

    /// Current state
    pub async fn snapshot(&self) -> Result<ViewState> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply: tx }).await?;
        rx.await.map_err(|_| Error::SessionClosed)
    }

    /// Receive every notification published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Forward a position watch into the session
    ///
    /// Runs until the session stops or the returned task is aborted; either
    /// way the watch is dropped and stops polling.
    pub fn follow(&self, mut watch: Watch) -> JoinHandle<()> {
        let commands = self.commands.clone();
        tokio::spawn(async move {
            while let Some(reading) = watch.next().await {
                let command = match reading.and_then(|coords| coords.validate().map(|_| coords)) {
                    Ok(coords) => Command::Position {
                        coords,
                        reply: None,
                    },
                    Err(e) => Command::PositionUnavailable {
                        message: e.to_string(),
                    },
                };
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            watch.unsubscribe();
        })
    }

    /// Stop the session task
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn request<F>(&self, make: F) -> Result<Vec<Notification>>
    where
        F: FnOnce(Reply) -> Command,
    {
        let (tx, rx) = oneshot::channel();
        self.send(make(Some(tx))).await?;
        rx.await.map_err(|_| Error::SessionClosed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::SessionClosed)
    }
}
