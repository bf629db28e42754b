//! Route command handler
//!
//! Runs one session through the same steps a user would take in the widget:
//! set the origin, set the destination, optionally swap, then print the view.

use crate::cli::init_logging;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geo::directions::DirectionsBackend;
use crate::geo::{get_directions, get_geocoder, get_locator};
use crate::tracker::session::{Session, SessionHandle};
use crate::tracker::{Notification, ViewState};
use crate::view::project;
use clap::Args;
use std::time::Duration;

/// How long to wait for directions before printing without them
const DIRECTIONS_GRACE: Duration = Duration::from_secs(10);

/// Route command arguments
#[derive(Args)]
pub struct RouteArgs {
    /// Origin place name
    #[arg(long, conflicts_with = "here")]
    pub from: Option<String>,

    /// Use the current position as origin
    #[arg(long)]
    pub here: bool,

    /// Destination place name
    #[arg(long)]
    pub to: Option<String>,

    /// Swap origin and destination before printing
    #[arg(long)]
    pub swap: bool,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the route command
pub async fn run(args: RouteArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    init_logging("warn");

    let config = Config::load()?;
    let format = args.format.clone().unwrap_or_else(|| config.defaults.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let directions = get_directions(&config)?;
    let wants_directions = args.to.is_some() && directions.enabled();

    let session = Session::spawn(
        ViewState::new(config.default_center()),
        get_geocoder(&config)?,
        directions,
        get_locator(&config)?,
    );

    let state = plan(&session, &args, wants_directions).await;
    session.shutdown().await;
    let state = state?;

    let output = formatter.format(&project(&state, config.defaults.zoom), &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Drive the session through the requested steps and return the final state
async fn plan(
    session: &SessionHandle,
    args: &RouteArgs,
    wants_directions: bool,
) -> Result<ViewState> {
    let mut notifications = session.subscribe();

    if args.here {
        report(session.recenter().await?);
    } else if let Some(from) = &args.from {
        report(session.search(from.clone()).await?);
    }

    if let Some(to) = &args.to {
        report(session.set_destination(to.clone()).await?);
    }

    if wants_directions {
        wait_for_directions(session, &mut notifications).await;
    }

    if args.swap {
        let notes = session.swap().await?;
        // A real swap re-requests directions for the new endpoints
        let swapped = !notes.is_empty();
        report(notes);
        if wants_directions && swapped {
            wait_for_directions(session, &mut notifications).await;
        }
    }

    session.snapshot().await
}

/// Wait until directions arrive or fail, up to a grace period
async fn wait_for_directions(
    session: &SessionHandle,
    notifications: &mut tokio::sync::broadcast::Receiver<Notification>,
) {
    let waiting = async {
        loop {
            if let Ok(state) = session.snapshot().await {
                if !state.directions.is_empty() || state.destination_position.is_none() {
                    return;
                }
            }
            tokio::select! {
                note = notifications.recv() => {
                    if let Ok(note @ Notification::DirectionsFailed { .. }) = note {
                        eprintln!("{}", note);
                        return;
                    }
                }
                _ = tokio::time::sleep(Duration::from_millis(100)) => {}
            }
        }
    };

    if tokio::time::timeout(DIRECTIONS_GRACE, waiting).await.is_err() {
        eprintln!("Directions did not arrive in time");
    }
}

/// Print notifications for the user
fn report(notes: Vec<Notification>) {
    for note in notes {
        eprintln!("{}", note);
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
