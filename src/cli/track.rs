//! Track command handler
//!
//! Follows the environment position and prints the view each time the route
//! gains a point, until Ctrl-C or the requested number of points.

use crate::cli::init_logging;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::get_formatter;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::position::Watch;
use crate::geo::{get_directions, get_locator, Geocoder};
use crate::tracker::session::Session;
use crate::tracker::{Notification, ViewState};
use crate::view::project;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

/// How often the printed view is refreshed
const REFRESH: Duration = Duration::from_millis(250);

/// Track command arguments
#[derive(Args)]
pub struct TrackArgs {
    /// Seconds between position readings
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop once the route has this many points
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,
}

/// Run the track command
pub async fn run(args: TrackArgs) -> Result<()> {
    init_logging("info");

    let config = Config::load()?;
    let format = args.format.unwrap_or_else(|| config.defaults.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
    let interval = args
        .interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| config.watch_interval());

    let locator = get_locator(&config)?;
    // Tracking never geocodes, so the keyless backend is enough
    let session = Session::spawn(
        ViewState::new(config.default_center()),
        Geocoder::Nominatim(NominatimBackend::new()?),
        get_directions(&config)?,
        locator.clone(),
    );
    let mut notifications = session.subscribe();

    let watch = Watch::start(Arc::new(locator), interval);
    let following = session.follow(watch);
    info!("Tracking position every {:?}", interval);

    let mut printed = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            note = notifications.recv() => match note {
                Ok(note @ Notification::GeolocationUnavailable { .. }) => eprintln!("{}", note),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            _ = tokio::time::sleep(REFRESH) => {
                let state = session.snapshot().await?;
                if state.route.len() != printed {
                    printed = state.route.len();
                    let frame = project(&state, config.defaults.zoom);
                    println!("{}", formatter.format(&frame, &config)?);
                }
            }
        }

        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    // Unsubscribe before tearing the session down
    following.abort();
    session.shutdown().await;
    Ok(())
}
