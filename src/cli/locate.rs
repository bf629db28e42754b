//! Locate command handler
//!
//! Geocodes a single place name.

use crate::cli::init_logging;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{get_geocoder, resolve};
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Place name to look up
    pub query: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the locate command
pub async fn run(args: LocateArgs) -> Result<()> {
    init_logging("warn");

    let config = Config::load()?;
    let geocoder = get_geocoder(&config)?;

    match resolve(&geocoder, &args.query).await {
        Some(location) if args.json => {
            println!("{}", serde_json::to_string_pretty(&location)?);
        }
        Some(location) => {
            println!("{}\t{}\t{}", location.lat, location.lng, location.display_name);
        }
        None => {
            return Err(Error::Geocoding(format!(
                "Could not find location: {}",
                args.query
            )));
        }
    }

    Ok(())
}
