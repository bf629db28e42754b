//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod locate;
pub mod route;
pub mod serve;
pub mod track;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Location and route tracking for map widgets
#[derive(Parser)]
#[command(name = "trailmark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Geocode a place name
    Locate(locate::LocateArgs),

    /// Plan a route between two places and print the map view
    Route(route::RouteArgs),

    /// Follow the current position and print the route as it grows
    Track(track::TrackArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Locate(args) => locate::run(args).await,
        Commands::Route(args) => route::run(args).await,
        Commands::Track(args) => track::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Initialize logging for long-running commands
pub(crate) fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
