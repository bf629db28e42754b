//! trailmark CLI entry point
//!
//! Location and route tracking - CLI + HTTP API

use trailmark::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
