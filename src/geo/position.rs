//! Environment geolocation
//!
//! A `PositionSource` answers "where am I right now". `Watch` turns any source
//! into a continuous stream of readings that stops when unsubscribed or
//! dropped.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::ip_location::IpLocator;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Trait for environment position sources
pub trait PositionSource: Send + Sync {
    /// One-shot read of the current position
    fn current_position(&self) -> impl Future<Output = Result<Coordinates>> + Send;
}

/// A source that always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(Coordinates);

impl FixedPosition {
    pub fn new(coords: Coordinates) -> Self {
        Self(coords)
    }
}

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates> {
        Ok(self.0)
    }
}

/// Position source selected by configuration
#[derive(Debug, Clone)]
pub enum Locator {
    Ip(IpLocator),
    Fixed(FixedPosition),
    /// Geolocation turned off; every read fails
    Off,
}

impl PositionSource for Locator {
    async fn current_position(&self) -> Result<Coordinates> {
        match self {
            Self::Ip(locator) => locator.current_position().await,
            Self::Fixed(fixed) => fixed.current_position().await,
            Self::Off => Err(Error::Geolocation("Geolocation is turned off".to_string())),
        }
    }
}

/// Continuous position subscription
///
/// Polls the source on an interval and delivers each reading (or failure).
/// Dropping the watch or calling `unsubscribe` stops polling.
#[derive(Debug)]
pub struct Watch {
    rx: mpsc::Receiver<Result<Coordinates>>,
    task: JoinHandle<()>,
}

impl Watch {
    /// Start watching `source`, reading immediately and then every `interval`
    pub fn start<P: PositionSource + 'static>(source: Arc<P>, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(16);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let reading = source.current_position().await;
                if tx.send(reading).await.is_err() {
                    break;
                }
            }
            debug!("Position watch stopped");
        });

        Self { rx, task }
    }

    /// Wait for the next reading; `None` once the watch has stopped
    pub async fn next(&mut self) -> Option<Result<Coordinates>> {
        self.rx.recv().await
    }

    /// Stop the subscription
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
