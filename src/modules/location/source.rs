use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// How old a cached reading may be; zero demands a fresh fix
    pub maximum_age: Duration,
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("geolocation permission denied: {0}")]
    PermissionDenied(String),

    #[error("no position fix within {0:?}")]
    Timeout(Duration),

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
}

/// Platform geolocation capability
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Waits for one current reading. Callers bound the wait; sources need not.
    async fn current_position(&self, options: &PositionOptions)
        -> Result<Coordinate, LocationError>;
}
