use std::sync::Arc;
use std::time::Duration;

use crate::modules::location::source::{
    Coordinate, LocationError, PositionOptions, PositionSource,
};

/// Obtains one current coordinate with a bounded wait
pub struct LocationAcquirer {
    source: Option<Arc<dyn PositionSource>>,
}

impl LocationAcquirer {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

    pub fn new(source: Arc<dyn PositionSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// A device without any geolocation capability
    pub fn unsupported() -> Self {
        Self { source: None }
    }

    /// Requests a single high-accuracy fix with no cached-value tolerance.
    ///
    /// No retry. Once `timeout` elapses the pending request is dropped and
    /// `LocationError::Timeout` is returned.
    pub async fn acquire(&self, timeout: Duration) -> Result<Coordinate, LocationError> {
        let source = self.source.as_ref().ok_or(LocationError::Unsupported)?;

        let options = PositionOptions {
            enable_high_accuracy: true,
            timeout,
            maximum_age: Duration::ZERO,
        };

        tracing::debug!("Requesting geolocation (timeout {:?})", timeout);

        match tokio::time::timeout(timeout, source.current_position(&options)).await {
            Ok(Ok(coordinate)) => {
                tracing::debug!(
                    "Geolocation fix: {}, {}",
                    coordinate.latitude,
                    coordinate.longitude
                );
                Ok(coordinate)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LocationError::Timeout(timeout)),
        }
    }
}
