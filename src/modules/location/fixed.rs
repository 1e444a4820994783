use async_trait::async_trait;

use crate::modules::location::source::{
    Coordinate, LocationError, PositionOptions, PositionSource,
};

/// For terminals bolted to a wall: always reports the configured spot
pub struct FixedPositionSource {
    coordinate: Coordinate,
}

impl FixedPositionSource {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinate: Coordinate {
                latitude,
                longitude,
            },
        }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        Ok(self.coordinate)
    }
}
