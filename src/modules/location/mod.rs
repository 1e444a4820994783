//! Device geolocation: one fresh fix per request, bounded by a timeout.

mod acquirer;
mod fixed;
mod gpsd;
mod source;

pub use acquirer::LocationAcquirer;
pub use fixed::FixedPositionSource;
pub use gpsd::GpsdPositionSource;
pub use source::{Coordinate, LocationError, PositionOptions, PositionSource};
