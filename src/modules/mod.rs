//! Modules layer - Platform capabilities behind traits
//!
//! Camera capture and device geolocation, each with a real backend and a
//! seam for tests.

pub mod camera;
pub mod location;
